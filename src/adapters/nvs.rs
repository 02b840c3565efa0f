//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`SettingsPort`]: the endpoint credentials live as one
//! fixed 64-byte record (see [`crate::settings`]) under namespace
//! `shutterlink`, key `tbcfg`.  ESP-IDF NVS commits are atomic per
//! `nvs_commit()`, so a power cut leaves either the old or the new record.
//!
//! On the host an in-memory map stands in for flash.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::SettingsPort;
use crate::error::ConfigError;
use crate::settings::{ConnectionConfig, RECORD_LEN};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const SETTINGS_NAMESPACE: &str = "shutterlink";
#[cfg(not(target_os = "espidf"))]
const SETTINGS_KEY: &str = "tbcfg";
#[cfg(target_os = "espidf")]
const SETTINGS_KEY_CSTR: &[u8] = b"tbcfg\0";

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably. After a version mismatch or a full partition the
    /// partition is erased and re-initialised.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS
            // access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key() -> String {
        format!("{}::{}", SETTINGS_NAMESPACE, SETTINGS_KEY)
    }

    /// Overwrite the raw record (simulation only; lets tests plant
    /// corrupted or erased flash).
    #[cfg(not(target_os = "espidf"))]
    pub fn write_raw(&self, bytes: &[u8]) {
        self.store
            .borrow_mut()
            .insert(Self::composite_key(), bytes.to_vec());
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = SETTINGS_NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_record(&self) -> Result<[u8; RECORD_LEN], ConfigError> {
        let store = self.store.borrow();
        let bytes = store
            .get(&Self::composite_key())
            .ok_or(ConfigError::NotFound)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| ConfigError::Corrupted)
    }

    #[cfg(target_os = "espidf")]
    fn read_record(&self) -> Result<[u8; RECORD_LEN], ConfigError> {
        let result = Self::with_nvs_handle(false, |handle| {
            let mut buf = [0u8; RECORD_LEN];
            let mut size = RECORD_LEN;
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    SETTINGS_KEY_CSTR.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            if size != RECORD_LEN {
                return Err(ESP_ERR_NVS_INVALID_LENGTH as i32);
            }
            Ok(buf)
        });
        match result {
            Ok(buf) => Ok(buf),
            // A namespace that was never written cannot be opened read-only.
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => Err(ConfigError::NotFound),
            Err(e) if e == ESP_ERR_NVS_INVALID_LENGTH as i32 => Err(ConfigError::Corrupted),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_record(&self, record: &[u8; RECORD_LEN]) -> Result<(), ConfigError> {
        self.write_raw(record);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn write_record(&self, record: &[u8; RECORD_LEN]) -> Result<(), ConfigError> {
        let result = Self::with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    SETTINGS_KEY_CSTR.as_ptr() as *const _,
                    record.as_ptr() as *const _,
                    record.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        result.map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            ConfigError::IoError
        })
    }
}

impl SettingsPort for NvsAdapter {
    fn load(&self) -> Result<ConnectionConfig, ConfigError> {
        let record = self.read_record()?;
        let config = ConnectionConfig::decode(&record)?;
        info!(
            "NvsAdapter: loaded credentials for '{}'",
            config.server_address()
        );
        Ok(config)
    }

    fn save(&self, config: &ConnectionConfig) -> Result<(), ConfigError> {
        self.write_record(&config.encode())?;
        info!("NvsAdapter: credentials saved ({} bytes)", RECORD_LEN);
        Ok(())
    }
}
