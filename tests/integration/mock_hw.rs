//! Mock adapters for integration tests.
//!
//! Records every output call and every endpoint interaction so tests can
//! assert on the full history without touching GPIO or the network.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use shutterlink::app::events::AppEvent;
use shutterlink::app::ports::{EndpointPort, EventSink, InputPort, OutputPort, SettingsPort};
use shutterlink::control::RawInputs;
use shutterlink::error::{ConfigError, EndpointError};
use shutterlink::rpc::RpcRequest;
use shutterlink::settings::ConnectionConfig;

// ── MockHardware ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockHardware {
    pub inputs: RawInputs,
    pub output_up: bool,
    pub output_down: bool,
    pub indicator_idle: bool,
    pub writes: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, up: bool, down: bool) {
        self.inputs = RawInputs {
            up_pressed: up,
            down_pressed: down,
        };
    }
}

impl InputPort for MockHardware {
    fn read_inputs(&mut self) -> RawInputs {
        self.inputs
    }
}

impl OutputPort for MockHardware {
    fn set_output_up(&mut self, active: bool) {
        self.output_up = active;
        self.writes += 1;
    }

    fn set_output_down(&mut self, active: bool) {
        self.output_down = active;
        self.writes += 1;
    }

    fn set_indicator(&mut self, idle: bool) {
        self.indicator_idle = idle;
        self.writes += 1;
    }
}

// ── MockEndpoint ──────────────────────────────────────────────

/// Scripted endpoint.  Connect and subscribe succeed unless told
/// otherwise; `alive` mirrors the session liveness flag.
#[derive(Debug, Default)]
pub struct MockEndpoint {
    pub refuse_connect: bool,
    pub refuse_subscribe: bool,
    pub alive: bool,
    pub connects: Vec<(String, String)>,
    pub subscribes: u32,
    pub telemetry: Vec<(String, bool)>,
    pub attributes: Vec<(String, bool)>,
    pub acks: Vec<u32>,
    pub inbound: VecDeque<RpcRequest>,
}

#[allow(dead_code)]
impl MockEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(&mut self, id: u32, method: &str, params: &str) {
        let req = RpcRequest::new(id, method, params.as_bytes()).expect("request fits");
        self.inbound.push_back(req);
    }

    pub fn last_attribute(&self, name: &str) -> Option<bool> {
        self.attributes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

impl EndpointPort for MockEndpoint {
    fn connect(&mut self, server_address: &str, auth_token: &str) -> Result<(), EndpointError> {
        self.connects
            .push((server_address.to_owned(), auth_token.to_owned()));
        if self.refuse_connect {
            return Err(EndpointError::ConnectFailed);
        }
        self.alive = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.alive
    }

    fn send_telemetry_bool(&mut self, name: &str, value: bool) -> Result<(), EndpointError> {
        if !self.alive {
            return Err(EndpointError::NotConnected);
        }
        self.telemetry.push((name.to_owned(), value));
        Ok(())
    }

    fn send_attribute_bool(&mut self, name: &str, value: bool) -> Result<(), EndpointError> {
        if !self.alive {
            return Err(EndpointError::NotConnected);
        }
        self.attributes.push((name.to_owned(), value));
        Ok(())
    }

    fn subscribe_rpc(&mut self, _methods: &[&str]) -> Result<(), EndpointError> {
        self.subscribes += 1;
        if self.refuse_subscribe {
            return Err(EndpointError::SubscribeFailed);
        }
        Ok(())
    }

    fn next_request(&mut self) -> Option<RpcRequest> {
        self.inbound.pop_front()
    }

    fn acknowledge(&mut self, request_id: u32) -> Result<(), EndpointError> {
        self.acks.push(request_id);
        Ok(())
    }
}

// ── MemorySettings ────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemorySettings {
    pub stored: RefCell<Option<ConnectionConfig>>,
    pub writes: Cell<u32>,
    pub fail_writes: Cell<bool>,
}

#[allow(dead_code)]
impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(config: ConnectionConfig) -> Self {
        let s = Self::default();
        *s.stored.borrow_mut() = Some(config);
        s
    }
}

impl SettingsPort for MemorySettings {
    fn load(&self) -> Result<ConnectionConfig, ConfigError> {
        self.stored.borrow().clone().ok_or(ConfigError::NotFound)
    }

    fn save(&self, config: &ConnectionConfig) -> Result<(), ConfigError> {
        if self.fail_writes.get() {
            return Err(ConfigError::IoError);
        }
        self.writes.set(self.writes.get() + 1);
        *self.stored.borrow_mut() = Some(config.clone());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

#[allow(dead_code)]
pub fn creds() -> ConnectionConfig {
    ConnectionConfig::new("10.0.0.5", "abc123").expect("valid credentials")
}
