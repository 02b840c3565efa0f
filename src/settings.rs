//! Persisted endpoint credentials and their fixed-width record layout.
//!
//! ```text
//!  offset  0                               32                              64
//!          ├── server address (31 + NUL) ──┼── access token (31 + NUL) ────┤
//! ```
//!
//! Each field is NUL-terminated and NUL-padded to 32 bytes.  There is no
//! version byte.  Values longer than 31 bytes are rejected when the
//! [`ConnectionConfig`] is built, so every config that exists can be
//! encoded losslessly.

use core::fmt;

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Width of each string field in the persisted record, terminator included.
pub const FIELD_LEN: usize = 32;
/// Longest value a field can hold.
pub const MAX_VALUE_LEN: usize = FIELD_LEN - 1;
/// Total persisted record size.
pub const RECORD_LEN: usize = 2 * FIELD_LEN;

/// Endpoint address and device access token.
///
/// Either field may be empty, which means "not provisioned yet".
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    server_address: String<MAX_VALUE_LEN>,
    auth_token: String<MAX_VALUE_LEN>,
}

impl ConnectionConfig {
    /// Build a config, rejecting values that would not survive the record.
    pub fn new(server_address: &str, auth_token: &str) -> Result<Self, RecordError> {
        Ok(Self {
            server_address: checked_field(server_address)?,
            auth_token: checked_field(auth_token)?,
        })
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Both values present — a connection attempt is allowed.
    pub fn is_complete(&self) -> bool {
        !self.server_address.is_empty() && !self.auth_token.is_empty()
    }

    /// Serialise into the fixed 64-byte record.
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut record = [0u8; RECORD_LEN];
        let (server, token) = record.split_at_mut(FIELD_LEN);
        server[..self.server_address.len()].copy_from_slice(self.server_address.as_bytes());
        token[..self.auth_token.len()].copy_from_slice(self.auth_token.as_bytes());
        record
    }

    /// Parse a 64-byte record.
    pub fn decode(record: &[u8; RECORD_LEN]) -> Result<Self, RecordError> {
        let (server, token) = record.split_at(FIELD_LEN);
        Self::new(decode_field(server)?, decode_field(token)?)
    }
}

// The token is a credential; keep it out of logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("server_address", &self.server_address)
            .field("auth_token", &MaskedToken(&self.auth_token))
            .finish()
    }
}

/// Renders a token as its first two characters followed by `***`.
pub struct MaskedToken<'a>(pub &'a str);

impl fmt::Debug for MaskedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for MaskedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<empty>");
        }
        let shown = self.0.get(..2).unwrap_or("");
        write!(f, "{}***", shown)
    }
}

/// Returns `true` if every byte of `s` is in the printable ASCII range
/// `0x20..=0x7E` (space through tilde, inclusive).
fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn checked_field(value: &str) -> Result<String<MAX_VALUE_LEN>, RecordError> {
    if value.len() > MAX_VALUE_LEN {
        return Err(RecordError::TooLong);
    }
    if !is_printable_ascii(value) {
        return Err(RecordError::NotPrintable);
    }
    let mut field = String::new();
    field.push_str(value).map_err(|_| RecordError::TooLong)?;
    Ok(field)
}

fn decode_field(bytes: &[u8]) -> Result<&str, RecordError> {
    let end = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or(RecordError::BadTerminator)?;
    core::str::from_utf8(&bytes[..end]).map_err(|_| RecordError::BadEncoding)
}
