//! Unified error types for the ShutterLink firmware.
//!
//! Every subsystem error is a small `Copy` enum with a hand-written
//! `Display`, so errors can be logged and passed around without
//! allocation.  The top-level [`Error`] collects them for `main`, where
//! `anyhow` takes over.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The telemetry/command endpoint rejected or dropped an operation.
    Endpoint(EndpointError),
    /// Settings could not be loaded, validated or persisted.
    Config(ConfigError),
    /// A persisted connection record is malformed.
    Record(RecordError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint(e) => write!(f, "endpoint: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Record(e) => write!(f, "record: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Endpoint errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointError {
    /// Server unreachable or credentials rejected.
    ConnectFailed,
    /// Operation requires an open session.
    NotConnected,
    /// Publishing telemetry or attributes failed.
    PublishFailed,
    /// RPC topic subscription was refused.
    SubscribeFailed,
    /// The RPC acknowledgement could not be sent.
    AckFailed,
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::NotConnected => write!(f, "not connected"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::SubscribeFailed => write!(f, "RPC subscribe failed"),
            Self::AckFailed => write!(f, "RPC acknowledgement failed"),
        }
    }
}

impl From<EndpointError> for Error {
    fn from(e: EndpointError) -> Self {
        Self::Endpoint(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration / settings-store errors
// ---------------------------------------------------------------------------

/// Errors from [`SettingsPort`](crate::app::ports::SettingsPort) and
/// [`SystemConfig`](crate::config::SystemConfig) validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No record found in storage (first boot).
    NotFound,
    /// Stored record failed decoding.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Persisted record errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Value does not fit in a 32-byte field with its terminator.
    TooLong,
    /// Value contains bytes outside printable ASCII.
    NotPrintable,
    /// Field has no NUL terminator within its width (e.g. erased flash).
    BadTerminator,
    /// Field bytes are not valid UTF-8.
    BadEncoding,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong => write!(f, "value longer than 31 bytes"),
            Self::NotPrintable => write!(f, "value is not printable ASCII"),
            Self::BadTerminator => write!(f, "field missing NUL terminator"),
            Self::BadEncoding => write!(f, "field is not valid UTF-8"),
        }
    }
}

impl From<RecordError> for Error {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}

impl From<RecordError> for ConfigError {
    fn from(_: RecordError) -> Self {
        Self::Corrupted
    }
}
