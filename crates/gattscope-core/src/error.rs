// ── Core error types ──
//
// User-facing errors from gattscope-core. Consumers never see raw
// driver failures directly; the driver layer maps its own errors into
// these variants before they cross the session boundary.

use thiserror::Error;

use crate::model::InstanceId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("No BLE adapter available")]
    AdapterUnavailable,

    #[error("Session is not running")]
    NotRunning,

    #[error("A driver is already attached to this session")]
    AlreadyAttached,

    #[error("Driver channel closed")]
    ChannelClosed,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {id}")]
    DeviceNotFound { id: InstanceId },

    #[error("Attribute not found: {id}")]
    AttributeNotFound { id: InstanceId },

    #[error("Device is not connected: {id}")]
    NotConnected { id: InstanceId },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Invalid value: {reason}")]
    InvalidValue { reason: String },

    #[error("Operation not supported: {operation} (attribute is {kind})")]
    Unsupported { operation: String, kind: String },

    #[error("Operation rejected by device: {message}")]
    Rejected { message: String },

    // ── Driver errors (wrapped, not exposed raw) ─────────────────────
    #[error("Driver error: {message}")]
    Driver { message: String },
}

impl CoreError {
    /// Wrap an opaque driver-layer failure.
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }
}
