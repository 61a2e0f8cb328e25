// ── Command API ──
//
// All device I/O flows through a unified `Command` enum. The session
// routes each variant to the attached driver over an mpsc channel and
// returns the driver's answer through a oneshot. Selection and
// expansion are NOT commands: they are store mutations that never
// leave the process.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::InstanceId;

/// Connection parameters for an active link, in BLE units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Minimum connection interval, 1.25 ms units.
    pub min_interval: u16,
    /// Maximum connection interval, 1.25 ms units.
    pub max_interval: u16,
    /// Peripheral latency, in connection events.
    pub latency: u16,
    /// Supervision timeout, 10 ms units.
    pub supervision_timeout: u16,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        // 30-50 ms interval, 4 s timeout
        Self {
            min_interval: 24,
            max_interval: 40,
            latency: 0,
            supervision_timeout: 400,
        }
    }
}

impl ConnectionParams {
    /// Interval range in milliseconds, for display.
    pub fn interval_ms(&self) -> (f32, f32) {
        (
            f32::from(self.min_interval) * 1.25,
            f32::from(self.max_interval) * 1.25,
        )
    }
}

/// A command envelope sent through the driver channel.
/// Carries the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All device I/O operations the inspector can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Attribute I/O ────────────────────────────────────────────────
    ReadCharacteristic {
        id: InstanceId,
    },
    WriteCharacteristic {
        id: InstanceId,
        value: Vec<u8>,
    },
    ReadDescriptor {
        id: InstanceId,
    },
    WriteDescriptor {
        id: InstanceId,
        value: Vec<u8>,
    },

    // ── Connection management ────────────────────────────────────────
    Disconnect {
        device: InstanceId,
    },
    Pair {
        device: InstanceId,
    },
    UpdateConnectionParams {
        device: InstanceId,
        params: ConnectionParams,
    },

    // ── Local adapter ────────────────────────────────────────────────
    ToggleAdvertising,
    SetAdvertisingName {
        name: String,
    },
}

impl Command {
    /// Short label for logging and notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReadCharacteristic { .. } => "read characteristic",
            Self::WriteCharacteristic { .. } => "write characteristic",
            Self::ReadDescriptor { .. } => "read descriptor",
            Self::WriteDescriptor { .. } => "write descriptor",
            Self::Disconnect { .. } => "disconnect",
            Self::Pair { .. } => "pair",
            Self::UpdateConnectionParams { .. } => "update connection params",
            Self::ToggleAdvertising => "toggle advertising",
            Self::SetAdvertisingName { .. } => "set advertising name",
        }
    }
}

/// Driver answer to a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Value read from an attribute.
    Value(Vec<u8>),
    /// Operation acknowledged with nothing to return.
    Ack,
    /// Advertising state after a toggle.
    Advertising(bool),
}
