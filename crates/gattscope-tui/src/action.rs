//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use gattscope_core::{
    AdapterState, AttributeTree, ConnectionParams, Device, InstanceId, SessionState,
};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification, also appended to the Log screen.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }
}

/// Pending confirmation action.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    Disconnect { device: InstanceId, name: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnect { name, .. } => write!(f, "Disconnect {name}?"),
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),

    // ── Data Events (from gattscope-core streams) ─────────────────
    TreeUpdated(Arc<AttributeTree>),
    DevicesUpdated(Arc<Vec<Arc<Device>>>),
    AdapterUpdated(Option<Arc<AdapterState>>),
    SelectionChanged(Option<InstanceId>),
    SessionChanged(SessionState),

    // ── Selection & Expansion (applied to the session store) ──────
    SelectAttribute(Option<InstanceId>),
    SetAttributeExpanded(InstanceId, bool),

    // ── Attribute I/O ─────────────────────────────────────────────
    RequestRead(InstanceId),
    RequestWrite(InstanceId, Vec<u8>),

    // ── Connection Management ─────────────────────────────────────
    RequestDisconnect(InstanceId),
    RequestPair(InstanceId),
    RequestConnectionParams(InstanceId, ConnectionParams),

    // ── Local Adapter ─────────────────────────────────────────────
    RequestToggleAdvertising,
    RequestAdvertisingName(String),

    // ── Confirm Dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
