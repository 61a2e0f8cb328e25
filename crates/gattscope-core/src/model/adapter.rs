// ── Local adapter state ──

use serde::{Deserialize, Serialize};

use super::device::BleAddress;
use super::instance_id::InstanceId;

/// Snapshot of the local BLE adapter as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterState {
    /// Root id of the adapter's own GATT server node
    /// (`<adapter>.local`).
    pub instance_id: InstanceId,
    pub name: String,
    pub address: BleAddress,
    /// Whether the adapter is currently advertising.
    pub advertising: bool,
    /// Whether the underlying driver considers the adapter usable.
    pub available: bool,
}

impl AdapterState {
    pub fn new(adapter: &str, name: impl Into<String>, address: BleAddress) -> Self {
        Self {
            instance_id: InstanceId::local_root(adapter),
            name: name.into(),
            address,
            advertising: false,
            available: true,
        }
    }
}
