// ── Unified domain model ──
//
// Canonical representations of BLE inspection entities. The driver
// layer populates these; the TUI only reads them. Attribute records
// here are flat — the hierarchical projection lives in `crate::tree`.

pub mod adapter;
pub mod device;
pub mod gatt;
pub mod instance_id;
pub mod uuids;

// ── Re-exports ──────────────────────────────────────────────────────

pub use adapter::AdapterState;
pub use device::{BleAddress, ConnectionSecurity, Device};
pub use gatt::{Characteristic, CharacteristicProperties, Descriptor, Service};
pub use instance_id::{InstanceId, LOCAL_DEVICE_SEGMENT};
