// gattscope-core: Reactive data layer between a BLE driver and the inspector TUI.

pub mod command;
pub mod driver;
pub mod error;
pub mod model;
pub mod nav;
pub mod session;
pub mod store;
pub mod stream;
pub mod tree;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult, ConnectionParams};
pub use driver::{BleDriver, CommandResponder, DriverContext, sim::SimulatedDriver};
pub use error::CoreError;
pub use nav::{NavRequest, expand_selection, next_selection};
pub use session::{Session, SessionState};
pub use store::DataStore;
pub use stream::SnapshotStream;
pub use tree::{AttributeKind, AttributeNode, AttributeTree};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AdapterState, BleAddress, Characteristic, CharacteristicProperties, ConnectionSecurity,
    Descriptor, Device, InstanceId, Service,
};
