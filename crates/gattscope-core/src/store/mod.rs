// ── Reactive store ──

mod attribute_db;
mod data_store;
mod devices;

pub(crate) use attribute_db::AttributeRecord;
pub use data_store::DataStore;
