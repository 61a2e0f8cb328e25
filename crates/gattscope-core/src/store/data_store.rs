// ── Central reactive data store ──
//
// Single source of truth for everything the inspector renders:
// adapter state, connected devices, the attribute tree and the
// selection. The driver layer creates and destroys nodes; UI code
// only reads snapshots and requests selection/expansion changes.
// Every mutation is broadcast to subscribers via `watch` channels.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::attribute_db::{AttributeDb, AttributeRecord};
use super::devices::DeviceCollection;
use crate::model::{
    AdapterState, BleAddress, Characteristic, Descriptor, Device, InstanceId, Service,
};
use crate::stream::SnapshotStream;
use crate::tree::{AttributeKind, AttributeTree};

/// Central reactive store for one inspection session.
pub struct DataStore {
    adapter: watch::Sender<Option<Arc<AdapterState>>>,
    devices: DeviceCollection,
    attributes: AttributeDb,
    selected: watch::Sender<Option<InstanceId>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (adapter, _) = watch::channel(None);
        let (selected, _) = watch::channel(None);
        Self {
            adapter,
            devices: DeviceCollection::new(),
            attributes: AttributeDb::new(),
            selected,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn adapter_snapshot(&self) -> Option<Arc<AdapterState>> {
        self.adapter.borrow().clone()
    }

    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.devices.snapshot()
    }

    pub fn tree_snapshot(&self) -> Arc<AttributeTree> {
        self.attributes.snapshot()
    }

    pub fn selected(&self) -> Option<InstanceId> {
        self.selected.borrow().clone()
    }

    pub fn device_by_id(&self, id: &InstanceId) -> Option<Arc<Device>> {
        self.devices.get(id)
    }

    pub fn device_by_address(&self, address: &BleAddress) -> Option<Arc<Device>> {
        self.devices.get_by_address(address)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_tree(&self) -> SnapshotStream<Arc<AttributeTree>> {
        SnapshotStream::new(self.attributes.subscribe())
    }

    pub fn subscribe_devices(&self) -> SnapshotStream<Arc<Vec<Arc<Device>>>> {
        SnapshotStream::new(self.devices.subscribe())
    }

    pub fn subscribe_adapter(&self) -> SnapshotStream<Option<Arc<AdapterState>>> {
        SnapshotStream::new(self.adapter.subscribe())
    }

    pub fn subscribe_selection(&self) -> SnapshotStream<Option<InstanceId>> {
        SnapshotStream::new(self.selected.subscribe())
    }

    // ── UI-side mutations ────────────────────────────────────────────

    /// Change the selection. `None` clears it.
    pub fn select(&self, id: Option<InstanceId>) {
        self.selected.send_modify(|current| *current = id);
    }

    /// Flip a container node's expansion flag. No-op on descriptors
    /// and unknown ids.
    pub fn set_attribute_expanded(&self, id: &InstanceId, expanded: bool) -> bool {
        self.attributes.set_expanded(id, expanded)
    }

    // ── Driver-side mutations ────────────────────────────────────────

    /// Publish adapter state, creating the adapter root node on first
    /// sight. Later updates keep the node's expansion flag but mirror
    /// a renamed adapter into the tree.
    pub fn set_adapter_state(&self, state: AdapterState) {
        let root = state.instance_id.clone();
        if self.attributes.contains(&root) {
            self.attributes.rename(&root, &state.name);
        } else {
            self.attributes.insert_root(
                root,
                AttributeRecord::container(AttributeKind::Adapter, state.name.clone()),
            );
        }
        self.adapter.send_modify(|a| *a = Some(Arc::new(state)));
    }

    /// Register a newly connected device and its tree root.
    pub fn connect_device(&self, device: Device) {
        debug!(id = %device.instance_id, address = %device.address, "device connected");
        let root = device.instance_id.clone();
        let name = device.display_name().to_owned();
        self.devices.upsert(device);
        self.attributes
            .insert_root(root, AttributeRecord::container(AttributeKind::Device, name));
    }

    /// Remove a device and its whole subtree. Clears the selection if
    /// it pointed into the removed subtree.
    pub fn disconnect_device(&self, id: &InstanceId) -> bool {
        let removed = self.devices.remove(id).is_some();
        let pruned = self.attributes.remove(id);
        if removed || pruned {
            debug!(%id, "device removed");
            self.selected.send_if_modified(|selected| {
                let stale = selected
                    .as_ref()
                    .is_some_and(|s| s == id || s.is_descendant_of(id));
                if stale {
                    *selected = None;
                }
                stale
            });
        }
        removed || pruned
    }

    /// Apply a metadata update to one device.
    pub fn update_device(&self, id: &InstanceId, f: impl FnOnce(&mut Device)) -> bool {
        self.devices.update(id, f)
    }

    /// Insert a discovered service under its parent node.
    pub fn add_service(&self, service: Service) -> bool {
        let Some(parent) = service.instance_id.parent() else {
            return false;
        };
        let record = AttributeRecord {
            kind: AttributeKind::Service,
            name: service.display_name(),
            uuid: Some(service.uuid),
            value: None,
            properties: None,
            expanded: false,
        };
        self.attributes
            .insert_child(&parent, service.instance_id, record)
    }

    /// Insert a discovered characteristic under its service.
    pub fn add_characteristic(&self, characteristic: Characteristic) -> bool {
        let Some(parent) = characteristic.instance_id.parent() else {
            return false;
        };
        let record = AttributeRecord {
            kind: AttributeKind::Characteristic,
            name: characteristic.display_name(),
            uuid: Some(characteristic.uuid),
            value: characteristic.value.clone(),
            properties: Some(characteristic.properties),
            expanded: false,
        };
        self.attributes
            .insert_child(&parent, characteristic.instance_id, record)
    }

    /// Insert a discovered descriptor under its characteristic.
    pub fn add_descriptor(&self, descriptor: Descriptor) -> bool {
        let Some(parent) = descriptor.instance_id.parent() else {
            return false;
        };
        let record = AttributeRecord {
            kind: AttributeKind::Descriptor,
            name: descriptor.display_name(),
            uuid: Some(descriptor.uuid),
            value: descriptor.value.clone(),
            properties: None,
            expanded: false,
        };
        self.attributes
            .insert_child(&parent, descriptor.instance_id, record)
    }

    /// Update a characteristic or descriptor value after device I/O.
    pub fn set_attribute_value(&self, id: &InstanceId, value: Vec<u8>) -> bool {
        self.attributes.set_value(id, value)
    }

    pub fn attribute_value(&self, id: &InstanceId) -> Option<Vec<u8>> {
        self.attributes.value_of(id)
    }

    pub fn attribute_kind(&self, id: &InstanceId) -> Option<AttributeKind> {
        self.attributes.kind_of(id)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
