// ── Connected-device collection ──
//
// Lock-free storage for device metadata with push-based change
// notification. Display order of devices comes from the attribute
// tree, not from this collection.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{BleAddress, Device, InstanceId};

pub(crate) struct DeviceCollection {
    by_id: DashMap<InstanceId, Arc<Device>>,
    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<Device>>>>,
}

impl DeviceCollection {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_id: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or update a device. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, device: Device) -> bool {
        let id = device.instance_id.clone();
        let is_new = !self.by_id.contains_key(&id);
        self.by_id.insert(id, Arc::new(device));
        self.rebuild_snapshot();
        is_new
    }

    pub(crate) fn remove(&self, id: &InstanceId) -> Option<Arc<Device>> {
        let removed = self.by_id.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    pub(crate) fn get(&self, id: &InstanceId) -> Option<Arc<Device>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn get_by_address(&self, address: &BleAddress) -> Option<Arc<Device>> {
        self.by_id
            .iter()
            .find(|r| &r.value().address == address)
            .map(|r| Arc::clone(r.value()))
    }

    /// Apply an in-place update to one device. Returns `false` for
    /// unknown ids.
    pub(crate) fn update(&self, id: &InstanceId, f: impl FnOnce(&mut Device)) -> bool {
        let Some(current) = self.get(id) else {
            return false;
        };
        let mut updated = (*current).clone();
        f(&mut updated);
        self.by_id.insert(id.clone(), Arc::new(updated));
        self.rebuild_snapshot();
        true
    }

    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<Device>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<Device>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::ConnectionParams;
    use crate::model::ConnectionSecurity;

    fn device(id: &str, address: &str) -> Device {
        Device {
            instance_id: InstanceId::from(id),
            address: BleAddress::new(address),
            name: None,
            security: ConnectionSecurity::Open,
            connection: ConnectionParams::default(),
            rssi: None,
        }
    }

    #[test]
    fn upsert_reports_newness() {
        let devices = DeviceCollection::new();
        assert!(devices.upsert(device("a0.d1", "AA:BB:CC:DD:EE:01")));
        assert!(!devices.upsert(device("a0.d1", "AA:BB:CC:DD:EE:01")));
        assert_eq!(devices.len(), 1);
    }

    #[test]
    fn lookup_by_address() {
        let devices = DeviceCollection::new();
        devices.upsert(device("a0.d1", "AA:BB:CC:DD:EE:01"));
        let found = devices
            .get_by_address(&BleAddress::new("aa-bb-cc-dd-ee-01"))
            .unwrap();
        assert_eq!(found.instance_id.as_str(), "a0.d1");
    }

    #[test]
    fn update_rewrites_metadata() {
        let devices = DeviceCollection::new();
        devices.upsert(device("a0.d1", "AA:BB:CC:DD:EE:01"));
        assert!(devices.update(&InstanceId::from("a0.d1"), |d| {
            d.security = ConnectionSecurity::EncryptedBonded;
        }));
        assert!(
            devices
                .get(&InstanceId::from("a0.d1"))
                .unwrap()
                .security
                .is_bonded()
        );
        assert!(!devices.update(&InstanceId::from("a0.d9"), |_| {}));
    }
}
