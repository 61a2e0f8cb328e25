// ── Attribute database ──
//
// Flat records plus per-parent ordered child lists, projected into an
// immutable `AttributeTree` snapshot broadcast over a watch channel.
// Child order is discovery order and never re-sorted; the forest root
// order is adapter first, then devices in connection order.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use tokio::sync::watch;
use uuid::Uuid;

use crate::model::{CharacteristicProperties, InstanceId};
use crate::tree::{AttributeKind, AttributeNode, AttributeTree};

/// One flat attribute record. The projected node's `children` come
/// from the sibling-order lists, not from the record itself.
#[derive(Debug, Clone)]
pub(crate) struct AttributeRecord {
    pub kind: AttributeKind,
    pub name: String,
    pub uuid: Option<Uuid>,
    pub value: Option<Vec<u8>>,
    pub properties: Option<CharacteristicProperties>,
    pub expanded: bool,
}

impl AttributeRecord {
    pub(crate) fn container(kind: AttributeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            uuid: None,
            value: None,
            properties: None,
            expanded: false,
        }
    }
}

#[derive(Default)]
struct DbInner {
    /// Forest roots in display order.
    roots: Vec<InstanceId>,
    records: IndexMap<InstanceId, AttributeRecord>,
    /// Ordered children per parent id.
    children: HashMap<InstanceId, Vec<InstanceId>>,
}

impl DbInner {
    fn project(&self, id: &InstanceId) -> Option<AttributeNode> {
        let record = self.records.get(id)?;
        let children = self
            .children
            .get(id)
            .map(|ids| ids.iter().filter_map(|c| self.project(c)).collect())
            .unwrap_or_default();

        Some(AttributeNode {
            instance_id: id.clone(),
            kind: record.kind,
            name: record.name.clone(),
            uuid: record.uuid,
            value: record.value.clone(),
            properties: record.properties,
            expanded: record.expanded,
            children,
        })
    }

    fn remove_subtree(&mut self, id: &InstanceId) {
        if let Some(children) = self.children.remove(id) {
            for child in &children {
                self.remove_subtree(child);
            }
        }
        self.records.shift_remove(id);
    }
}

/// Store-internal attribute database. Every mutation rebuilds and
/// broadcasts the full tree snapshot.
pub(crate) struct AttributeDb {
    inner: RwLock<DbInner>,
    snapshot: watch::Sender<Arc<AttributeTree>>,
}

impl AttributeDb {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(AttributeTree::default()));
        Self {
            inner: RwLock::new(DbInner::default()),
            snapshot,
        }
    }

    /// Append a forest root (adapter local server or a device).
    pub(crate) fn insert_root(&self, id: InstanceId, record: AttributeRecord) {
        self.mutate(|inner| {
            if !inner.records.contains_key(&id) {
                inner.roots.push(id.clone());
            }
            inner.records.insert(id, record);
            true
        });
    }

    /// Insert (or replace) a child under `parent`, preserving sibling
    /// order on first insertion. No-op if the parent is unknown.
    pub(crate) fn insert_child(
        &self,
        parent: &InstanceId,
        id: InstanceId,
        record: AttributeRecord,
    ) -> bool {
        self.mutate(|inner| {
            if !inner.records.contains_key(parent) {
                return false;
            }
            if !inner.records.contains_key(&id) {
                inner
                    .children
                    .entry(parent.clone())
                    .or_default()
                    .push(id.clone());
            }
            inner.records.insert(id, record);
            true
        })
    }

    /// Remove a node and its whole subtree. Returns whether anything
    /// was removed.
    pub(crate) fn remove(&self, id: &InstanceId) -> bool {
        self.mutate(|inner| {
            if !inner.records.contains_key(id) {
                return false;
            }
            inner.roots.retain(|root| root != id);
            if let Some(parent) = id.parent() {
                if let Some(siblings) = inner.children.get_mut(&parent) {
                    siblings.retain(|sibling| sibling != id);
                }
            }
            inner.remove_subtree(id);
            true
        })
    }

    /// Update a node's display name in place, keeping value, properties
    /// and expansion. Returns whether anything changed.
    pub(crate) fn rename(&self, id: &InstanceId, name: &str) -> bool {
        self.mutate(|inner| match inner.records.get_mut(id) {
            Some(record) if record.name != name => {
                record.name = name.to_owned();
                true
            }
            _ => false,
        })
    }

    pub(crate) fn set_value(&self, id: &InstanceId, value: Vec<u8>) -> bool {
        self.mutate(|inner| match inner.records.get_mut(id) {
            Some(record) => {
                record.value = Some(value);
                true
            }
            None => false,
        })
    }

    /// Flip the expansion flag. No-op on descriptors and unknown ids.
    pub(crate) fn set_expanded(&self, id: &InstanceId, expanded: bool) -> bool {
        self.mutate(|inner| match inner.records.get_mut(id) {
            Some(record) if record.kind.is_container() && record.expanded != expanded => {
                record.expanded = expanded;
                true
            }
            _ => false,
        })
    }

    pub(crate) fn contains(&self, id: &InstanceId) -> bool {
        self.read(|inner| inner.records.contains_key(id))
    }

    pub(crate) fn kind_of(&self, id: &InstanceId) -> Option<AttributeKind> {
        self.read(|inner| inner.records.get(id).map(|r| r.kind))
    }

    pub(crate) fn value_of(&self, id: &InstanceId) -> Option<Vec<u8>> {
        self.read(|inner| inner.records.get(id).and_then(|r| r.value.clone()))
    }

    pub(crate) fn snapshot(&self) -> Arc<AttributeTree> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<AttributeTree>> {
        self.snapshot.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn read<R>(&self, f: impl FnOnce(&DbInner) -> R) -> R {
        // Lock poisoning only happens after a panic elsewhere;
        // propagate the panic rather than limp on.
        #[allow(clippy::unwrap_used)]
        let inner = self.inner.read().unwrap();
        f(&inner)
    }

    /// Run a mutation; rebuild and broadcast the snapshot if it
    /// reported a change. Returns the mutation's result.
    fn mutate(&self, f: impl FnOnce(&mut DbInner) -> bool) -> bool {
        #[allow(clippy::unwrap_used)]
        let mut inner = self.inner.write().unwrap();
        let changed = f(&mut inner);
        if changed {
            let roots = inner
                .roots
                .iter()
                .filter_map(|id| inner.project(id))
                .collect();
            self.snapshot
                .send_modify(|snap| *snap = Arc::new(AttributeTree { roots }));
        }
        changed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn db_with_device() -> (AttributeDb, InstanceId, InstanceId) {
        let db = AttributeDb::new();
        let dev = InstanceId::from("a0.d1");
        db.insert_root(
            dev.clone(),
            AttributeRecord::container(AttributeKind::Device, "Peer"),
        );
        let svc = dev.child("s0");
        db.insert_child(
            &dev,
            svc.clone(),
            AttributeRecord::container(AttributeKind::Service, "Battery Service"),
        );
        (db, dev, svc)
    }

    #[test]
    fn projection_preserves_insertion_order() {
        let (db, dev, _) = db_with_device();
        db.insert_child(
            &dev,
            dev.child("s1"),
            AttributeRecord::container(AttributeKind::Service, "Heart Rate"),
        );

        let tree = db.snapshot();
        let names: Vec<&str> = tree.roots[0]
            .children
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["Battery Service", "Heart Rate"]);
    }

    #[test]
    fn insert_child_without_parent_is_rejected() {
        let db = AttributeDb::new();
        let orphan = InstanceId::from("a0.d9.s0");
        assert!(!db.insert_child(
            &InstanceId::from("a0.d9"),
            orphan.clone(),
            AttributeRecord::container(AttributeKind::Service, "orphan"),
        ));
        assert!(!db.contains(&orphan));
    }

    #[test]
    fn remove_drops_the_whole_subtree() {
        let (db, dev, svc) = db_with_device();
        assert!(db.remove(&dev));
        assert!(!db.contains(&svc));
        assert!(db.snapshot().is_empty());
        // Removing again is a no-op.
        assert!(!db.remove(&dev));
    }

    #[test]
    fn set_expanded_ignores_descriptors() {
        let (db, _, svc) = db_with_device();
        let chr = svc.child("c0");
        db.insert_child(
            &svc,
            chr.clone(),
            AttributeRecord::container(AttributeKind::Characteristic, "Battery Level"),
        );
        let desc = chr.child("d0");
        db.insert_child(&chr, desc.clone(), AttributeRecord {
            kind: AttributeKind::Descriptor,
            name: "CCCD".into(),
            uuid: None,
            value: None,
            properties: None,
            expanded: false,
        });

        assert!(db.set_expanded(&svc, true));
        assert!(!db.set_expanded(&desc, true));
        // Re-applying the same state does not broadcast.
        assert!(!db.set_expanded(&svc, true));
    }

    #[test]
    fn snapshot_broadcasts_on_value_change() {
        let (db, _, svc) = db_with_device();
        let chr = svc.child("c0");
        db.insert_child(
            &svc,
            chr.clone(),
            AttributeRecord::container(AttributeKind::Characteristic, "Battery Level"),
        );

        let mut rx = db.subscribe();
        rx.borrow_and_update();
        assert!(db.set_value(&chr, vec![0x64]));
        assert!(rx.has_changed().unwrap());
        let tree = rx.borrow_and_update().clone();
        assert_eq!(tree.find(&chr).unwrap().value, Some(vec![0x64]));
    }
}
