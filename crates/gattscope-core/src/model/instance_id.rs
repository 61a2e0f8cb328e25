// ── Instance identifiers ──
//
// Every node in the attribute tree is addressed by a dot-separated
// path whose segments encode ancestry:
//
//   adapter . device . service . characteristic . descriptor
//
// The path uniquely determines tree position. The local adapter's own
// GATT server occupies the reserved device segment "local", so the
// forest roots are always two-segment ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Device segment reserved for the local adapter's GATT server.
pub const LOCAL_DEVICE_SEGMENT: &str = "local";

/// Dotted-path identifier for one node in the attribute tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Id of the adapter root's own GATT server node.
    pub fn local_root(adapter: &str) -> Self {
        Self(format!("{adapter}.{LOCAL_DEVICE_SEGMENT}"))
    }

    /// Append one path segment, producing a child id.
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}.{segment}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments from adapter downward.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Number of path segments (1 = adapter, 5 = descriptor).
    pub fn depth(&self) -> usize {
        self.0.split('.').count()
    }

    /// Parent id, or `None` at the adapter level.
    pub fn parent(&self) -> Option<Self> {
        let (parent, _) = self.0.rsplit_once('.')?;
        Some(Self(parent.to_owned()))
    }

    /// The id truncated to device depth, or `None` above it.
    pub fn device(&self) -> Option<Self> {
        self.prefix(2)
    }

    /// The id truncated to service depth, or `None` above it.
    pub fn service(&self) -> Option<Self> {
        self.prefix(3)
    }

    /// The id truncated to characteristic depth, or `None` above it.
    pub fn characteristic(&self) -> Option<Self> {
        self.prefix(4)
    }

    /// Whether this id addresses a descriptor-depth node.
    pub fn is_descriptor(&self) -> bool {
        self.depth() == 5
    }

    /// Whether this id is a strict path-descendant of `other`.
    pub fn is_descendant_of(&self, other: &Self) -> bool {
        self.0.len() > other.0.len()
            && self.0.starts_with(other.as_str())
            && self.0.as_bytes().get(other.0.len()) == Some(&b'.')
    }

    fn prefix(&self, segments: usize) -> Option<Self> {
        if self.depth() < segments {
            return None;
        }
        let path: Vec<&str> = self.0.split('.').take(segments).collect();
        Some(Self(path.join(".")))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InstanceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn depth_counts_segments() {
        assert_eq!(InstanceId::from("adapter0").depth(), 1);
        assert_eq!(InstanceId::from("adapter0.dev1.s0.c2.d0").depth(), 5);
    }

    #[test]
    fn parent_strips_last_segment() {
        let id = InstanceId::from("adapter0.dev1.s0.c2");
        assert_eq!(id.parent().unwrap().as_str(), "adapter0.dev1.s0");
        assert_eq!(InstanceId::from("adapter0").parent(), None);
    }

    #[test]
    fn positional_accessors() {
        let id = InstanceId::from("adapter0.dev1.s0.c2.d0");
        assert_eq!(id.device().unwrap().as_str(), "adapter0.dev1");
        assert_eq!(id.service().unwrap().as_str(), "adapter0.dev1.s0");
        assert_eq!(id.characteristic().unwrap().as_str(), "adapter0.dev1.s0.c2");
        assert!(id.is_descriptor());

        let service = InstanceId::from("adapter0.dev1.s0");
        assert_eq!(service.characteristic(), None);
        assert!(!service.is_descriptor());
    }

    #[test]
    fn descendant_requires_segment_boundary() {
        let device = InstanceId::from("adapter0.dev1");
        assert!(InstanceId::from("adapter0.dev1.s0").is_descendant_of(&device));
        assert!(!InstanceId::from("adapter0.dev12").is_descendant_of(&device));
        assert!(!device.is_descendant_of(&device));
    }

    #[test]
    fn local_root_uses_reserved_segment() {
        let root = InstanceId::local_root("adapter0");
        assert_eq!(root.as_str(), "adapter0.local");
        assert_eq!(root.depth(), 2);
    }

    #[test]
    fn child_appends_segment() {
        let dev = InstanceId::from("adapter0.dev1");
        assert_eq!(dev.child("s3").as_str(), "adapter0.dev1.s3");
    }
}
