// ── GATT attribute domain types ──
//
// Flat records for discovered services, characteristics and
// descriptors. Hierarchy is encoded in the instance-id paths; the
// ordered tree projection is built by the store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::instance_id::InstanceId;
use super::uuids;

/// Access properties advertised by a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)] // mirrors the GATT property bitfield
pub struct CharacteristicProperties {
    pub read: bool,
    pub write: bool,
    pub write_without_response: bool,
    pub notify: bool,
    pub indicate: bool,
}

impl CharacteristicProperties {
    pub const READ: Self = Self {
        read: true,
        write: false,
        write_without_response: false,
        notify: false,
        indicate: false,
    };

    pub fn readable(self) -> bool {
        self.read
    }

    pub fn writable(self) -> bool {
        self.write || self.write_without_response
    }
}

/// A discovered primary or secondary service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub instance_id: InstanceId,
    pub uuid: Uuid,
}

impl Service {
    pub fn display_name(&self) -> String {
        uuids::service_name(&self.uuid)
            .map_or_else(|| uuids::short_uuid(&self.uuid), str::to_owned)
    }
}

/// A discovered characteristic under a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub instance_id: InstanceId,
    pub uuid: Uuid,
    pub properties: CharacteristicProperties,
    pub value: Option<Vec<u8>>,
}

impl Characteristic {
    pub fn display_name(&self) -> String {
        uuids::characteristic_name(&self.uuid)
            .map_or_else(|| uuids::short_uuid(&self.uuid), str::to_owned)
    }
}

/// A discovered descriptor under a characteristic. Always a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub instance_id: InstanceId,
    pub uuid: Uuid,
    pub value: Option<Vec<u8>>,
}

impl Descriptor {
    pub fn display_name(&self) -> String {
        uuids::descriptor_name(&self.uuid)
            .map_or_else(|| uuids::short_uuid(&self.uuid), str::to_owned)
    }
}
