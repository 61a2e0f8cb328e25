// ── Simulated BLE driver ──
//
// In-memory backend for demos and tests. Enumerates a fixed adapter
// and a couple of peripherals with canonical GATT tables, then
// services commands against a value table held in the store.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::command::{Command, CommandResult};
use crate::error::CoreError;
use crate::model::uuids::from_assigned_number;
use crate::model::{
    AdapterState, BleAddress, Characteristic, CharacteristicProperties, ConnectionSecurity,
    Descriptor, Device, InstanceId, Service,
};
use crate::store::DataStore;
use crate::tree::AttributeKind;

use super::{BleDriver, DriverContext};

const ADAPTER: &str = "adapter0";
const MAX_ATTRIBUTE_LEN: usize = 512;

/// Driver backed by nothing but memory. Useful when no adapter is
/// present, and the backend for the integration tests.
pub struct SimulatedDriver {
    adapter_name: String,
}

impl SimulatedDriver {
    pub fn new() -> Self {
        Self {
            adapter_name: "Simulated Adapter".to_owned(),
        }
    }

    pub fn with_adapter_name(name: impl Into<String>) -> Self {
        Self {
            adapter_name: name.into(),
        }
    }
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl BleDriver for SimulatedDriver {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn run(
        self: Box<Self>,
        mut ctx: DriverContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send>> {
        Box::pin(async move {
            let mut sim = Sim::new(Arc::clone(ctx.store()), self.adapter_name);
            sim.populate();
            info!(devices = sim.store.device_count(), "simulated enumeration complete");

            while let Some((command, responder)) = ctx.next_command().await {
                let label = command.label();
                let result = sim.handle(command);
                match &result {
                    Ok(_) => debug!(command = label, "command ok"),
                    Err(err) => warn!(command = label, %err, "command failed"),
                }
                responder.respond(result);
            }
            Ok(())
        })
    }
}

/// Mutable driver state while the session runs.
struct Sim {
    store: Arc<DataStore>,
    adapter_name: String,
    /// Access properties by characteristic id, checked on read/write.
    props: HashMap<InstanceId, CharacteristicProperties>,
    /// Device Name characteristic of the local GATT server.
    local_name_char: Option<InstanceId>,
}

impl Sim {
    fn new(store: Arc<DataStore>, adapter_name: String) -> Self {
        Self {
            store,
            adapter_name,
            props: HashMap::new(),
            local_name_char: None,
        }
    }

    // ── Enumeration ──────────────────────────────────────────────────

    fn populate(&mut self) {
        let adapter = AdapterState::new(
            ADAPTER,
            self.adapter_name.clone(),
            BleAddress::new("F0:CA:F0:CA:00:01"),
        );
        let local = adapter.instance_id.clone();
        self.store.set_adapter_state(adapter);
        self.populate_local_server(&local);

        let hrm = self.connect(
            "dev1",
            "EE:11:27:94:B0:7F",
            Some("Simulated Heart Rate"),
            -54,
        );
        self.populate_heart_rate_monitor(&hrm);

        let beacon = self.connect("dev2", "C4:1F:6E:02:A3:D8", None, -71);
        self.populate_bare_beacon(&beacon);
    }

    /// The adapter's own GATT server: Generic Access only.
    fn populate_local_server(&mut self, local: &InstanceId) {
        let gap = self.service(local, "svc1", 0x1800);
        let name = self.characteristic(
            &gap,
            "chr1",
            0x2A00,
            CharacteristicProperties {
                read: true,
                write: true,
                ..CharacteristicProperties::default()
            },
            Some(self.adapter_name.clone().into_bytes()),
        );
        self.local_name_char = Some(name);
        self.characteristic(
            &gap,
            "chr2",
            0x2A01,
            CharacteristicProperties::READ,
            Some(vec![0x00, 0x00]),
        );
    }

    fn populate_heart_rate_monitor(&mut self, device: &InstanceId) {
        let gap = self.service(device, "svc1", 0x1800);
        self.characteristic(
            &gap,
            "chr1",
            0x2A00,
            CharacteristicProperties::READ,
            Some(b"Simulated Heart Rate".to_vec()),
        );
        // Appearance: Heart Rate Sensor (0x0341), little-endian.
        self.characteristic(
            &gap,
            "chr2",
            0x2A01,
            CharacteristicProperties::READ,
            Some(vec![0x41, 0x03]),
        );

        let dis = self.service(device, "svc2", 0x180A);
        self.characteristic(
            &dis,
            "chr1",
            0x2A29,
            CharacteristicProperties::READ,
            Some(b"Gattscope Labs".to_vec()),
        );
        self.characteristic(
            &dis,
            "chr2",
            0x2A24,
            CharacteristicProperties::READ,
            Some(b"SIM-HRM-1".to_vec()),
        );
        self.characteristic(
            &dis,
            "chr3",
            0x2A26,
            CharacteristicProperties::READ,
            Some(b"1.0.0".to_vec()),
        );

        let battery = self.service(device, "svc3", 0x180F);
        let level = self.characteristic(
            &battery,
            "chr1",
            0x2A19,
            CharacteristicProperties {
                read: true,
                notify: true,
                ..CharacteristicProperties::default()
            },
            Some(vec![87]),
        );
        self.cccd(&level);

        let heart_rate = self.service(device, "svc4", 0x180D);
        let measurement = self.characteristic(
            &heart_rate,
            "chr1",
            0x2A37,
            CharacteristicProperties {
                notify: true,
                ..CharacteristicProperties::default()
            },
            None,
        );
        self.cccd(&measurement);
        // Body Sensor Location: chest.
        self.characteristic(
            &heart_rate,
            "chr2",
            0x2A38,
            CharacteristicProperties::READ,
            Some(vec![0x01]),
        );
    }

    fn populate_bare_beacon(&mut self, device: &InstanceId) {
        let battery = self.service(device, "svc1", 0x180F);
        self.characteristic(
            &battery,
            "chr1",
            0x2A19,
            CharacteristicProperties::READ,
            Some(vec![42]),
        );
    }

    fn connect(
        &self,
        segment: &str,
        address: &str,
        name: Option<&str>,
        rssi: i16,
    ) -> InstanceId {
        let id = InstanceId::new(ADAPTER).child(segment);
        self.store.connect_device(Device {
            instance_id: id.clone(),
            address: BleAddress::new(address),
            name: name.map(str::to_owned),
            security: ConnectionSecurity::Open,
            connection: crate::command::ConnectionParams::default(),
            rssi: Some(rssi),
        });
        id
    }

    fn service(&self, parent: &InstanceId, segment: &str, short: u16) -> InstanceId {
        let id = parent.child(segment);
        self.store.add_service(Service {
            instance_id: id.clone(),
            uuid: from_assigned_number(short),
        });
        id
    }

    fn characteristic(
        &mut self,
        service: &InstanceId,
        segment: &str,
        short: u16,
        properties: CharacteristicProperties,
        value: Option<Vec<u8>>,
    ) -> InstanceId {
        let id = service.child(segment);
        self.store.add_characteristic(Characteristic {
            instance_id: id.clone(),
            uuid: from_assigned_number(short),
            properties,
            value,
        });
        self.props.insert(id.clone(), properties);
        id
    }

    /// Client Characteristic Configuration descriptor, notifications off.
    fn cccd(&self, characteristic: &InstanceId) {
        self.store.add_descriptor(Descriptor {
            instance_id: characteristic.child("dsc1"),
            uuid: from_assigned_number(0x2902),
            value: Some(vec![0x00, 0x00]),
        });
    }

    // ── Command handling ─────────────────────────────────────────────

    fn handle(&mut self, command: Command) -> Result<CommandResult, CoreError> {
        match command {
            Command::ReadCharacteristic { id } => {
                self.expect_kind(&id, AttributeKind::Characteristic, "read")?;
                if !self.props_of(&id)?.readable() {
                    return Err(CoreError::Rejected {
                        message: "read not permitted".to_owned(),
                    });
                }
                let value = self.store.attribute_value(&id).unwrap_or_default();
                Ok(CommandResult::Value(value))
            }
            Command::WriteCharacteristic { id, value } => {
                self.expect_kind(&id, AttributeKind::Characteristic, "write")?;
                if !self.props_of(&id)?.writable() {
                    return Err(CoreError::Rejected {
                        message: "write not permitted".to_owned(),
                    });
                }
                self.check_length(&value)?;
                self.store.set_attribute_value(&id, value);
                Ok(CommandResult::Ack)
            }
            Command::ReadDescriptor { id } => {
                self.expect_kind(&id, AttributeKind::Descriptor, "read")?;
                let value = self.store.attribute_value(&id).unwrap_or_default();
                Ok(CommandResult::Value(value))
            }
            Command::WriteDescriptor { id, value } => {
                self.expect_kind(&id, AttributeKind::Descriptor, "write")?;
                self.check_length(&value)?;
                self.store.set_attribute_value(&id, value);
                Ok(CommandResult::Ack)
            }
            Command::Disconnect { device } => {
                if self.store.disconnect_device(&device) {
                    self.props.retain(|id, _| !id.is_descendant_of(&device));
                    Ok(CommandResult::Ack)
                } else {
                    Err(CoreError::DeviceNotFound { id: device })
                }
            }
            Command::Pair { device } => {
                let paired = self.store.update_device(&device, |dev| {
                    dev.security = ConnectionSecurity::EncryptedBonded;
                });
                if paired {
                    Ok(CommandResult::Ack)
                } else {
                    Err(CoreError::DeviceNotFound { id: device })
                }
            }
            Command::UpdateConnectionParams { device, params } => {
                if params.min_interval > params.max_interval {
                    return Err(CoreError::InvalidValue {
                        reason: "min interval exceeds max interval".to_owned(),
                    });
                }
                let updated = self.store.update_device(&device, |dev| {
                    dev.connection = params;
                });
                if updated {
                    Ok(CommandResult::Ack)
                } else {
                    Err(CoreError::DeviceNotFound { id: device })
                }
            }
            Command::ToggleAdvertising => {
                let Some(current) = self.store.adapter_snapshot() else {
                    return Err(CoreError::AdapterUnavailable);
                };
                let mut next = (*current).clone();
                next.advertising = !next.advertising;
                let advertising = next.advertising;
                self.store.set_adapter_state(next);
                Ok(CommandResult::Advertising(advertising))
            }
            Command::SetAdvertisingName { name } => {
                if name.is_empty() {
                    return Err(CoreError::InvalidValue {
                        reason: "advertising name is empty".to_owned(),
                    });
                }
                let Some(current) = self.store.adapter_snapshot() else {
                    return Err(CoreError::AdapterUnavailable);
                };
                let mut next = (*current).clone();
                next.name.clone_from(&name);
                self.store.set_adapter_state(next);
                if let Some(id) = &self.local_name_char {
                    self.store.set_attribute_value(id, name.into_bytes());
                }
                Ok(CommandResult::Ack)
            }
        }
    }

    fn expect_kind(
        &self,
        id: &InstanceId,
        expected: AttributeKind,
        operation: &str,
    ) -> Result<(), CoreError> {
        match self.store.attribute_kind(id) {
            None => Err(CoreError::AttributeNotFound { id: id.clone() }),
            Some(kind) if kind == expected => Ok(()),
            Some(kind) => Err(CoreError::Unsupported {
                operation: operation.to_owned(),
                kind: kind.label().to_owned(),
            }),
        }
    }

    fn props_of(&self, id: &InstanceId) -> Result<CharacteristicProperties, CoreError> {
        self.props
            .get(id)
            .copied()
            .ok_or_else(|| CoreError::AttributeNotFound { id: id.clone() })
    }

    fn check_length(&self, value: &[u8]) -> Result<(), CoreError> {
        if value.len() > MAX_ATTRIBUTE_LEN {
            return Err(CoreError::InvalidValue {
                reason: format!("value exceeds {MAX_ATTRIBUTE_LEN} bytes"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sim() -> Sim {
        let mut sim = Sim::new(
            Arc::new(DataStore::new()),
            "Simulated Adapter".to_owned(),
        );
        sim.populate();
        sim
    }

    #[test]
    fn populate_builds_adapter_and_two_devices() {
        let sim = sim();
        let tree = sim.store.tree_snapshot();
        assert_eq!(tree.roots.len(), 3);
        assert_eq!(tree.roots[0].instance_id.as_str(), "adapter0.local");
        assert_eq!(sim.store.device_count(), 2);
    }

    #[test]
    fn read_returns_stored_value() {
        let mut sim = sim();
        let id = InstanceId::from("adapter0.dev1.svc3.chr1");
        let result = sim.handle(Command::ReadCharacteristic { id }).unwrap();
        assert_eq!(result, CommandResult::Value(vec![87]));
    }

    #[test]
    fn read_of_notify_only_characteristic_is_rejected() {
        let mut sim = sim();
        let id = InstanceId::from("adapter0.dev1.svc4.chr1");
        let err = sim.handle(Command::ReadCharacteristic { id }).unwrap_err();
        assert!(matches!(err, CoreError::Rejected { .. }));
    }

    #[test]
    fn write_to_read_only_characteristic_is_rejected() {
        let mut sim = sim();
        let id = InstanceId::from("adapter0.dev1.svc2.chr1");
        let err = sim
            .handle(Command::WriteCharacteristic {
                id,
                value: vec![1],
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Rejected { .. }));
    }

    #[test]
    fn write_updates_descriptor_value() {
        let mut sim = sim();
        let id = InstanceId::from("adapter0.dev1.svc3.chr1.dsc1");
        sim.handle(Command::WriteDescriptor {
            id: id.clone(),
            value: vec![0x01, 0x00],
        })
        .unwrap();
        assert_eq!(sim.store.attribute_value(&id), Some(vec![0x01, 0x00]));
    }

    #[test]
    fn disconnect_removes_device_and_subtree() {
        let mut sim = sim();
        let device = InstanceId::from("adapter0.dev2");
        sim.handle(Command::Disconnect {
            device: device.clone(),
        })
        .unwrap();
        assert_eq!(sim.store.device_count(), 1);
        assert!(sim.store.tree_snapshot().find(&device).is_none());
        let again = sim.handle(Command::Disconnect { device }).unwrap_err();
        assert!(matches!(again, CoreError::DeviceNotFound { .. }));
    }

    #[test]
    fn pair_marks_device_bonded() {
        let mut sim = sim();
        let device = InstanceId::from("adapter0.dev1");
        sim.handle(Command::Pair {
            device: device.clone(),
        })
        .unwrap();
        let dev = sim.store.device_by_id(&device).unwrap();
        assert!(dev.security.is_bonded());
    }

    #[test]
    fn toggle_advertising_flips_state() {
        let mut sim = sim();
        let result = sim.handle(Command::ToggleAdvertising).unwrap();
        assert_eq!(result, CommandResult::Advertising(true));
        assert!(sim.store.adapter_snapshot().unwrap().advertising);
    }

    #[test]
    fn set_advertising_name_updates_adapter_and_gatt() {
        let mut sim = sim();
        sim.handle(Command::SetAdvertisingName {
            name: "Renamed".to_owned(),
        })
        .unwrap();
        assert_eq!(sim.store.adapter_snapshot().unwrap().name, "Renamed");
        let name_char = InstanceId::from("adapter0.local.svc1.chr1");
        assert_eq!(
            sim.store.attribute_value(&name_char),
            Some(b"Renamed".to_vec())
        );
    }

    #[test]
    fn update_connection_params_validates_interval_order() {
        let mut sim = sim();
        let device = InstanceId::from("adapter0.dev1");
        let params = crate::command::ConnectionParams {
            min_interval: 50,
            max_interval: 10,
            ..crate::command::ConnectionParams::default()
        };
        let err = sim
            .handle(Command::UpdateConnectionParams { device, params })
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { .. }));
    }
}
