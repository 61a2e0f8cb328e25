// ── Connected-device domain types ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::instance_id::InstanceId;
use crate::command::ConnectionParams;

/// BLE device address, normalized to uppercase colon-separated form
/// (AA:BB:CC:DD:EE:FF).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BleAddress(String);

impl BleAddress {
    /// Create a normalized address from any common format.
    /// Accepts colon-separated, dash-separated, or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref().to_uppercase().replace('-', ":");
        if raw.contains(':') || raw.len() != 12 {
            return Self(raw);
        }
        let pairs: Vec<String> = raw
            .as_bytes()
            .chunks(2)
            .map(|pair| String::from_utf8_lossy(pair).into_owned())
            .collect();
        Self(pairs.join(":"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BleAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Link security level for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConnectionSecurity {
    #[default]
    Open,
    Encrypted,
    EncryptedBonded,
}

impl ConnectionSecurity {
    pub fn is_bonded(self) -> bool {
        matches!(self, Self::EncryptedBonded)
    }
}

/// A connected peripheral as reported by the driver.
///
/// GATT attributes discovered on the device live in the attribute
/// store, keyed under this device's instance id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub instance_id: InstanceId,
    pub address: BleAddress,
    pub name: Option<String>,
    pub security: ConnectionSecurity,
    pub connection: ConnectionParams,
    pub rssi: Option<i16>,
}

impl Device {
    /// Display name: device name, or the address when unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.address.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_normalizes_dashes_and_case() {
        let addr = BleAddress::new("aa-bb-cc-dd-ee-ff");
        assert_eq!(addr.as_str(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn address_normalizes_bare_hex() {
        let addr = BleAddress::new("aabbccddeeff");
        assert_eq!(addr.as_str(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn display_name_falls_back_to_address() {
        let dev = Device {
            instance_id: InstanceId::from("adapter0.dev1"),
            address: BleAddress::new("AA:BB:CC:DD:EE:FF"),
            name: None,
            security: ConnectionSecurity::Open,
            connection: ConnectionParams::default(),
            rssi: None,
        };
        assert_eq!(dev.display_name(), "AA:BB:CC:DD:EE:FF");
    }
}
