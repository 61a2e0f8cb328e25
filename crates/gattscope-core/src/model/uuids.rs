// ── GATT assigned-number name resolution ──
//
// Well-known 16-bit UUIDs from the Bluetooth SIG assigned-numbers
// tables. Unknown UUIDs render as their short (or full) hex form.

use uuid::Uuid;

/// Bytes 4..16 of the Bluetooth Base UUID
/// (0000xxxx-0000-1000-8000-00805f9b34fb).
const BASE_UUID_TAIL: [u8; 12] = [
    0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0x80, 0x5f, 0x9b, 0x34, 0xfb,
];

/// The 16-bit assigned number, if this UUID sits on the Bluetooth base.
pub fn assigned_number(uuid: &Uuid) -> Option<u16> {
    let bytes = uuid.as_bytes();
    if bytes[4..] == BASE_UUID_TAIL && bytes[0] == 0 && bytes[1] == 0 {
        Some(u16::from_be_bytes([bytes[2], bytes[3]]))
    } else {
        None
    }
}

/// Build a full UUID from a 16-bit assigned number.
pub fn from_assigned_number(short: u16) -> Uuid {
    let [hi, lo] = short.to_be_bytes();
    let mut bytes = [0u8; 16];
    bytes[2] = hi;
    bytes[3] = lo;
    bytes[4..].copy_from_slice(&BASE_UUID_TAIL);
    Uuid::from_bytes(bytes)
}

/// Compact display form: `0x2A19` for base UUIDs, full hyphenated
/// form otherwise.
pub fn short_uuid(uuid: &Uuid) -> String {
    match assigned_number(uuid) {
        Some(short) => format!("0x{short:04X}"),
        None => uuid.to_string(),
    }
}

/// Human name for a well-known service UUID.
pub fn service_name(uuid: &Uuid) -> Option<&'static str> {
    match assigned_number(uuid)? {
        0x1800 => Some("Generic Access"),
        0x1801 => Some("Generic Attribute"),
        0x1809 => Some("Health Thermometer"),
        0x180A => Some("Device Information"),
        0x180D => Some("Heart Rate"),
        0x180F => Some("Battery Service"),
        0x1810 => Some("Blood Pressure"),
        0x1812 => Some("Human Interface Device"),
        0x181A => Some("Environmental Sensing"),
        _ => None,
    }
}

/// Human name for a well-known characteristic UUID.
pub fn characteristic_name(uuid: &Uuid) -> Option<&'static str> {
    match assigned_number(uuid)? {
        0x2A00 => Some("Device Name"),
        0x2A01 => Some("Appearance"),
        0x2A04 => Some("Peripheral Preferred Connection Parameters"),
        0x2A05 => Some("Service Changed"),
        0x2A19 => Some("Battery Level"),
        0x2A24 => Some("Model Number String"),
        0x2A25 => Some("Serial Number String"),
        0x2A26 => Some("Firmware Revision String"),
        0x2A29 => Some("Manufacturer Name String"),
        0x2A37 => Some("Heart Rate Measurement"),
        0x2A38 => Some("Body Sensor Location"),
        0x2A39 => Some("Heart Rate Control Point"),
        _ => None,
    }
}

/// Human name for a well-known descriptor UUID.
pub fn descriptor_name(uuid: &Uuid) -> Option<&'static str> {
    match assigned_number(uuid)? {
        0x2900 => Some("Characteristic Extended Properties"),
        0x2901 => Some("Characteristic User Description"),
        0x2902 => Some("Client Characteristic Configuration"),
        0x2903 => Some("Server Characteristic Configuration"),
        0x2904 => Some("Characteristic Presentation Format"),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn assigned_number_round_trip() {
        let uuid = from_assigned_number(0x180F);
        assert_eq!(
            uuid.to_string(),
            "0000180f-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(assigned_number(&uuid), Some(0x180F));
    }

    #[test]
    fn vendor_uuid_has_no_assigned_number() {
        let nus: Uuid = "6e400001-b5a3-f393-e0a9-e50e24dcca9e".parse().unwrap();
        assert_eq!(assigned_number(&nus), None);
        assert_eq!(short_uuid(&nus), nus.to_string());
    }

    #[test]
    fn known_names_resolve() {
        assert_eq!(
            service_name(&from_assigned_number(0x180D)),
            Some("Heart Rate")
        );
        assert_eq!(
            characteristic_name(&from_assigned_number(0x2A19)),
            Some("Battery Level")
        );
        assert_eq!(
            descriptor_name(&from_assigned_number(0x2902)),
            Some("Client Characteristic Configuration")
        );
    }

    #[test]
    fn short_uuid_formats_base_uuids() {
        assert_eq!(short_uuid(&from_assigned_number(0x2A19)), "0x2A19");
    }
}
