//! BLE GATT Service Protocol Constants for Binsight Device Provisioning
//!
//! These identifiers are the contract with the peripheral firmware. A firmware
//! revision that moves a characteristic only needs a change here.

use uuid::Uuid;

/// Expand a 16-bit assigned identifier over the Bluetooth base UUID
/// (`0000xxxx-0000-1000-8000-00805f9b34fb`).
pub const fn short_uuid(id: u16) -> Uuid {
    Uuid::from_u128(((id as u128) << 96) | 0x0000_1000_8000_0080_5f9b_34fb)
}

/// API service: `abc0`
pub const API_SERVICE_UUID: Uuid = short_uuid(0xabc0);

/// API key characteristic (write: set key, read: reachability test)
pub const API_KEY_UUID: Uuid = short_uuid(0xabc1);

/// Wi-Fi service: 31415924-5358-9793-2384-626433832790
pub const WIFI_SERVICE_UUID: Uuid = Uuid::from_u128(0x31415924_5358_9793_2384_626433832790);

/// Wi-Fi connection status characteristic (read)
pub const WIFI_STATUS_UUID: Uuid = Uuid::from_u128(0x31415924_5358_9793_2384_626433832791);

/// Wi-Fi connect characteristic (write `{"ssid", "password"}`)
pub const WIFI_CONNECT_UUID: Uuid = Uuid::from_u128(0x31415924_5358_9793_2384_626433832792);

/// Wi-Fi forget characteristic (write `{"ssid"}`)
pub const WIFI_FORGET_UUID: Uuid = Uuid::from_u128(0x31415924_5358_9793_2384_626433832794);

/// Value the API key characteristic reads back when the device reached the API
pub const API_TEST_SUCCESS: &str = "True";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_uuids_use_base_uuid() {
        assert_eq!(
            API_SERVICE_UUID.to_string(),
            "0000abc0-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            API_KEY_UUID.to_string(),
            "0000abc1-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn wifi_uuids_match_firmware_table() {
        assert_eq!(
            WIFI_SERVICE_UUID,
            Uuid::parse_str("31415924535897932384626433832790").unwrap()
        );
        assert_eq!(
            WIFI_STATUS_UUID,
            Uuid::parse_str("31415924535897932384626433832791").unwrap()
        );
        assert_eq!(
            WIFI_CONNECT_UUID,
            Uuid::parse_str("31415924535897932384626433832792").unwrap()
        );
        assert_eq!(
            WIFI_FORGET_UUID,
            Uuid::parse_str("31415924535897932384626433832794").unwrap()
        );
    }
}
