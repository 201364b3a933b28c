//! Binsight provisioning protocol - request payloads and characteristic routing
//!
//! Every request is a JSON object written to one characteristic; every query is
//! a plain read of one characteristic. [`Request::characteristic`] and
//! [`Query::characteristic`] are the only place that routing is decided.

pub mod ble;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two GATT service groups exposed by a Binsight device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceGroup {
    /// API key configuration
    Api,
    /// Wi-Fi configuration
    Wifi,
}

impl ServiceGroup {
    pub fn uuid(self) -> Uuid {
        match self {
            ServiceGroup::Api => ble::API_SERVICE_UUID,
            ServiceGroup::Wifi => ble::WIFI_SERVICE_UUID,
        }
    }
}

impl fmt::Display for ServiceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceGroup::Api => write!(f, "API service ({})", self.uuid()),
            ServiceGroup::Wifi => write!(f, "Wi-Fi service ({})", self.uuid()),
        }
    }
}

/// A characteristic addressed by its service group and its own UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Characteristic {
    pub service: ServiceGroup,
    pub uuid: Uuid,
}

impl Characteristic {
    const fn new(service: ServiceGroup, uuid: Uuid) -> Self {
        Self { service, uuid }
    }
}

/// API credentials: `{"apiKey", "endpoint", "port"}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiKey {
    pub api_key: String,
    pub endpoint: String,
    pub port: u16,
}

/// Network to join: `{"ssid", "password"}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

/// Network to forget: `{"ssid"}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WifiForget {
    pub ssid: String,
}

/// A write sent to the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    SetApiKey(ApiKey),
    SetWifi(WifiCredentials),
    UnsetWifi(WifiForget),
}

impl Request {
    pub fn characteristic(&self) -> Characteristic {
        match self {
            Request::SetApiKey(_) => Characteristic::new(ServiceGroup::Api, ble::API_KEY_UUID),
            Request::SetWifi(_) => Characteristic::new(ServiceGroup::Wifi, ble::WIFI_CONNECT_UUID),
            Request::UnsetWifi(_) => Characteristic::new(ServiceGroup::Wifi, ble::WIFI_FORGET_UUID),
        }
    }

    /// UTF-8 JSON payload carrying exactly the variant's fields
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Request::SetApiKey(body) => serde_json::to_vec(body),
            Request::SetWifi(body) => serde_json::to_vec(body),
            Request::UnsetWifi(body) => serde_json::to_vec(body),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Request::SetApiKey(_) => "set-api-key",
            Request::SetWifi(_) => "set-wifi",
            Request::UnsetWifi(_) => "unset-wifi",
        }
    }
}

/// A read from the device; queries carry no body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    TestApiKey,
    ConnectionStatus,
}

impl Query {
    pub fn characteristic(self) -> Characteristic {
        match self {
            Query::TestApiKey => Characteristic::new(ServiceGroup::Api, ble::API_KEY_UUID),
            Query::ConnectionStatus => Characteristic::new(ServiceGroup::Wifi, ble::WIFI_STATUS_UUID),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Query::TestApiKey => "test-api-key",
            Query::ConnectionStatus => "connection-status",
        }
    }
}

/// Outcome of the API reachability test as reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyStatus {
    Reachable,
    /// Anything other than the exact success literal, including garbage
    Unreachable,
}

impl ApiKeyStatus {
    pub fn from_response(value: &str) -> Self {
        if value == ble::API_TEST_SUCCESS {
            ApiKeyStatus::Reachable
        } else {
            ApiKeyStatus::Unreachable
        }
    }
}
