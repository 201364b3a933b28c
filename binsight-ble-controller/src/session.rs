//! Provisioning operations on a connected peripheral
//!
//! Writes go out once and report transport errors to the caller: a retried
//! write could be applied twice by the firmware. Reads are retried up to the
//! configured budget and never raise; an exhausted read is
//! [`ReadOutcome::Unavailable`].

use binsight_proto::{
    ApiKey, ApiKeyStatus, Query, Request, ServiceGroup, WifiCredentials, WifiForget,
};
use log::{debug, info, warn};

use crate::config::ReadConfig;
use crate::transport::{Peripheral, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0} was not found on the device")]
    ServiceUnavailable(ServiceGroup),
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("response is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result of a query
#[derive(Debug)]
pub enum ReadOutcome<V> {
    Value(V),
    /// Every attempt failed; `last_error` is the final cause
    Unavailable {
        attempts: u32,
        last_error: Option<SessionError>,
    },
}

impl<V> ReadOutcome<V> {
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> ReadOutcome<U> {
        match self {
            ReadOutcome::Value(v) => ReadOutcome::Value(f(v)),
            ReadOutcome::Unavailable {
                attempts,
                last_error,
            } => ReadOutcome::Unavailable {
                attempts,
                last_error,
            },
        }
    }

    pub fn value(self) -> Option<V> {
        match self {
            ReadOutcome::Value(v) => Some(v),
            ReadOutcome::Unavailable { .. } => None,
        }
    }
}

/// An open connection to one peripheral.
///
/// Only [`crate::connection::connect`] creates a session, and
/// [`Session::disconnect`] consumes it.
pub struct Session<'t, T: Transport> {
    transport: &'t T,
    peripheral: Peripheral,
    link: T::Link,
    api: Option<T::Service>,
    wifi: Option<T::Service>,
    read: ReadConfig,
}

impl<'t, T: Transport> Session<'t, T> {
    pub(crate) fn new(
        transport: &'t T,
        peripheral: Peripheral,
        link: T::Link,
        api: Option<T::Service>,
        wifi: Option<T::Service>,
        read: ReadConfig,
    ) -> Self {
        Self {
            transport,
            peripheral,
            link,
            api,
            wifi,
            read,
        }
    }

    pub fn peripheral(&self) -> &Peripheral {
        &self.peripheral
    }

    pub fn has_service(&self, group: ServiceGroup) -> bool {
        self.service(group).is_ok()
    }

    fn service(&self, group: ServiceGroup) -> Result<&T::Service, SessionError> {
        let service = match group {
            ServiceGroup::Api => self.api.as_ref(),
            ServiceGroup::Wifi => self.wifi.as_ref(),
        };
        service.ok_or(SessionError::ServiceUnavailable(group))
    }

    /// Write `request` to its characteristic. Success means the transport
    /// accepted the write; the device applies it asynchronously.
    pub async fn send(&self, request: &Request) -> Result<(), SessionError> {
        let target = request.characteristic();
        let service = self.service(target.service)?;
        let payload = request.to_bytes()?;

        debug!(
            "writing {} ({} bytes) to {}",
            request.name(),
            payload.len(),
            target.uuid
        );
        self.transport
            .write(&self.link, service, target.uuid, &payload)
            .await?;
        info!("{} sent to {}", request.name(), self.peripheral.name);
        Ok(())
    }

    pub async fn set_api_key(&self, api_key: ApiKey) -> Result<(), SessionError> {
        self.send(&Request::SetApiKey(api_key)).await
    }

    pub async fn set_wifi(&self, credentials: WifiCredentials) -> Result<(), SessionError> {
        self.send(&Request::SetWifi(credentials)).await
    }

    pub async fn unset_wifi(&self, ssid: impl Into<String>) -> Result<(), SessionError> {
        self.send(&Request::UnsetWifi(WifiForget { ssid: ssid.into() }))
            .await
    }

    /// Read the characteristic behind `query` as text, retrying on any failure
    pub async fn query(&self, query: Query) -> ReadOutcome<String> {
        let attempts = self.read.attempts;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.read_once(query).await {
                Ok(value) => return ReadOutcome::Value(value),
                Err(e) => {
                    warn!(
                        "error reading {} ({attempt}/{attempts}): {e}",
                        query.name()
                    );
                    last_error = Some(e);
                }
            }
        }

        ReadOutcome::Unavailable {
            attempts,
            last_error,
        }
    }

    async fn read_once(&self, query: Query) -> Result<String, SessionError> {
        let target = query.characteristic();
        let service = self.service(target.service)?;
        let bytes = self.transport.read(&self.link, service, target.uuid).await?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Ask the device whether it could reach the API with its configured key
    pub async fn test_api_key(&self) -> ReadOutcome<ApiKeyStatus> {
        self.query(Query::TestApiKey)
            .await
            .map(|value| ApiKeyStatus::from_response(&value))
    }

    /// The device's own description of its Wi-Fi state, verbatim
    pub async fn connection_status(&self) -> ReadOutcome<String> {
        self.query(Query::ConnectionStatus).await
    }

    pub async fn disconnect(self) -> Result<(), SessionError> {
        self.transport.disconnect(&self.link).await?;
        info!("disconnected from {}", self.peripheral.name);
        Ok(())
    }
}
