//! The seam between the provisioning pipeline and a BLE stack
//!
//! [`crate::ble::BtleplugTransport`] talks to the platform adapter; tests use an
//! in-memory fake. Everything above this trait is transport-agnostic.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

/// A device seen during one discovery window, named or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub name: Option<String>,
    pub address: String,
}

/// A named, user-addressable device from the latest scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peripheral {
    pub name: String,
    pub address: String,
}

impl fmt::Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.address)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no Bluetooth adapter found")]
    NoAdapter,
    #[error("peripheral {0} is not known to the adapter")]
    PeripheralNotFound(String),
    #[error("characteristic {0} not found")]
    CharacteristicNotFound(Uuid),
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Btleplug(#[from] btleplug::Error),
}

/// Primitive BLE operations. Calls are issued one at a time; implementations
/// do not need to support overlapping operations.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// A connected peripheral
    type Link;
    /// A GATT service resolved on a link
    type Service;

    /// Listen for `window` and report everything seen, in discovery order
    async fn discover(&self, window: Duration) -> Result<Vec<Advertisement>, TransportError>;

    async fn connect(&self, address: &str) -> Result<Self::Link, TransportError>;

    async fn disconnect(&self, link: &Self::Link) -> Result<(), TransportError>;

    /// `None` when the peripheral does not expose the service
    async fn service(&self, link: &Self::Link, uuid: Uuid) -> Option<Self::Service>;

    async fn read(
        &self,
        link: &Self::Link,
        service: &Self::Service,
        characteristic: Uuid,
    ) -> Result<Vec<u8>, TransportError>;

    async fn write(
        &self,
        link: &Self::Link,
        service: &Self::Service,
        characteristic: Uuid,
        data: &[u8],
    ) -> Result<(), TransportError>;
}
