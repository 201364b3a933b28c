//! btleplug-backed transport for the platform Bluetooth adapter

use btleplug::api::{
    Central, Manager as _, Peripheral as _, PeripheralProperties, ScanFilter, Service, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use log::debug;
use std::time::Duration;
use uuid::Uuid;

use crate::transport::{Advertisement, Transport, TransportError};

/// Upper bound for a single connect, read or write
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Get the default Bluetooth adapter
pub async fn get_adapter() -> Result<Adapter, TransportError> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    adapters.into_iter().next().ok_or(TransportError::NoAdapter)
}

async fn bounded<T>(
    operation: impl Future<Output = Result<T, btleplug::Error>>,
) -> Result<T, TransportError> {
    match tokio::time::timeout(OPERATION_TIMEOUT, operation).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(TransportError::Timeout(OPERATION_TIMEOUT)),
    }
}

fn find_characteristic(
    service: &Service,
    uuid: Uuid,
) -> Result<btleplug::api::Characteristic, TransportError> {
    service
        .characteristics
        .iter()
        .find(|c| c.uuid == uuid)
        .cloned()
        .ok_or(TransportError::CharacteristicNotFound(uuid))
}

/// One peripheral's properties as an advertisement. A peripheral whose
/// properties cannot be read is skipped so the rest of the window survives.
fn advertisement(
    address: String,
    props: Result<Option<PeripheralProperties>, btleplug::Error>,
) -> Option<Advertisement> {
    match props {
        Ok(Some(props)) => Some(Advertisement {
            name: props.local_name,
            address,
        }),
        Ok(None) => None,
        Err(e) => {
            debug!("skipping {address}: {e}");
            None
        }
    }
}

/// Transport over the first adapter the platform manager reports
pub struct BtleplugTransport {
    adapter: Adapter,
}

impl BtleplugTransport {
    pub async fn new() -> Result<Self, TransportError> {
        Ok(Self {
            adapter: get_adapter().await?,
        })
    }

    /// Look up a peripheral from the adapter's cache of the last scan
    async fn find(&self, address: &str) -> Result<Peripheral, TransportError> {
        for peripheral in self.adapter.peripherals().await? {
            if peripheral.address().to_string() == address {
                return Ok(peripheral);
            }
        }
        Err(TransportError::PeripheralNotFound(address.to_string()))
    }
}

impl Transport for BtleplugTransport {
    type Link = Peripheral;
    type Service = Service;

    async fn discover(&self, window: Duration) -> Result<Vec<Advertisement>, TransportError> {
        self.adapter.start_scan(ScanFilter::default()).await?;
        tokio::time::sleep(window).await;

        let peripherals = self.adapter.peripherals().await;
        // stop the scan even when listing failed
        let stopped = self.adapter.stop_scan().await;
        let peripherals = peripherals?;
        stopped?;

        let mut devices = Vec::with_capacity(peripherals.len());
        for peripheral in peripherals {
            let address = peripheral.address().to_string();
            let props = peripheral.properties().await;
            devices.extend(advertisement(address, props));
        }
        debug!("adapter reported {} devices", devices.len());
        Ok(devices)
    }

    async fn connect(&self, address: &str) -> Result<Peripheral, TransportError> {
        let device = self.find(address).await?;

        bounded(device.connect()).await?;
        if let Err(e) = bounded(device.discover_services()).await {
            let _ = device.disconnect().await;
            return Err(e);
        }
        Ok(device)
    }

    async fn disconnect(&self, link: &Peripheral) -> Result<(), TransportError> {
        link.disconnect().await?;
        Ok(())
    }

    async fn service(&self, link: &Peripheral, uuid: Uuid) -> Option<Service> {
        link.services().into_iter().find(|s| s.uuid == uuid)
    }

    async fn read(
        &self,
        link: &Peripheral,
        service: &Service,
        characteristic: Uuid,
    ) -> Result<Vec<u8>, TransportError> {
        let characteristic = find_characteristic(service, characteristic)?;
        bounded(link.read(&characteristic)).await
    }

    async fn write(
        &self,
        link: &Peripheral,
        service: &Service,
        characteristic: Uuid,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let characteristic = find_characteristic(service, characteristic)?;
        bounded(link.write(&characteristic, data, WriteType::WithResponse)).await
    }
}
