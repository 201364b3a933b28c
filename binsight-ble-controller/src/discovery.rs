//! Discovery of nearby, named peripherals

use log::{info, warn};

use crate::config::ScanConfig;
use crate::transport::{Advertisement, Peripheral, Transport};

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("no devices found after {attempts} scans")]
    NoDevicesFound { attempts: u32 },
}

/// Scan until an attempt reports at least one named device.
///
/// Each attempt listens for `config.window`. Nameless devices are dropped, and
/// a transport failure counts as an empty attempt. The list of the first
/// non-empty attempt is returned in discovery order.
pub async fn scan<T: Transport>(
    transport: &T,
    config: &ScanConfig,
) -> Result<Vec<Peripheral>, ScanError> {
    for attempt in 1..=config.attempts {
        info!(
            "scan {attempt}/{}: listening for {}s",
            config.attempts,
            config.window.as_secs()
        );

        let advertisements = match transport.discover(config.window).await {
            Ok(advertisements) => advertisements,
            Err(e) => {
                warn!("scan {attempt}/{} failed: {e}", config.attempts);
                continue;
            }
        };

        let devices = named(advertisements);
        if !devices.is_empty() {
            info!("discovered {} named devices", devices.len());
            return Ok(devices);
        }
        info!("no named devices found, rescanning");
    }

    Err(ScanError::NoDevicesFound {
        attempts: config.attempts,
    })
}

fn named(advertisements: Vec<Advertisement>) -> Vec<Peripheral> {
    advertisements
        .into_iter()
        .filter_map(|advertisement| match advertisement.name {
            Some(name) if !name.is_empty() => Some(Peripheral {
                name,
                address: advertisement.address,
            }),
            _ => None,
        })
        .collect()
}

/// Pick a device by its 1-based position in the scan list
pub fn select(devices: &[Peripheral], index: usize) -> Option<&Peripheral> {
    index.checked_sub(1).and_then(|i| devices.get(i))
}

/// Find the first device whose name or address contains `pattern`
pub fn find<'a>(devices: &'a [Peripheral], pattern: &str) -> Option<&'a Peripheral> {
    devices
        .iter()
        .find(|d| d.name.contains(pattern) || d.address.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeTransport, anonymous, named as device};

    #[tokio::test]
    async fn drops_devices_without_a_name() {
        let transport = FakeTransport::new().scan(vec![
            anonymous("00:00:00:00:00:01"),
            device("Bin-1", "00:00:00:00:00:02"),
            device("", "00:00:00:00:00:03"),
            device("Bin-2", "00:00:00:00:00:04"),
        ]);

        let devices = scan(&transport, &ScanConfig::default()).await.unwrap();
        assert_eq!(
            devices.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            ["Bin-1", "Bin-2"]
        );
        assert!(devices.iter().all(|d| !d.name.is_empty()));
        assert_eq!(transport.scans_run.get(), 1);
    }

    #[tokio::test]
    async fn fails_after_three_empty_scans() {
        let transport = FakeTransport::new()
            .scan(vec![])
            .scan(vec![anonymous("00:00:00:00:00:01")])
            .scan(vec![])
            .scan(vec![device("too late", "00:00:00:00:00:02")]);

        let result = scan(&transport, &ScanConfig::default()).await;
        assert!(matches!(result, Err(ScanError::NoDevicesFound { attempts: 3 })));
        assert_eq!(transport.scans_run.get(), 3);
    }

    #[tokio::test]
    async fn stops_at_first_non_empty_scan() {
        let transport = FakeTransport::new()
            .scan(vec![])
            .scan(vec![device("Bin-1", "00:00:00:00:00:01")])
            .scan(vec![device("Bin-2", "00:00:00:00:00:02")]);

        let devices = scan(&transport, &ScanConfig::default()).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Bin-1");
        assert_eq!(transport.scans_run.get(), 2);
    }

    #[tokio::test]
    async fn transport_failure_counts_as_empty_scan() {
        let transport = FakeTransport::new()
            .failing_scan()
            .scan(vec![device("Bin-1", "00:00:00:00:00:01")]);

        let devices = scan(&transport, &ScanConfig::default()).await.unwrap();
        assert_eq!(devices[0].address, "00:00:00:00:00:01");
    }

    #[test]
    fn select_is_one_based() {
        let devices = vec![
            Peripheral { name: "A".to_string(), address: "1".to_string() },
            Peripheral { name: "B".to_string(), address: "2".to_string() },
        ];
        assert_eq!(select(&devices, 0), None);
        assert_eq!(select(&devices, 1).map(|d| d.name.as_str()), Some("A"));
        assert_eq!(select(&devices, 2).map(|d| d.name.as_str()), Some("B"));
        assert_eq!(select(&devices, 3), None);
    }

    #[test]
    fn find_matches_name_or_address() {
        let devices = vec![
            Peripheral { name: "Binsight-01".to_string(), address: "AA:BB".to_string() },
            Peripheral { name: "Speaker".to_string(), address: "CC:DD".to_string() },
        ];
        assert_eq!(find(&devices, "Binsight").map(|d| d.address.as_str()), Some("AA:BB"));
        assert_eq!(find(&devices, "CC:").map(|d| d.name.as_str()), Some("Speaker"));
        assert_eq!(find(&devices, "nope"), None);
    }
}
