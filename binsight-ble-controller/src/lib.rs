//! Binsight BLE Controller
//!
//! BLE client for provisioning Binsight devices with Wi-Fi credentials and an
//! API key.
//!
//! # Example
//!
//! ```ignore
//! use binsight_ble_controller::{BtleplugTransport, Config, connect, scan};
//! use binsight_proto::WifiCredentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let transport = BtleplugTransport::new().await?;
//!
//!     // Scan for devices
//!     let devices = scan(&transport, &config.scan).await?;
//!
//!     // Connect to the first one
//!     let Some(session) = connect(&transport, &devices[0], &config).await.into_session() else {
//!         return Ok(());
//!     };
//!
//!     // Provision Wi-Fi and check the result
//!     session
//!         .set_wifi(WifiCredentials { ssid: "MySSID".into(), password: "MyPassword".into() })
//!         .await?;
//!     if let Some(status) = session.connection_status().await.value() {
//!         println!("{status}");
//!     }
//!
//!     session.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod ble;
pub mod config;
pub mod connection;
pub mod discovery;
pub mod session;
pub mod transport;

#[cfg(test)]
mod fake;

pub use ble::BtleplugTransport;
pub use config::{Config, ConnectConfig, ReadConfig, ScanConfig};
pub use connection::{Connection, connect};
pub use discovery::{ScanError, scan};
pub use session::{ReadOutcome, Session, SessionError};
pub use transport::{Advertisement, Peripheral, Transport, TransportError};
