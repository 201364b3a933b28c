//! Connecting to a peripheral with a bounded number of attempts

use binsight_proto::ServiceGroup;
use log::{info, warn};

use crate::config::Config;
use crate::session::Session;
use crate::transport::{Peripheral, Transport, TransportError};

/// Result of [`connect`]. There is no session to misuse when connecting failed.
pub enum Connection<'t, T: Transport> {
    Connected(Session<'t, T>),
    Failed {
        attempts: u32,
        last_error: Option<TransportError>,
    },
}

impl<'t, T: Transport> Connection<'t, T> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Connection::Connected(_))
    }

    pub fn into_session(self) -> Option<Session<'t, T>> {
        match self {
            Connection::Connected(session) => Some(session),
            Connection::Failed { .. } => None,
        }
    }
}

/// Connect to `peripheral`, retrying immediately on failure.
///
/// Once the link is up both service groups are looked up exactly once; a
/// missing group leaves the session without that handle rather than failing
/// the connection.
pub async fn connect<'t, T: Transport>(
    transport: &'t T,
    peripheral: &Peripheral,
    config: &Config,
) -> Connection<'t, T> {
    let attempts = config.connect.attempts;
    let mut last_error = None;

    for attempt in 1..=attempts {
        info!("{attempt}/{attempts} - attempting to connect to {peripheral}");

        let link = match transport.connect(&peripheral.address).await {
            Ok(link) => link,
            Err(e) => {
                warn!("connection to {peripheral} failed: {e}, retrying");
                last_error = Some(e);
                continue;
            }
        };

        let api = resolve(transport, &link, ServiceGroup::Api).await;
        let wifi = resolve(transport, &link, ServiceGroup::Wifi).await;

        info!("connected to {}", peripheral.name);
        return Connection::Connected(Session::new(
            transport,
            peripheral.clone(),
            link,
            api,
            wifi,
            config.read,
        ));
    }

    warn!("giving up on {peripheral} after {attempts} attempts");
    Connection::Failed {
        attempts,
        last_error,
    }
}

async fn resolve<T: Transport>(
    transport: &T,
    link: &T::Link,
    group: ServiceGroup,
) -> Option<T::Service> {
    let service = transport.service(link, group.uuid()).await;
    if service.is_none() {
        warn!("{group} not exposed by peripheral");
    }
    service
}
