//! Interactive text menu driving one provisioning session

use std::fmt::Display;
use std::io::{self, Write as _};
use std::str::FromStr;

use binsight_ble_controller::discovery::select;
use binsight_ble_controller::{Config, Peripheral, Session, Transport};
use binsight_proto::{ApiKey, WifiCredentials};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented prompt reader. `None` means input ended.
///
/// Text answers are taken as typed (minus the line ending) since SSIDs and
/// passwords may carry spaces; numeric answers are trimmed.
pub struct Input<R> {
    lines: Lines<R>,
}

impl Input<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Input<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    pub async fn line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }

    /// Prompt until the answer parses as `N`
    pub async fn number<N>(&mut self, prompt: &str) -> io::Result<Option<N>>
    where
        N: FromStr,
        N::Err: Display,
    {
        loop {
            let Some(line) = self.line(prompt).await? else {
                return Ok(None);
            };
            match line.trim().parse() {
                Ok(n) => return Ok(Some(n)),
                Err(e) => println!("An error occurred when parsing your input: {e}"),
            }
        }
    }

    /// Prompt until the answer is a valid 1-based index into `devices`
    pub async fn device<'d>(
        &mut self,
        devices: &'d [Peripheral],
    ) -> io::Result<Option<&'d Peripheral>> {
        loop {
            let Some(index) = self.number("Select the device to connect to: ").await? else {
                return Ok(None);
            };
            match select(devices, index) {
                Some(device) => return Ok(Some(device)),
                None => println!("Invalid selection"),
            }
        }
    }
}

/// Run the device menu until the user disconnects or input ends. The
/// session is disconnected even when reading input fails.
pub async fn run<T: Transport, R: AsyncBufRead + Unpin>(
    session: Session<'_, T>,
    input: &mut Input<R>,
) -> Result<(), Box<dyn std::error::Error>> {
    let menu = device_menu(&session, input).await;
    session.disconnect().await?;
    Ok(menu?)
}

async fn device_menu<T: Transport, R: AsyncBufRead + Unpin>(
    session: &Session<'_, T>,
    input: &mut Input<R>,
) -> io::Result<()> {
    loop {
        println!("1: Wi-Fi Options");
        println!("2: API Key Options");
        println!("3: Debug Options");
        println!("4: Disconnect");

        let Some(choice) = input.number::<u32>("Select an action: ").await? else {
            return Ok(());
        };
        let proceed = match choice {
            1 => wifi_options(session, input).await?,
            2 => api_options(session, input).await?,
            3 => {
                println!("Not implemented");
                true
            }
            4 => return Ok(()),
            _ => {
                println!("Invalid selection");
                true
            }
        };
        if !proceed {
            return Ok(());
        }
    }
}

/// Returns `false` when input ended
async fn wifi_options<T: Transport, R: AsyncBufRead + Unpin>(
    session: &Session<'_, T>,
    input: &mut Input<R>,
) -> io::Result<bool> {
    println!();
    println!("1: Connect device to Wi-Fi Network");
    println!("2: Test Wi-Fi Connection");
    println!("3: Remove Wi-Fi Network from device");

    let Some(choice) = input.number::<u32>("Select an action: ").await? else {
        return Ok(false);
    };
    match choice {
        1 => {
            let Some(ssid) = input.line("Enter the SSID to connect to: ").await? else {
                return Ok(false);
            };
            let Some(password) = input.line("Enter WiFi password: ").await? else {
                return Ok(false);
            };
            report_write(session.set_wifi(WifiCredentials { ssid, password }).await);
        }
        2 => crate::print_status(session.connection_status().await),
        3 => {
            let Some(ssid) = input.line("Enter the SSID to disconnect from: ").await? else {
                return Ok(false);
            };
            report_write(session.unset_wifi(ssid).await);
        }
        _ => println!("Invalid selection"),
    }
    Ok(true)
}

async fn api_options<T: Transport, R: AsyncBufRead + Unpin>(
    session: &Session<'_, T>,
    input: &mut Input<R>,
) -> io::Result<bool> {
    println!();
    println!("1: Transmit API Keys");
    println!("2: Test API Keys");

    let Some(choice) = input.number::<u32>("Select an action: ").await? else {
        return Ok(false);
    };
    match choice {
        1 => {
            let Some(api_key) = input.line("API Key: ").await? else {
                return Ok(false);
            };
            let Some(endpoint) = input.line("Endpoint: ").await? else {
                return Ok(false);
            };
            let Some(port) = input.number("Port: ").await? else {
                return Ok(false);
            };
            report_write(
                session
                    .set_api_key(ApiKey {
                        api_key,
                        endpoint,
                        port,
                    })
                    .await,
            );
        }
        2 => crate::print_api_test(session.test_api_key().await),
        _ => println!("Invalid selection"),
    }
    Ok(true)
}

fn report_write(result: Result<(), binsight_ble_controller::SessionError>) {
    match result {
        Ok(()) => println!("Command sent!"),
        Err(e) => log::error!("failed to send command: {e}"),
    }
}

/// Scan, let the user pick a device and run the menu on it
pub async fn interactive<T: Transport>(
    transport: &T,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let devices = crate::discover(transport, config).await?;
    let mut input = Input::stdin();

    let Some(device) = input.device(&devices).await? else {
        return Ok(());
    };
    let Some(session) = crate::open(transport, device, config).await else {
        return Ok(());
    };
    run(session, &mut input).await
}
