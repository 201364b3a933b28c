//! BLE provisioning tool for Binsight devices
//!
//! Scans for devices, connects to one and sends Wi-Fi credentials or an API
//! key. Without a subcommand an interactive menu is shown.

mod menu;

use std::time::Duration;

use binsight_ble_controller::discovery::{find, select};
use binsight_ble_controller::{
    BtleplugTransport, Config, ConnectConfig, Connection, Peripheral, ReadConfig, ReadOutcome,
    ScanConfig, ScanError, Session, Transport, connect, scan,
};
use binsight_proto::{ApiKey, ApiKeyStatus, WifiCredentials};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "binsight-ble")]
#[command(about = "BLE provisioning tool for Binsight devices", version)]
struct Cli {
    #[command(flatten)]
    options: Options,
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Options {
    /// Length of each discovery window in seconds
    #[arg(long, default_value_t = 20, global = true)]
    scan_window: u64,
    /// Number of discovery windows before giving up
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..), global = true)]
    scan_attempts: u32,
    /// Number of connection attempts before giving up
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..), global = true)]
    connect_attempts: u32,
    /// Number of attempts for each characteristic read
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..), global = true)]
    read_attempts: u32,
}

impl Options {
    fn config(&self) -> Config {
        Config {
            scan: ScanConfig {
                window: Duration::from_secs(self.scan_window),
                attempts: self.scan_attempts,
            },
            connect: ConnectConfig {
                attempts: self.connect_attempts,
            },
            read: ReadConfig {
                attempts: self.read_attempts,
            },
        }
    }
}

/// Which discovered device to use; the first one if neither is given
#[derive(Args)]
struct Target {
    /// Device name or address to connect to
    #[arg(short, long)]
    device: Option<String>,
    /// 1-based position in the scan list
    #[arg(short, long, conflicts_with = "device")]
    index: Option<usize>,
}

impl Target {
    fn pick<'d>(&self, devices: &'d [Peripheral]) -> Option<&'d Peripheral> {
        match (&self.device, self.index) {
            (Some(pattern), _) => find(devices, pattern),
            (None, Some(index)) => select(devices, index),
            (None, None) => devices.first(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu,
    /// Scan for named devices
    Scan,
    /// Send API credentials to a device
    SetApiKey {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        endpoint: String,
        #[arg(long)]
        port: u16,
    },
    /// Ask a device whether it can reach the API
    TestApiKey {
        #[command(flatten)]
        target: Target,
    },
    /// Send Wi-Fi credentials to a device
    SetWifi {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        ssid: String,
        #[arg(long)]
        password: String,
    },
    /// Make a device forget a Wi-Fi network
    UnsetWifi {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        ssid: String,
    },
    /// Read a device's Wi-Fi connection status
    Status {
        #[command(flatten)]
        target: Target,
    },
}

impl Commands {
    fn target(&self) -> Option<&Target> {
        match self {
            Commands::Menu | Commands::Scan => None,
            Commands::SetApiKey { target, .. }
            | Commands::TestApiKey { target }
            | Commands::SetWifi { target, .. }
            | Commands::UnsetWifi { target, .. }
            | Commands::Status { target } => Some(target),
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(format!(
        "binsight_ble={level},binsight_ble_controller={level}"
    )))
    .format_timestamp(None)
    .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    println!("Binsight Bluetooth Configuration Utility");
    println!("Version {}\n", env!("CARGO_PKG_VERSION"));

    let config = cli.options.config();
    let transport = BtleplugTransport::new().await?;

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => menu::interactive(&transport, &config).await,
        Commands::Scan => discover(&transport, &config)
            .await
            .map(|_| ())
            .map_err(Into::into),
        command => run_command(&transport, &config, command).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<ScanError>() {
            Some(ScanError::NoDevicesFound { attempts }) => {
                println!("No devices found after {attempts} retries")
            }
            None => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Scan and print the numbered list of named devices
pub(crate) async fn discover<T: Transport>(
    transport: &T,
    config: &Config,
) -> Result<Vec<Peripheral>, ScanError> {
    println!(
        "Scanning for devices this may take up to {} seconds...",
        config.scan.window.as_secs()
    );
    let devices = scan(transport, &config.scan).await?;

    println!("Discovered Devices:");
    for (i, device) in devices.iter().enumerate() {
        println!("\t {}: {device}", i + 1);
    }
    println!();
    Ok(devices)
}

/// Connect, printing the outcome; `None` when every attempt failed
pub(crate) async fn open<'t, T: Transport>(
    transport: &'t T,
    device: &Peripheral,
    config: &Config,
) -> Option<Session<'t, T>> {
    match connect(transport, device, config).await {
        Connection::Connected(session) => {
            println!("Connected to {}!", device.name);
            Some(session)
        }
        Connection::Failed { .. } => {
            println!("Unable to connect to device.");
            None
        }
    }
}

pub(crate) fn print_status(outcome: ReadOutcome<String>) {
    // exhausted reads were already logged per attempt
    if let Some(status) = outcome.value() {
        println!("{status}");
    }
}

pub(crate) fn print_api_test(outcome: ReadOutcome<ApiKeyStatus>) {
    match outcome.value() {
        Some(ApiKeyStatus::Reachable) => println!("Successfully contacted API!"),
        Some(ApiKeyStatus::Unreachable) => println!(
            "Failed to contact API please resend the credentials and ensure you are connected to Wi-Fi."
        ),
        None => {}
    }
}

async fn run_command<T: Transport>(
    transport: &T,
    config: &Config,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    let devices = discover(transport, config).await?;
    let device = command
        .target()
        .and_then(|target| target.pick(&devices))
        .ok_or("No matching device found")?;
    let Some(session) = open(transport, device, config).await else {
        std::process::exit(1);
    };

    let result = match command {
        Commands::SetApiKey {
            api_key,
            endpoint,
            port,
            ..
        } => session
            .set_api_key(ApiKey {
                api_key,
                endpoint,
                port,
            })
            .await,
        Commands::SetWifi { ssid, password, .. } => {
            session.set_wifi(WifiCredentials { ssid, password }).await
        }
        Commands::UnsetWifi { ssid, .. } => session.unset_wifi(ssid).await,
        Commands::TestApiKey { .. } => {
            print_api_test(session.test_api_key().await);
            return Ok(session.disconnect().await?);
        }
        Commands::Status { .. } => {
            print_status(session.connection_status().await);
            return Ok(session.disconnect().await?);
        }
        Commands::Menu | Commands::Scan => unreachable!("handled in main"),
    };

    // release the link before reporting a failed write
    session.disconnect().await?;
    result?;
    println!("Command sent!");
    Ok(())
}
