//! Attempt budgets and timing for the provisioning pipeline

use std::time::Duration;

/// Discovery budget: `attempts` scans of `window` each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub window: Duration,
    pub attempts: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(20),
            attempts: 3,
        }
    }
}

/// Connection budget; failed attempts are retried immediately
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectConfig {
    pub attempts: u32,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self { attempts: 3 }
    }
}

/// Read budget for queries. Writes are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadConfig {
    pub attempts: u32,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self { attempts: 2 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub scan: ScanConfig,
    pub connect: ConnectConfig,
    pub read: ReadConfig,
}

#[cfg(test)]
mod tests {
    #[test]
    fn defaults() {
        let config = super::Config::default();
        assert_eq!(config.scan.window, std::time::Duration::from_secs(20));
        assert_eq!(config.scan.attempts, 3);
        assert_eq!(config.connect.attempts, 3);
        assert_eq!(config.read.attempts, 2);
    }
}
