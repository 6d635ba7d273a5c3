//! Runtime configuration, read from the environment.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "payrolls";
const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000));

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory of payroll JSON files (`PAYROLL_DATA_DIR`).
    pub data_dir: PathBuf,
    /// Address the HTTP server binds to (`PAYROLL_BIND_ADDR`).
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads `PAYROLL_DATA_DIR` and `PAYROLL_BIND_ADDR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.  Unset or
    /// unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("PAYROLL_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let bind_addr = lookup("PAYROLL_BIND_ADDR")
            .and_then(|addr| addr.parse().ok())
            .unwrap_or(DEFAULT_BIND_ADDR);
        Config {
            data_dir,
            bind_addr,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            bind_addr: DEFAULT_BIND_ADDR,
        }
    }
}
