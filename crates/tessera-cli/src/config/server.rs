//! Listener address and request lifecycle settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Accepted range for both timeouts, in seconds.
const TIMEOUT_RANGE: RangeInclusive<u64> = 1..=300;

/// Lowest port that can be bound without elevated privileges.
const MIN_UNPRIVILEGED_PORT: u16 = 1024;

/// HTTP listener configuration.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Address to bind; `0.0.0.0` listens on every interface.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    #[serde(default = "localhost")]
    pub host: IpAddr,

    /// Port to listen on (1024-65535).
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds a single request may take before it is answered with 500.
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    /// Seconds to wait for in-flight requests once shutdown begins.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

fn localhost() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn check_timeout(name: &str, secs: u64) -> Result<()> {
    if !TIMEOUT_RANGE.contains(&secs) {
        bail!(
            "{name} of {secs}s is out of range, expected {}-{}s",
            TIMEOUT_RANGE.start(),
            TIMEOUT_RANGE.end()
        );
    }

    Ok(())
}

impl ServerConfig {
    /// Rejects privileged ports and out-of-range timeouts.
    pub fn validate(&self) -> Result<()> {
        if self.port < MIN_UNPRIVILEGED_PORT {
            bail!(
                "port {} requires elevated privileges, use {MIN_UNPRIVILEGED_PORT}-65535",
                self.port
            );
        }

        check_timeout("request timeout", self.request_timeout)?;
        check_timeout("shutdown timeout", self.shutdown_timeout)?;
        Ok(())
    }

    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Returns whether the listener accepts connections on every interface.
    #[must_use]
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            request_timeout_secs = self.request_timeout,
            shutdown_timeout_secs = self.shutdown_timeout,
            "server configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: localhost(),
            port: 3000,
            request_timeout: 30,
            shutdown_timeout: 30,
        }
    }
}
