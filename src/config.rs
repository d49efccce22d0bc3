//! Relay configuration
//!
//! ## Environment
//! ```bash
//! HOST=0.0.0.0                 # bind address
//! PORT=8080                    # listen port
//! AUTH_TOKEN=secret            # optional; enables the x-auth / ?token check on POST /cmd
//! HEARTBEAT_INTERVAL_SECS=30   # probe period
//! SEND_TIMEOUT_MS=2000         # bound on one delivery attempt
//! SEND_QUEUE_CAPACITY=64       # outbound frames buffered per connection
//! STATIC_DIR=web               # client web root
//! REGISTRATION_POLICY=last-wins
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::registry::DEFAULT_QUEUE_CAPACITY;
use crate::relay::{DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_SEND_TIMEOUT};
use crate::types::{RegistrationPolicy, RelayError, RelayResult};

/// Runtime settings for the relay server
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret for the one-shot entry; `None` disables the check
    pub auth_token: Option<String>,
    pub heartbeat_interval: Duration,
    pub send_timeout: Duration,
    pub send_queue_capacity: usize,
    pub static_dir: PathBuf,
    pub registration_policy: RegistrationPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            auth_token: None,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            send_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            static_dir: PathBuf::from("web"),
            registration_policy: RegistrationPolicy::LastWins,
        }
    }
}

impl RelayConfig {
    /// Build from process environment variables
    pub fn from_env() -> RelayResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse_var("PORT", &port)?;
        }

        // An empty token means "no auth", same as unset
        config.auth_token = lookup("AUTH_TOKEN").filter(|t| !t.is_empty());

        if let Some(secs) = lookup("HEARTBEAT_INTERVAL_SECS") {
            let secs: u64 = parse_var("HEARTBEAT_INTERVAL_SECS", &secs)?;
            if secs == 0 {
                return Err(RelayError::Config(
                    "HEARTBEAT_INTERVAL_SECS must be greater than zero".to_string(),
                ));
            }
            config.heartbeat_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = lookup("SEND_TIMEOUT_MS") {
            config.send_timeout = Duration::from_millis(parse_var("SEND_TIMEOUT_MS", &ms)?);
        }
        if let Some(capacity) = lookup("SEND_QUEUE_CAPACITY") {
            config.send_queue_capacity = parse_var("SEND_QUEUE_CAPACITY", &capacity)?;
        }
        if let Some(dir) = lookup("STATIC_DIR").filter(|d| !d.trim().is_empty()) {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(policy) = lookup("REGISTRATION_POLICY") {
            config.registration_policy = policy.parse()?;
        }

        Ok(config)
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> RelayResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| RelayError::Config(format!("invalid bind address: {}", e)))
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth_token.is_some()
    }
}

fn parse_var<T>(key: &str, raw: &str) -> RelayResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| RelayError::Config(format!("{} = '{}': {}", key, raw, e)))
}
