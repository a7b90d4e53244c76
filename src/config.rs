//! Configuration management

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Agent server and task-store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind address (default: 127.0.0.1)
    pub bind_addr: IpAddr,

    /// Port number (default: 10003)
    pub port: u16,

    /// URL advertised in the agent descriptor
    pub public_url: Option<String>,

    /// Seconds a task record is retained
    pub task_ttl_secs: u64,

    /// Maximum retained task records
    pub task_capacity: u64,

    /// Broadcast buffer for task events
    pub event_buffer: usize,

    /// Enable request logging
    pub log_requests: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 10003,
            public_url: None,
            task_ttl_secs: 3600,
            task_capacity: 10_000,
            event_buffer: 64,
            log_requests: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("A2A_HOST") {
            match parse_host(&host) {
                Some(addr) => config.bind_addr = addr,
                None => tracing::warn!("Ignoring unparsable A2A_HOST '{}'", host),
            }
        }

        if let Some(port) = parse_var("A2A_PORT") {
            config.port = port;
        }

        config.public_url = std::env::var("PUBLIC_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        if let Some(ttl) = parse_var("SHADOWBLADE_TASK_TTL") {
            config.task_ttl_secs = ttl;
        }

        if let Some(capacity) = parse_var("SHADOWBLADE_TASK_CAPACITY") {
            config.task_capacity = capacity;
        }

        if let Some(buffer) = parse_var("SHADOWBLADE_EVENT_BUFFER") {
            config.event_buffer = buffer;
        }

        if let Ok(val) = std::env::var("SHADOWBLADE_LOG_REQUESTS") {
            config.log_requests = val == "true" || val == "1";
        }

        config
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// URL advertised to discovery requests
    pub fn agent_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.clone(),
            None => format!("http://{}:{}/", self.bind_addr, self.port),
        }
    }

    /// Check if bound to localhost only
    pub fn is_localhost(&self) -> bool {
        self.bind_addr.is_loopback()
    }
}

fn parse_host(host: &str) -> Option<IpAddr> {
    if host.eq_ignore_ascii_case("localhost") {
        return Some(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    host.parse().ok()
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
