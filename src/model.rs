use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const MAX_CONNECTIONS: u8 = 10;
pub const HTTP_PROXY_BASE_PORT: u16 = 8888;
pub const SOCKS5_PROXY_BASE_PORT: u16 = 1080;

/// One VPN connection, indexed from 1. All per-connection names and ports derive from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot(u8);

impl Slot {
    pub fn new(index: u8) -> Option<Self> {
        (1..=MAX_CONNECTIONS).contains(&index).then_some(Self(index))
    }

    /// Slots `1..=count`, capped at [`MAX_CONNECTIONS`].
    pub fn range(count: u8) -> impl Iterator<Item = Slot> {
        (1..=count).map_while(Slot::new)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn http_port(self) -> u16 {
        HTTP_PROXY_BASE_PORT + u16::from(self.0)
    }

    pub fn socks5_port(self) -> u16 {
        SOCKS5_PROXY_BASE_PORT + u16::from(self.0)
    }

    /// Browser profile directory, relative to the working directory.
    pub fn profile_dir(self) -> PathBuf {
        PathBuf::from(format!("chrome_profile_{}", self.0))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Method {
    /// Gluetun manages the tunnel and serves both proxies
    #[value(name = "1", alias = "gluetun")]
    Gluetun,
    /// openvpn-proxy wraps a local .ovpn configuration file
    #[value(name = "2", alias = "openvpn-proxy")]
    OpenVpnProxy,
}

impl Method {
    /// Parse an interactive answer: `1`/`2` or the backend name.
    pub fn parse_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "1" | "gluetun" => Some(Method::Gluetun),
            "2" | "openvpn-proxy" | "openvpn_proxy" => Some(Method::OpenVpnProxy),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Method::Gluetun => "Gluetun",
            Method::OpenVpnProxy => "OpenVPN Proxy",
        }
    }
}

/// Server location for a slot. `Any` means no geographic pinning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Location {
    #[default]
    Any,
    Code(String),
}

impl Location {
    /// Blank input and `any` (any case) both mean no pinning.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            Location::Any
        } else {
            Location::Code(trimmed.to_string())
        }
    }

    /// Prefix that configuration file names must start with, if any.
    pub fn prefix(&self) -> Option<&str> {
        match self {
            Location::Any => None,
            Location::Code(code) => Some(code.as_str()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Any => f.write_str("any"),
            Location::Code(code) => f.write_str(code),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Everything a session needs once flags and prompts have been resolved.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub connections: u8,
    pub method: Method,
    /// Exactly one entry per slot.
    pub locations: Vec<Location>,
    pub env_file: PathBuf,
    pub compose_file: PathBuf,
    pub url: String,
}

impl RunPlan {
    pub fn slots(&self) -> impl Iterator<Item = Slot> {
        Slot::range(self.connections)
    }

    pub fn location(&self, slot: Slot) -> &Location {
        static ANY: Location = Location::Any;
        self.locations
            .get(usize::from(slot.index()) - 1)
            .unwrap_or(&ANY)
    }

    pub fn profile_dirs(&self) -> Vec<PathBuf> {
        self.slots().map(Slot::profile_dir).collect()
    }
}

/// Host-side proxy addresses for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub connection: u8,
    pub http: String,
    pub socks5: String,
}

impl From<Slot> for ProxyEndpoint {
    fn from(slot: Slot) -> Self {
        Self {
            connection: slot.index(),
            http: format!("http://localhost:{}", slot.http_port()),
            socks5: format!("socks5://localhost:{}", slot.socks5_port()),
        }
    }
}
