//! Host network address lookup.

use crate::error::Error;
use crate::process::{Invocation, IoMode, ProcessRunner};
use anyhow::Result;
use std::net::Ipv4Addr;

/// Prefix length of the LAN that stays reachable around the tunnel.
pub const LOCAL_NETWORK_PREFIX: u8 = 24;

/// First IPv4 address reported by `hostname -I`.
pub fn primary_ipv4<R: ProcessRunner>(runner: &R) -> Result<Ipv4Addr> {
    let inv = Invocation::new("hostname").arg("-I");
    let out = runner
        .run(&inv, IoMode::Capture)
        .map_err(|e| Error::LocalAddress(format!("`{inv}`: {e}")))?;
    if !out.success() {
        return Err(Error::LocalAddress(format!("`{inv}` failed ({})", out.status())).into());
    }
    parse_first_ipv4(&out.stdout)
        .ok_or_else(|| Error::LocalAddress(format!("no IPv4 address in `{}`", out.stdout.trim())).into())
}

fn parse_first_ipv4(s: &str) -> Option<Ipv4Addr> {
    s.split_whitespace().find_map(|tok| tok.parse::<Ipv4Addr>().ok())
}

/// `addr` masked to `prefix` bits, in CIDR notation.
pub fn network_cidr(addr: Ipv4Addr, prefix: u8) -> String {
    let prefix = prefix.min(32);
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    };
    let network = Ipv4Addr::from(u32::from(addr) & mask);
    format!("{network}/{prefix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    #[test]
    fn picks_first_ipv4_token() {
        assert_eq!(
            parse_first_ipv4("fe80::1 192.168.1.37 172.17.0.1 \n"),
            Some(Ipv4Addr::new(192, 168, 1, 37))
        );
        assert_eq!(parse_first_ipv4("fe80::1\n"), None);
        assert_eq!(parse_first_ipv4(""), None);
    }

    #[test]
    fn masks_to_network() {
        let a = Ipv4Addr::new(192, 168, 1, 37);
        assert_eq!(network_cidr(a, 24), "192.168.1.0/24");
        assert_eq!(network_cidr(a, 16), "192.168.0.0/16");
        assert_eq!(network_cidr(a, 0), "0.0.0.0/0");
        assert_eq!(network_cidr(a, 32), "192.168.1.37/32");
    }

    #[test]
    fn queries_hostname() {
        let runner = RecordingRunner::new().stdout("hostname", "10.0.0.5 172.17.0.1\n");
        assert_eq!(primary_ipv4(&runner).unwrap(), Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(runner.calls()[0].to_string(), "hostname -I");
    }

    #[test]
    fn lookup_failures_are_local_address_errors() {
        let runner = RecordingRunner::new().missing("hostname");
        let err = primary_ipv4(&runner).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::LocalAddress(_))));

        let runner = RecordingRunner::new().stdout("hostname", "\n");
        assert!(primary_ipv4(&runner).is_err());
    }
}
