//! Proxy info builder for CLI output.
//!
//! Formats the host-side proxy endpoints of a run, as text lines or as JSON.

use crate::model::{ProxyEndpoint, Slot};
use anyhow::{Context, Result};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn endpoints(connections: u8) -> Vec<ProxyEndpoint> {
    Slot::range(connections).map(ProxyEndpoint::from).collect()
}

/// Build the proxy info block shown once the stack is up.
pub(crate) fn build_proxy_summary(connections: u8) -> TextSummary {
    let mut lines = vec![
        String::new(),
        "--- Proxy Information ---".to_string(),
        "You can use the following addresses as proxies on your host machine:".to_string(),
        "Note: Ensure the VPN-Proxy containers are running.".to_string(),
    ];
    for ep in endpoints(connections) {
        lines.push(format!("VPN Connection {}:", ep.connection));
        lines.push(format!("  HTTP Proxy: {}", ep.http));
        lines.push(format!("  SOCKS5 Proxy: {}", ep.socks5));
    }
    lines.push("-------------------------".to_string());
    TextSummary { lines }
}

pub(crate) fn proxy_summary_json(connections: u8) -> Result<String> {
    serde_json::to_string_pretty(&endpoints(connections)).context("serialize proxy endpoints")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_connections_print_exactly_four_endpoints() {
        let summary = build_proxy_summary(2);
        let endpoints: Vec<&str> = summary
            .lines
            .iter()
            .filter_map(|l| l.split_once(": ").map(|(_, v)| v))
            .filter(|v| v.contains("://"))
            .collect();
        assert_eq!(
            endpoints,
            vec![
                "http://localhost:8889",
                "socks5://localhost:1081",
                "http://localhost:8890",
                "socks5://localhost:1082",
            ]
        );
    }

    #[test]
    fn json_lists_each_connection() {
        let json = proxy_summary_json(1).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v[0]["connection"], 1);
        assert_eq!(v[0]["http"], "http://localhost:8889");
        assert_eq!(v[0]["socks5"], "socks5://localhost:1081");
        assert_eq!(v.as_array().unwrap().len(), 1);
    }
}
