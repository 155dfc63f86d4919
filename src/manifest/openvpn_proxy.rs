use super::ServiceContext;
use crate::error::Error;
use crate::model::Location;
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

pub const IMAGE: &str = "jonoh/openvpn-proxy";
const CONTAINER_CONFIG_DIR: &str = "/config/openvpn";

/// Fail unless `dir` exists and is a directory.
pub fn validate_config_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(Error::ConfigDirMissing(dir.to_path_buf()).into());
    }
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()).into());
    }
    Ok(())
}

/// Pick one configuration file from `dir`, uniformly at random among the regular files
/// whose name starts with the location code (any file for [`Location::Any`]).
///
/// Candidates are sorted first, so a seeded `rng` always gives the same pick.
pub fn choose_config_file<R: Rng + ?Sized>(
    dir: &Path,
    location: &Location,
    rng: &mut R,
) -> Result<String> {
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if location.prefix().map_or(true, |p| name.starts_with(p)) {
            candidates.push(name);
        }
    }
    candidates.sort();
    tracing::debug!(location = %location, matches = candidates.len(), "openvpn config candidates");

    candidates.choose(rng).cloned().ok_or_else(|| {
        Error::NoMatchingConfig {
            dir: dir.to_path_buf(),
            location: location.to_string(),
        }
        .into()
    })
}

/// Service block for an openvpn-proxy container using `config_file` from `config_dir`.
pub fn render(
    ctx: &ServiceContext<'_>,
    config_dir: &Path,
    config_file: &str,
    local_network: &str,
) -> String {
    let i = ctx.slot.index();
    let http = ctx.slot.http_port();
    let socks = ctx.slot.socks5_port();
    format!(
        r#"  openvpn_proxy_{i}:
    image: {IMAGE}
    container_name: openvpn_proxy_{service}_{i}
    cap_add:
      - NET_ADMIN
    devices:
      - /dev/net/tun
    volumes:
      - {config_dir}:{CONTAINER_CONFIG_DIR}
    env_file:
      - {env_file}
    environment:
      - OPENVPN_CONFIG_FILE={CONTAINER_CONFIG_DIR}/{config_file}
      - LOCAL_NETWORK={local_network}
      - OPENVPN_PROXY_PORT={http}
    ports:
      - "{http}:{http}" # HTTP proxy
      - "{socks}:{socks}" # SOCKS5 proxy
    restart: unless-stopped
"#,
        service = ctx.vpn_service,
        config_dir = config_dir.display(),
        env_file = ctx.env_file.display(),
    )
}
