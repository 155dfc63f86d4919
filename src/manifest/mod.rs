//! Compose manifest generation.
//!
//! One service block per slot, rendered from either the Gluetun template or the
//! openvpn-proxy template, all under a single `services:` section.

mod gluetun;
mod openvpn_proxy;

use crate::config::Settings;
use crate::host;
use crate::model::{Location, Method, RunPlan, Slot};
use crate::process::ProcessRunner;
use anyhow::{Context, Result};
use rand::Rng;
use std::path::Path;

/// Values shared by both templates for one slot.
pub struct ServiceContext<'a> {
    pub slot: Slot,
    pub location: &'a Location,
    pub env_file: &'a Path,
    pub vpn_service: &'a str,
    pub timezone: &'a str,
}

/// Render the full manifest for `plan`. Nothing is written here, so every failure
/// (bad config directory, no matching file, unknown host address) happens before the
/// previous manifest is touched.
pub fn generate<R, G>(
    plan: &RunPlan,
    settings: &Settings,
    runner: &R,
    rng: &mut G,
    generated_at: &str,
) -> Result<String>
where
    R: ProcessRunner,
    G: Rng + ?Sized,
{
    // Only the openvpn-proxy template needs the config directory and the host network.
    let proxy_network = match plan.method {
        Method::Gluetun => None,
        Method::OpenVpnProxy => {
            openvpn_proxy::validate_config_dir(&settings.openvpn_config_dir)?;
            let addr = host::primary_ipv4(runner)?;
            Some(host::network_cidr(addr, host::LOCAL_NETWORK_PREFIX))
        }
    };

    let mut blocks = Vec::with_capacity(usize::from(plan.connections));
    for slot in plan.slots() {
        let ctx = ServiceContext {
            slot,
            location: plan.location(slot),
            env_file: &plan.env_file,
            vpn_service: &settings.vpn_service,
            timezone: &settings.timezone,
        };
        let block = match &proxy_network {
            None => gluetun::render(&ctx),
            Some(network) => {
                let file = openvpn_proxy::choose_config_file(
                    &settings.openvpn_config_dir,
                    ctx.location,
                    rng,
                )?;
                tracing::info!(slot = %slot, file = %file, "selected openvpn config");
                openvpn_proxy::render(&ctx, &settings.openvpn_config_dir, &file, network)
            }
        };
        blocks.push(block);
    }

    Ok(format!(
        "# Generated by multivpn on {generated_at} ({method}, {n} connection(s))\nservices:\n{body}",
        method = plan.method.label(),
        n = plan.connections,
        body = blocks.join("\n"),
    ))
}

/// Write the manifest, replacing whatever was there.
pub fn write(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("write manifest {}", path.display()))?;
    tracing::info!(path = %path.display(), "manifest written");
    Ok(())
}

/// RFC 3339 timestamp for the manifest header.
pub fn timestamp() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}
