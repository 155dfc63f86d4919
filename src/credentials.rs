//! The env file handed to every container.
//!
//! An existing file always wins: it is never rewritten, and any credentials supplied for
//! this run are ignored.

use crate::error::Error;
use crate::model::Credentials;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFileStatus {
    Created,
    Reused,
}

pub fn render(vendor_prefix: &str, creds: &Credentials) -> String {
    format!(
        "{vendor_prefix}_USERNAME={user}\n\
         {vendor_prefix}_PASSWORD={pass}\n\
         OPENVPN_USERNAME={user}\n\
         OPENVPN_PASSWORD={pass}\n",
        user = creds.username,
        pass = creds.password,
    )
}

/// Create `path` from `creds` unless it already exists.
pub fn create_or_reuse(
    path: &Path,
    vendor_prefix: &str,
    creds: &Credentials,
) -> Result<EnvFileStatus> {
    if path.exists() {
        tracing::debug!(path = %path.display(), "env file exists, leaving it untouched");
        return Ok(EnvFileStatus::Reused);
    }
    if creds.username.is_empty() || creds.password.is_empty() {
        return Err(Error::MissingCredentials.into());
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("create env file {}", path.display()))?;
    file.write_all(render(vendor_prefix, creds).as_bytes())
        .with_context(|| format!("write env file {}", path.display()))?;
    tracing::info!(path = %path.display(), "env file written");
    Ok(EnvFileStatus::Created)
}
