//! Error types surfaced to the user.
//!
//! Functions return `anyhow::Result`; the variants here are raised with `.into()` so the
//! CLI (and tests) can tell the failure categories apart with `downcast_ref`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "{tool} not found. Please ensure Docker and Docker Compose are installed.\n\
         - Docker: https://docs.docker.com/engine/install/\n\
         - Docker Compose: https://docs.docker.com/compose/install/"
    )]
    ToolNotFound { tool: String },

    #[error("`{command}` failed ({status}). Please check your Docker installation.")]
    ToolFailed { command: String, status: String },

    #[error("OpenVPN configuration directory '{}' does not exist", .0.display())]
    ConfigDirMissing(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("no OpenVPN configuration file in '{}' matches location '{location}'", .dir.display())]
    NoMatchingConfig { dir: PathBuf, location: String },

    #[error("username and password must be provided to create a new credentials file")]
    MissingCredentials,

    #[error("failed to start VPN connections with {manifest} ({status})")]
    StackStartFailed { manifest: String, status: String },

    #[error("invalid number of connections '{0}' (expected 1-10)")]
    InvalidConnectionCount(String),

    #[error("invalid method '{0}' (expected 1 or 2)")]
    InvalidMethod(String),

    #[error("could not determine the local network address: {0}")]
    LocalAddress(String),

    #[error("interrupted")]
    Interrupted,
}

/// True when `err` (or anything it wraps) is an [`Error::Interrupted`].
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|e| matches!(e.downcast_ref::<Error>(), Some(Error::Interrupted)))
}
