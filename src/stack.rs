//! Bringing the compose stack up and down.

use crate::config::Settings;
use crate::error::Error;
use crate::process::{Invocation, IoMode, ProcessRunner};
use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    ManifestMissing,
    Failed(String),
}

fn compose_with_manifest(settings: &Settings, manifest: &Path) -> Invocation {
    settings
        .compose()
        .arg("-f")
        .arg(manifest.display().to_string())
}

/// `compose -f <manifest> up -d`. Any failure is fatal for the run.
pub fn start<R: ProcessRunner>(runner: &R, settings: &Settings, manifest: &Path) -> Result<()> {
    let inv = compose_with_manifest(settings, manifest).args(["up", "-d"]);
    match runner.run(&inv, IoMode::Inherit) {
        Ok(out) if out.success() => {
            tracing::info!(manifest = %manifest.display(), "stack started");
            Ok(())
        }
        Ok(out) => Err(Error::StackStartFailed {
            manifest: manifest.display().to_string(),
            status: out.status(),
        }
        .into()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::ToolNotFound {
            tool: inv.program.clone(),
        }
        .into()),
        Err(e) => Err(Error::StackStartFailed {
            manifest: manifest.display().to_string(),
            status: e.to_string(),
        }
        .into()),
    }
}

/// `compose -f <manifest> down`. Never fails; problems are logged and reported.
pub fn stop<R: ProcessRunner>(runner: &R, settings: &Settings, manifest: &Path) -> StopOutcome {
    if !manifest.exists() {
        tracing::warn!(manifest = %manifest.display(), "configuration file not found; nothing to stop");
        return StopOutcome::ManifestMissing;
    }
    let inv = compose_with_manifest(settings, manifest).arg("down");
    match runner.run(&inv, IoMode::Inherit) {
        Ok(out) if out.success() => StopOutcome::Stopped,
        Ok(out) => {
            tracing::warn!(command = %inv, status = %out.status(), "error stopping VPN connections");
            StopOutcome::Failed(out.status())
        }
        Err(e) => {
            tracing::warn!(command = %inv, "error stopping VPN connections: {e}");
            StopOutcome::Failed(e.to_string())
        }
    }
}

/// Owns the running stack: whatever way the owning scope exits, the stack is brought down
/// exactly once, either through [`StackGuard::stop`] or on drop.
pub struct StackGuard<'a, R: ProcessRunner> {
    runner: &'a R,
    settings: &'a Settings,
    manifest: PathBuf,
    armed: bool,
}

impl<'a, R: ProcessRunner> StackGuard<'a, R> {
    /// Create before the manifest is written, so a failure at any later step still
    /// attempts the teardown.
    pub fn new(runner: &'a R, settings: &'a Settings, manifest: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            settings,
            manifest: manifest.into(),
            armed: true,
        }
    }

    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    pub fn start(&self) -> Result<()> {
        start(self.runner, self.settings, &self.manifest)
    }

    pub fn stop(mut self) -> StopOutcome {
        self.teardown()
    }

    fn teardown(&mut self) -> StopOutcome {
        self.armed = false;
        println!("\nStopping all VPN connections...");
        let outcome = stop(self.runner, self.settings, &self.manifest);
        match &outcome {
            StopOutcome::Stopped => println!("All VPN connections stopped."),
            StopOutcome::ManifestMissing => {
                println!("Configuration file not found: {}", self.manifest.display())
            }
            StopOutcome::Failed(why) => println!(
                "Error stopping VPN connections with {}: {why}",
                self.manifest.display()
            ),
        }
        outcome
    }
}

impl<R: ProcessRunner> Drop for StackGuard<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            self.teardown();
        }
    }
}
