//! External process execution.
//!
//! Everything the tool shells out to (docker, the compose CLI, `hostname`, the browser)
//! goes through [`ProcessRunner`] so the workflow can be exercised without those tools.

use crate::config::Settings;
use crate::error::Error;
use anyhow::Result;
use std::fmt;
use std::io;
use std::process::{Command, Stdio};

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoMode {
    /// Collect stdout/stderr for the caller.
    Capture,
    /// Let the child write straight to the terminal.
    Inherit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Short human-readable exit status.
    pub fn status(&self) -> String {
        match self.code {
            Some(c) => format!("exit code {c}"),
            None => "terminated by signal".to_string(),
        }
    }
}

pub trait ProcessRunner {
    /// Run to completion. Spawn failures (e.g. `NotFound`) come back as `Err`.
    fn run(&self, invocation: &Invocation, stdio: IoMode) -> io::Result<CommandOutput>;

    /// Start a process that outlives the call; it is never waited on.
    fn spawn_detached(&self, invocation: &Invocation) -> io::Result<()>;
}

/// Runs real processes with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, stdio: IoMode) -> io::Result<CommandOutput> {
        tracing::debug!(command = %invocation, "running");
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());
        match stdio {
            IoMode::Capture => {
                let out = cmd.output()?;
                Ok(CommandOutput {
                    code: out.status.code(),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                })
            }
            IoMode::Inherit => {
                let status = cmd.status()?;
                Ok(CommandOutput {
                    code: status.code(),
                    ..Default::default()
                })
            }
        }
    }

    fn spawn_detached(&self, invocation: &Invocation) -> io::Result<()> {
        tracing::debug!(command = %invocation, "spawning detached");
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // Own process group, so a Ctrl-C aimed at us does not close the windows.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let child = cmd.spawn()?;
        tracing::debug!(pid = child.id(), "detached");
        Ok(())
    }
}

/// Run `invocation` and require a zero exit, mapping failures to the prerequisite errors.
fn require_tool<R: ProcessRunner>(runner: &R, invocation: &Invocation) -> Result<String> {
    match runner.run(invocation, IoMode::Capture) {
        Ok(out) if out.success() => Ok(out.stdout.trim().to_string()),
        Ok(out) => {
            let stderr = out.stderr.trim();
            let status = if stderr.is_empty() {
                out.status()
            } else {
                format!("{}: {stderr}", out.status())
            };
            Err(Error::ToolFailed {
                command: invocation.to_string(),
                status,
            }
            .into())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::ToolNotFound {
            tool: invocation.program.clone(),
        }
        .into()),
        Err(e) => Err(anyhow::Error::new(e).context(format!("run `{invocation}`"))),
    }
}

/// Verify the container CLI and the compose CLI are installed and working.
pub fn check_prerequisites<R: ProcessRunner>(runner: &R, settings: &Settings) -> Result<()> {
    let docker = require_tool(runner, &Invocation::new(&settings.docker_command).arg("--version"))?;
    let compose = require_tool(runner, &settings.compose().arg("--version"))?;
    tracing::info!(%docker, %compose, "prerequisites found");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    #[test]
    fn invocation_display_joins_arguments() {
        let inv = Invocation::new("docker-compose").args(["-f", "x.yml", "up", "-d"]);
        assert_eq!(inv.to_string(), "docker-compose -f x.yml up -d");
    }

    #[test]
    fn prerequisites_pass_when_both_tools_answer() {
        let runner = RecordingRunner::new();
        check_prerequisites(&runner, &Settings::default()).unwrap();
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].to_string(), "docker --version");
        assert_eq!(calls[1].to_string(), "docker-compose --version");
    }

    #[test]
    fn missing_tool_is_distinguished_from_failing_tool() {
        let runner = RecordingRunner::new().missing("docker-compose");
        let err = check_prerequisites(&runner, &Settings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ToolNotFound { tool }) if tool == "docker-compose"
        ));

        let runner = RecordingRunner::new().exit_code("docker", 1);
        let err = check_prerequisites(&runner, &Settings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ToolFailed { .. })
        ));
        // The compose CLI is not queried once docker failed.
        assert_eq!(runner.calls().len(), 1);
    }
}
