use crate::cleanup;
use crate::config::Settings;
use crate::credentials::{self, EnvFileStatus};
use crate::error::is_interrupted;
use crate::model::{Credentials, Method, RunPlan};
use crate::orchestrator::{run_session, SessionOptions};
use crate::process::{self, ProcessRunner, SystemRunner};
use crate::prompt::{Console, Prompter};
use crate::resolve;
use anyhow::Result;
use clap::Parser;
use rand::Rng;
use std::path::PathBuf;

const CLEANUP_QUESTION: &str = "Do you want to delete the generated configuration and environment files and Chrome profile directories? (yes/no): ";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "multivpn",
    version,
    about = "Run several VPN connections side by side, each exposed as a local HTTP/SOCKS5 proxy"
)]
pub struct Cli {
    /// Number of VPN connections to establish (1-10)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub num_connections: Option<u8>,

    /// VPN connection method: 1 for Gluetun, 2 for OpenVPN Proxy
    #[arg(long, value_enum)]
    pub method: Option<Method>,

    /// Path to the credentials (env) file; reused as-is when it exists
    #[arg(long, default_value = ".env-nordvpn")]
    pub env_file: PathBuf,

    /// Server location per connection (e.g. us de fr); "any" for no preference
    #[arg(long, num_args = 0..)]
    pub server_locations: Vec<String>,

    /// VPN username (used only if the env file does not exist)
    #[arg(long)]
    pub username: Option<String>,

    /// VPN password (used only if the env file does not exist)
    #[arg(long)]
    pub password: Option<String>,

    /// URL to open in each browser window
    #[arg(long)]
    pub url: Option<String>,

    /// Path of the generated compose file
    #[arg(long, default_value = "docker-compose.yml")]
    pub compose_file: PathBuf,

    /// Directory of .ovpn files for the OpenVPN Proxy method
    #[arg(long)]
    pub openvpn_config_dir: Option<PathBuf>,

    /// Browser executable to launch
    #[arg(long)]
    pub browser: Option<String>,

    /// Time zone passed to the Gluetun containers
    #[arg(long)]
    pub timezone: Option<String>,

    /// Settings file (JSON); defaults to <config dir>/multivpn/config.json when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use --open-browsers true or --open-browsers false to skip the question
    #[arg(long, action = clap::ArgAction::Set)]
    pub open_browsers: Option<bool>,

    /// Use --cleanup true or --cleanup false to skip the question
    #[arg(long, action = clap::ArgAction::Set)]
    pub cleanup: Option<bool>,

    /// Print proxy endpoints as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose diagnostics on stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Load settings and apply the per-run flag overrides.
pub fn build_settings(args: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(dir) = &args.openvpn_config_dir {
        settings.openvpn_config_dir = dir.clone();
    }
    if let Some(browser) = &args.browser {
        settings.browser = browser.clone();
    }
    if let Some(tz) = &args.timezone {
        settings.timezone = tz.clone();
    }
    Ok(settings)
}

pub async fn run(args: Cli) -> Result<()> {
    let settings = build_settings(&args)?;
    let mut console = Console::spawn();
    let mut rng = rand::thread_rng();
    execute(&args, &settings, &SystemRunner, &mut console, &mut rng).await
}

/// Prerequisites, resolution, credentials, the session and the cleanup question, in order.
async fn execute<R, P, G>(
    args: &Cli,
    settings: &Settings,
    runner: &R,
    prompter: &mut P,
    rng: &mut G,
) -> Result<()>
where
    R: ProcessRunner,
    P: Prompter,
    G: Rng + ?Sized,
{
    process::check_prerequisites(runner, settings)?;
    println!("Docker and Docker Compose are installed.");

    let connections = resolve::connection_count(args.num_connections, prompter).await?;

    let creds = if args.env_file.exists() {
        println!("Using existing environment file: {}", args.env_file.display());
        Credentials::default()
    } else {
        resolve::credentials(args.username.as_deref(), args.password.as_deref(), prompter).await?
    };
    match credentials::create_or_reuse(&args.env_file, &settings.vendor_key_prefix(), &creds)? {
        EnvFileStatus::Created => {
            println!("Generated environment file: {}", args.env_file.display())
        }
        EnvFileStatus::Reused => {
            println!(
                "Environment file '{}' exists. Ignoring provided credentials.",
                args.env_file.display()
            )
        }
    }

    let method = resolve::method(args.method, prompter).await?;
    let locations = resolve::locations(&args.server_locations, connections, prompter).await?;

    let plan = RunPlan {
        connections,
        method,
        locations,
        env_file: args.env_file.clone(),
        compose_file: args.compose_file.clone(),
        url: args
            .url
            .clone()
            .unwrap_or_else(|| crate::browser::DEFAULT_URL.to_string()),
    };
    tracing::debug!(?plan, "resolved run plan");

    let generated_at = crate::manifest::timestamp();
    let opts = SessionOptions {
        open_browsers: args.open_browsers,
        json: args.json,
        generated_at: &generated_at,
    };
    let outcome = run_session(&plan, settings, runner, prompter, rng, &opts).await;

    // Asked whatever the outcome; a Ctrl-C here means "keep the files".
    let wants_cleanup = match resolve::confirm(args.cleanup, CLEANUP_QUESTION, prompter).await {
        Ok(yes) => yes,
        Err(e) if is_interrupted(&e) => false,
        Err(e) => return outcome.and(Err(e)),
    };
    if wants_cleanup {
        let report = cleanup::remove_artifacts(&plan.compose_file, &plan.env_file, &plan.profile_dirs());
        for path in &report.removed {
            println!("Deleted: {}", path.display());
        }
        for (path, why) in &report.failed {
            eprintln!("Error deleting {}: {why}", path.display());
        }
        println!("Cleanup complete.");
    }

    outcome
}
