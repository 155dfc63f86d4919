//! Session lifecycle controller.
//!
//! Owns manifest → start → display → browsers → wait → stop. The stack guard is taken
//! before anything touches the compose CLI, so every exit from this function (error,
//! Ctrl-C, panic) still brings the stack down.

use crate::browser;
use crate::config::Settings;
use crate::manifest;
use crate::model::RunPlan;
use crate::process::ProcessRunner;
use crate::prompt::Prompter;
use crate::resolve;
use crate::stack::StackGuard;
use crate::text_summary;
use anyhow::Result;
use rand::Rng;

pub(crate) const OPEN_BROWSERS_QUESTION: &str =
    "\nDo you want to automatically open browser windows with the configured proxies? (yes/no): ";
const STOP_PROMPT: &str = "\nPress Enter to stop all VPN connections...";

/// Per-run switches that are not part of the plan itself.
pub(crate) struct SessionOptions<'a> {
    pub open_browsers: Option<bool>,
    pub json: bool,
    pub generated_at: &'a str,
}

pub(crate) async fn run_session<R, P, G>(
    plan: &RunPlan,
    settings: &Settings,
    runner: &R,
    prompter: &mut P,
    rng: &mut G,
    opts: &SessionOptions<'_>,
) -> Result<()>
where
    R: ProcessRunner,
    P: Prompter,
    G: Rng + ?Sized,
{
    let guard = StackGuard::new(runner, settings, &plan.compose_file);

    let content = manifest::generate(plan, settings, runner, rng, opts.generated_at)?;
    manifest::write(guard.manifest(), &content)?;
    println!("Generated combined docker-compose file: {}", guard.manifest().display());

    println!("\nStarting VPN connections...");
    guard.start()?;
    println!("\nAll VPN connections started successfully!");

    if opts.json {
        println!("{}", text_summary::proxy_summary_json(plan.connections)?);
    } else {
        for line in text_summary::build_proxy_summary(plan.connections).lines {
            println!("{line}");
        }
    }

    if resolve::confirm(opts.open_browsers, OPEN_BROWSERS_QUESTION, prompter).await? {
        println!("\nOpening browser windows...");
        let launched = browser::launch_all(runner, &settings.browser, plan.slots(), &plan.url);
        if launched > 0 {
            println!("\nBrowser windows opened. Each window is configured to use a different VPN connection.");
        }
    }

    if prompter.ask(STOP_PROMPT).await?.is_none() {
        println!("\nInput closed; press Ctrl-C to stop all VPN connections.");
        prompter.interrupted().await;
    }

    guard.stop();
    Ok(())
}
