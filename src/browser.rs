//! Browser windows bound to the per-slot HTTP proxies.

use crate::model::Slot;
use crate::process::{Invocation, ProcessRunner};
use std::io;

pub const DEFAULT_URL: &str = "about:blank";

pub fn invocation(browser: &str, slot: Slot, url: &str) -> Invocation {
    Invocation::new(browser)
        .arg(format!("--proxy-server=localhost:{}", slot.http_port()))
        .arg(format!("--user-data-dir=./{}", slot.profile_dir().display()))
        .arg("--new-window")
        .arg(url)
}

/// Open one window per slot, each with its own profile. Fire-and-forget: the processes are
/// never waited on. Returns how many windows were launched.
pub fn launch_all<R, I>(runner: &R, browser: &str, slots: I, url: &str) -> usize
where
    R: ProcessRunner,
    I: IntoIterator<Item = Slot>,
{
    let mut launched = 0;
    for slot in slots {
        let inv = invocation(browser, slot, url);
        match runner.spawn_detached(&inv) {
            Ok(()) => {
                launched += 1;
                println!(
                    "Opened browser window with http proxy: localhost:{} (Profile: {slot})",
                    slot.http_port()
                );
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                eprintln!("Error: {browser} not found. Please ensure it's installed and in your PATH.");
                break;
            }
            Err(e) => eprintln!("Error opening browser for connection {slot}: {e}"),
        }
    }
    launched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    #[test]
    fn one_window_per_slot_with_its_own_proxy_and_profile() {
        let runner = RecordingRunner::new();
        let n = launch_all(&runner, "chromium-browser", Slot::range(2), "https://example.org");
        assert_eq!(n, 2);
        let spawned: Vec<String> = runner.spawned().iter().map(ToString::to_string).collect();
        assert_eq!(
            spawned,
            vec![
                "chromium-browser --proxy-server=localhost:8889 --user-data-dir=./chrome_profile_1 --new-window https://example.org",
                "chromium-browser --proxy-server=localhost:8890 --user-data-dir=./chrome_profile_2 --new-window https://example.org",
            ]
        );
    }

    #[test]
    fn missing_browser_stops_after_first_attempt() {
        let runner = RecordingRunner::new().missing("chromium-browser");
        assert_eq!(launch_all(&runner, "chromium-browser", Slot::range(3), DEFAULT_URL), 0);
        assert!(runner.spawned().is_empty());
    }
}
