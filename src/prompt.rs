//! Interactive terminal input.

use crate::error::Error;
use anyhow::Result;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;

/// Source of answers for interactive questions.
pub trait Prompter {
    /// Print `question` and wait for one line. `Ok(None)` means input is closed.
    /// A user interrupt (Ctrl-C) surfaces as [`Error::Interrupted`].
    async fn ask(&mut self, question: &str) -> Result<Option<String>>;

    /// Wait until the user interrupts.
    async fn interrupted(&mut self);
}

/// Spawn a thread that forwards stdin lines; the channel closes at end of input.
///
/// A plain thread rather than a blocking task: a read that never completes must not hold
/// up runtime shutdown.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Forward every Ctrl-C as a message. The channel closes if the handler cannot be installed.
fn spawn_interrupt_listener() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel::<()>();
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("cannot listen for Ctrl-C: {e}");
                break;
            }
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// The real terminal. Must be created inside the tokio runtime.
pub struct Console {
    lines: mpsc::UnboundedReceiver<String>,
    interrupts: mpsc::UnboundedReceiver<()>,
}

impl Console {
    pub fn spawn() -> Self {
        Self::from_channels(spawn_input_reader(), spawn_interrupt_listener())
    }

    fn from_channels(
        lines: mpsc::UnboundedReceiver<String>,
        interrupts: mpsc::UnboundedReceiver<()>,
    ) -> Self {
        Self { lines, interrupts }
    }

    /// Forget Ctrl-C presses that arrived while no question was open, e.g. during a
    /// blocking `compose up`. Those already did their job by stopping the child.
    fn discard_stale_interrupts(&mut self) {
        let mut stale = 0;
        while self.interrupts.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            tracing::debug!(stale, "discarded interrupts received outside a question");
        }
    }
}

impl Prompter for Console {
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.discard_stale_interrupts();
        {
            let mut out = std::io::stdout().lock();
            let _ = write!(out, "{question}");
            let _ = out.flush();
        }
        tokio::select! {
            biased;
            Some(()) = self.interrupts.recv() => {
                println!();
                Err(Error::Interrupted.into())
            }
            line = self.lines.recv() => Ok(line.map(|l| l.trim_end_matches('\r').to_string())),
        }
    }

    async fn interrupted(&mut self) {
        if self.interrupts.recv().await.is_none() {
            // No signal handler: nothing will ever arrive.
            std::future::pending::<()>().await;
        }
    }
}

/// Ask and treat closed input as an empty answer.
pub async fn ask_line<P: Prompter>(prompter: &mut P, question: &str) -> Result<String> {
    Ok(prompter.ask(question).await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_interrupted;

    #[tokio::test]
    async fn interrupt_queued_before_the_question_does_not_answer_it() {
        let (line_tx, lines) = mpsc::unbounded_channel();
        let (int_tx, interrupts) = mpsc::unbounded_channel();
        let mut console = Console::from_channels(lines, interrupts);

        int_tx.send(()).unwrap();
        int_tx.send(()).unwrap();
        line_tx.send("yes\r".to_string()).unwrap();
        assert_eq!(console.ask("? ").await.unwrap().as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn interrupt_during_the_question_wins() {
        let (_line_tx, lines) = mpsc::unbounded_channel::<String>();
        let (int_tx, interrupts) = mpsc::unbounded_channel();
        let mut console = Console::from_channels(lines, interrupts);

        let (answer, ()) = tokio::join!(console.ask("? "), async {
            tokio::task::yield_now().await;
            int_tx.send(()).unwrap();
        });
        let err = answer.unwrap_err();
        assert!(is_interrupted(&err));
    }

    #[tokio::test]
    async fn closed_input_reads_as_none() {
        let (line_tx, lines) = mpsc::unbounded_channel::<String>();
        let (_int_tx, interrupts) = mpsc::unbounded_channel();
        let mut console = Console::from_channels(lines, interrupts);
        drop(line_tx);
        assert_eq!(console.ask("? ").await.unwrap(), None);
        assert_eq!(ask_line(&mut console, "? ").await.unwrap(), "");
    }
}
