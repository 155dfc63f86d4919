//! Test doubles for process execution and terminal input.

use crate::error::Error;
use crate::process::{CommandOutput, Invocation, IoMode, ProcessRunner};
use crate::prompt::Prompter;
use anyhow::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

#[derive(Debug, Clone)]
enum Response {
    Missing,
    Exit { code: i32, stdout: String },
}

/// Records every invocation and answers from scripted rules.
///
/// A rule matches when its pattern appears as a whole word in the rendered command line,
/// so `"up"` matches `docker-compose -f m.yml up -d` and `"docker"` does not match
/// `docker-compose`. The most recently added matching rule wins; unmatched commands exit 0.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    rules: Vec<(String, Response)>,
    calls: RefCell<Vec<Invocation>>,
    spawned: RefCell<Vec<Invocation>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing(mut self, pattern: &str) -> Self {
        self.rules.push((pattern.into(), Response::Missing));
        self
    }

    pub fn exit_code(mut self, pattern: &str, code: i32) -> Self {
        self.rules.push((
            pattern.into(),
            Response::Exit {
                code,
                stdout: String::new(),
            },
        ));
        self
    }

    pub fn stdout(mut self, pattern: &str, stdout: &str) -> Self {
        self.rules.push((
            pattern.into(),
            Response::Exit {
                code: 0,
                stdout: stdout.into(),
            },
        ));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn spawned(&self) -> Vec<Invocation> {
        self.spawned.borrow().clone()
    }

    /// Rendered command lines that contain `word`.
    pub fn calls_with(&self, word: &str) -> Vec<String> {
        self.calls()
            .iter()
            .map(ToString::to_string)
            .filter(|line| matches_word(line, word))
            .collect()
    }

    fn respond(&self, invocation: &Invocation) -> Option<Response> {
        let line = invocation.to_string();
        self.rules
            .iter()
            .rev()
            .find(|(pattern, _)| matches_word(&line, pattern))
            .map(|(_, r)| r.clone())
    }
}

fn matches_word(line: &str, pattern: &str) -> bool {
    format!(" {line} ").contains(&format!(" {pattern} "))
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation, _stdio: IoMode) -> io::Result<CommandOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        match self.respond(invocation) {
            Some(Response::Missing) => Err(io::Error::new(io::ErrorKind::NotFound, "not found")),
            Some(Response::Exit { code, stdout }) => Ok(CommandOutput {
                code: Some(code),
                stdout,
                stderr: String::new(),
            }),
            None => Ok(CommandOutput {
                code: Some(0),
                ..Default::default()
            }),
        }
    }

    fn spawn_detached(&self, invocation: &Invocation) -> io::Result<()> {
        match self.respond(invocation) {
            Some(Response::Missing) => Err(io::Error::new(io::ErrorKind::NotFound, "not found")),
            _ => {
                self.spawned.borrow_mut().push(invocation.clone());
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Answer {
    Line(String),
    Eof,
    Interrupt,
}

/// Answers prompts from a fixed script and remembers the questions asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    pub questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: lines.into_iter().map(|l| Answer::Line(l.into())).collect(),
            questions: Vec::new(),
        }
    }

    pub fn then(mut self, answer: Answer) -> Self {
        self.answers.push_back(answer);
        self
    }
}

impl Prompter for ScriptedPrompter {
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.questions.push(question.to_string());
        match self.answers.pop_front() {
            Some(Answer::Line(l)) => Ok(Some(l)),
            Some(Answer::Eof) | None => Ok(None),
            Some(Answer::Interrupt) => Err(Error::Interrupted.into()),
        }
    }

    async fn interrupted(&mut self) {}
}
