//! Application-level orchestration.
//!
//! This module owns the session lifecycle (manifest, start, proxy display, browsers, stop).
//! The CLI layer resolves options first and calls into this module.

mod session;

pub(crate) use session::{run_session, SessionOptions};
