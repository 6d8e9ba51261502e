use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::region::FileRegion;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Failure,
}

/// One diagnostic line: `file:line:col: CODE: message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Resolved file name of the region (the region itself only holds a
    /// file id).
    pub path: String,
    pub region: FileRegion,
    /// Diagnostic category, e.g. `ELABXXX`.
    pub code: &'static str,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.path, self.region.line, self.region.column, self.code, self.message
        )
    }
}

/// Receiver for diagnostics emitted during elaboration.
///
/// The elaborator never writes to a global logger; every message goes
/// through the sink the caller injected, so library users decide where
/// output lands (stderr, a buffer under test, a GUI, ...).
pub trait DiagSink {
    fn diag(&mut self, diag: &Diagnostic);
}

/// Sink that prints every message to stderr.
#[derive(Debug, Default)]
pub struct StderrSink {
    /// When false, `Info` messages are suppressed (the CLI's default;
    /// `--all-msg` flips it).
    pub all_msg: bool,
}

impl DiagSink for StderrSink {
    fn diag(&mut self, diag: &Diagnostic) {
        if diag.severity == Severity::Info && !self.all_msg {
            return;
        }
        eprintln!("{diag}");
    }
}

/// Sink that collects every message, used by tests and the REPL-style
/// drivers.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub messages: Vec<Diagnostic>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// True when some collected message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|d| d.message.contains(needle))
    }
}

impl DiagSink for CollectSink {
    fn diag(&mut self, diag: &Diagnostic) {
        self.messages.push(diag.clone());
    }
}
