//! Structural diagnostics reported while building a tree.
//!
//! The builder never decides what happens to a diagnostic; it hands each one
//! to a [`DiagnosticSink`] supplied by the caller.

use std::fmt;

use tracing::{info, warn};

/// What went wrong structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A start marker with no matching end marker before end of input.
    UnclosedBlock,
    /// Non-empty lines after the top-level block was closed.
    TrailingContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One structural problem, located by block name and 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub block: String,
    pub line: usize,
}

impl Diagnostic {
    pub fn unclosed_block(block: &str, line: usize) -> Self {
        Self {
            kind: DiagnosticKind::UnclosedBlock,
            severity: Severity::Error,
            message: format!("block {block} on line {line} is not closed"),
            block: block.to_string(),
            line,
        }
    }

    pub fn trailing_content(block: &str, line: usize) -> Self {
        Self {
            kind: DiagnosticKind::TrailingContent,
            severity: Severity::Warning,
            message: format!("content after end of block {block} starting on line {line} is ignored"),
            block: block.to_string(),
            line,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Receiver for diagnostics produced during a parse.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects every diagnostic in report order.
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Forwards diagnostics to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => warn!(
                block = %diagnostic.block,
                line = diagnostic.line,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => info!(
                block = %diagnostic.block,
                line = diagnostic.line,
                "{}",
                diagnostic.message
            ),
        }
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}
