//! Diagnostics sink shared by the lexer and the parser
//!
//! Nothing in the front end aborts on bad source text. Problems are recorded
//! here as [`Diagnostic`]s and the caller checks [`Diagnostics::has_errors`]
//! before trusting the tree. Debug chatter goes through the `log` facade
//! instead of being stored.
//!
//! Rendering for terminals lives on [`Diagnostic::render`], which styles the
//! severity label with crossterm and underlines the offending column.

use crate::parser::ast::SourceLocation;
use crossterm::style::Stylize;
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: SourceLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Format for a terminal: `error: line 3: message`, then the source line
    /// with a caret under the column when `source` is available.
    pub fn render(&self, source: Option<&str>, color: bool) -> String {
        let label = format!("{}:", self.severity);
        let label = if !color {
            label
        } else {
            match self.severity {
                Severity::Error => label.red().bold().to_string(),
                Severity::Warning => label.yellow().bold().to_string(),
            }
        };

        let mut out = format!("{} line {}: {}", label, self.location.line, self.message);

        let line_text = source.and_then(|src| {
            self.location
                .line
                .checked_sub(1)
                .and_then(|index| src.lines().nth(index))
        });
        if let Some(text) = line_text {
            let pad = " ".repeat(self.location.column.saturating_sub(1));
            let caret = if color {
                "^".green().bold().to_string()
            } else {
                "^".to_string()
            };
            out.push_str(&format!("\n    {}\n    {}{}", text, pad, caret));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: line {}: {}",
            self.severity, self.location.line, self.message
        )
    }
}

/// Accumulates diagnostics and tracks the "had error" flag
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    max_errors: Option<usize>,
    warnings_as_errors: bool,
    limit_reached: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop recording once this many errors have been seen.
    pub fn with_max_errors(mut self, max_errors: Option<usize>) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// Count warnings toward [`has_errors`](Self::has_errors).
    pub fn with_warnings_as_errors(mut self, enabled: bool) -> Self {
        self.warnings_as_errors = enabled;
        self
    }

    pub fn error(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Severity::Error, location, message.into());
    }

    pub fn warning(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Severity::Warning, location, message.into());
    }

    /// Debug output is never stored, only logged.
    pub fn debug(&self, location: SourceLocation, message: impl fmt::Display) {
        log::debug!("line {}: {}", location.line, message);
    }

    fn push(&mut self, severity: Severity, location: SourceLocation, message: String) {
        if self.limit_reached {
            log::trace!("dropped after error limit: {}", message);
            return;
        }

        log::debug!("{} at {}: {}", severity, location, message);
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        self.entries.push(Diagnostic {
            severity,
            location,
            message,
        });

        if let Some(max) = self.max_errors {
            if self.error_count >= max {
                self.limit_reached = true;
            }
        }
    }

    /// Move every diagnostic of `other` into this sink, in order.
    pub fn append(&mut self, other: Diagnostics) {
        for diag in other.entries {
            self.push(diag.severity, diag.location, diag.message);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0 || (self.warnings_as_errors && self.warning_count > 0)
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// True once `max_errors` was hit; later diagnostics were dropped.
    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
