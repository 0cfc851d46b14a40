//! Diagnostic console contract and adapters.

use std::{cell::RefCell, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Severity of a diagnostic line.
pub enum DiagnosticLevel {
    /// Informational message.
    Info,
    /// Successful operation.
    Success,
    /// Failure or protocol misuse.
    Error,
}

impl DiagnosticLevel {
    /// Returns a stable token for log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One themed diagnostic line.
pub struct DiagnosticLine {
    /// Severity.
    pub level: DiagnosticLevel,
    /// Service name used as the line tag.
    pub service: String,
    /// Tag background color (CSS).
    pub background: String,
    /// Tag foreground color (CSS), chosen for contrast against `background`.
    pub foreground: String,
    /// Message text.
    pub message: String,
}

/// Output target for themed diagnostics.
pub trait ConsoleSink {
    /// Writes one line.
    fn write(&self, line: &DiagnosticLine);
}

#[derive(Debug, Clone, Copy, Default)]
/// Sink forwarding diagnostics to `tracing`.
pub struct TracingConsole;

impl ConsoleSink for TracingConsole {
    fn write(&self, line: &DiagnosticLine) {
        match line.level {
            DiagnosticLevel::Error => {
                tracing::error!(service = %line.service, "{}", line.message)
            }
            level => tracing::info!(service = %line.service, level = level.as_str(), "{}", line.message),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Sink recording lines in memory. Clones share the record.
pub struct MemoryConsole {
    lines: Rc<RefCell<Vec<DiagnosticLine>>>,
}

impl MemoryConsole {
    /// Returns the recorded lines in order.
    pub fn lines(&self) -> Vec<DiagnosticLine> {
        self.lines.borrow().clone()
    }

    /// Returns recorded messages of one level.
    pub fn messages(&self, level: DiagnosticLevel) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|line| line.level == level)
            .map(|line| line.message.clone())
            .collect()
    }
}

impl ConsoleSink for MemoryConsole {
    fn write(&self, line: &DiagnosticLine) {
        self.lines.borrow_mut().push(line.clone());
    }
}
