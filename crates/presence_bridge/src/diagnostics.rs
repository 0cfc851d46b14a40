//! Service-themed diagnostic output.

use std::rc::Rc;

use presence_host::{contrast_color, BridgeError, ConsoleSink, DiagnosticLevel, DiagnosticLine};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Background/foreground pair used to tag diagnostic lines with a service's color.
pub struct Theme {
    /// Service color as CSS.
    pub background: String,
    /// Contrasting text color.
    pub foreground: &'static str,
}

impl Theme {
    /// Derives a theme from a hex service color.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidColor`] when `color` is not a 3- or 6-digit hex color.
    pub fn from_service_color(color: &str) -> Result<Self, BridgeError> {
        let brightness =
            contrast_color(color).ok_or_else(|| BridgeError::InvalidColor(color.to_string()))?;
        let background = if color.starts_with('#') {
            color.to_string()
        } else {
            format!("#{color}")
        };
        Ok(Self {
            background,
            foreground: brightness.foreground(),
        })
    }
}

pub(crate) struct Diagnostics {
    service: String,
    theme: Theme,
    verbose: bool,
    sink: Rc<dyn ConsoleSink>,
}

impl Diagnostics {
    pub(crate) fn new(service: &str, theme: Theme, verbose: bool, sink: Rc<dyn ConsoleSink>) -> Self {
        Self {
            service: service.to_string(),
            theme,
            verbose,
            sink,
        }
    }

    pub(crate) fn theme(&self) -> &Theme {
        &self.theme
    }

    pub(crate) fn emit(&self, level: DiagnosticLevel, message: &str) {
        if !self.verbose && level != DiagnosticLevel::Error {
            return;
        }
        self.sink.write(&DiagnosticLine {
            level,
            service: self.service.clone(),
            background: self.theme.background.clone(),
            foreground: self.theme.foreground.to_string(),
            message: message.to_string(),
        });
    }
}
