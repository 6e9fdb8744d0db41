//! Which diagnostics are kept and how they are rendered.

use super::codes::{ErrorCode, Severity};
use std::collections::HashSet;

/// Text layout of a rendered diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    /// Print `error[E3001]` rather than `error`
    pub codes: bool,
    /// Quote the offending source line under a `-->` location
    pub source_lines: bool,
    /// ANSI colors on the severity header and location arrow
    pub colors: bool,
}

impl RenderStyle {
    /// Everything on, for an interactive terminal.
    pub const TERMINAL: RenderStyle = RenderStyle {
        codes: true,
        source_lines: true,
        colors: true,
    };

    /// Same layout as [`RenderStyle::TERMINAL`] without escape codes.
    pub const PLAIN: RenderStyle = RenderStyle {
        codes: true,
        source_lines: true,
        colors: false,
    };
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::TERMINAL
    }
}

#[derive(Debug, Clone)]
pub struct ErrorConfig {
    /// Errors collected before a stage gives up
    pub max_errors: usize,
    /// Diagnostics below this severity are dropped
    pub min_severity: Severity,
    pub suppressed_codes: HashSet<ErrorCode>,
    pub style: RenderStyle,
}

impl ErrorConfig {
    pub fn new() -> Self {
        ErrorConfig {
            max_errors: 100,
            min_severity: Severity::Warning,
            suppressed_codes: HashSet::new(),
            style: RenderStyle::default(),
        }
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn suppress_code(&mut self, code: ErrorCode) {
        self.suppressed_codes.insert(code);
    }

    pub fn is_suppressed(&self, code: ErrorCode) -> bool {
        self.suppressed_codes.contains(&code)
    }

    /// Whether a diagnostic of this severity and code should be reported.
    pub fn should_report(&self, severity: Severity, code: Option<ErrorCode>) -> bool {
        severity >= self.min_severity && !code.is_some_and(|c| self.is_suppressed(c))
    }
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_report_respects_severity_and_suppression() {
        let mut config = ErrorConfig::new().with_min_severity(Severity::Error);
        assert!(!config.should_report(Severity::Warning, Some(ErrorCode::W3100)));
        assert!(config.should_report(Severity::Error, Some(ErrorCode::E3001)));

        config.suppress_code(ErrorCode::E3001);
        assert!(!config.should_report(Severity::Error, Some(ErrorCode::E3001)));
        assert!(config.should_report(Severity::Error, None));
    }
}
