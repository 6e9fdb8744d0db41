//! Diagnostic reporting.

use super::codes::{ErrorCode, Severity};
use super::context::ErrorContext;
use text_size::TextRange;
use thin_vec::ThinVec;

/// Additional information related to the main diagnostic.
#[derive(Debug, Clone)]
pub struct RelatedInformation {
    pub span: TextRange,
    pub message: String,
}

/// A single reported problem with its source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Error severity
    pub severity: Severity,
    /// Error code
    pub code: Option<ErrorCode>,
    /// Primary error message
    pub message: String,
    /// Primary location
    pub span: TextRange,
    /// Suggestion for fixing the error
    pub suggestion: Option<String>,
    /// Secondary locations ("previously declared here")
    pub related: ThinVec<RelatedInformation>,
    /// Free-form notes
    pub notes: ThinVec<String>,
    /// Source context, attached once the source text is known
    pub context: Option<ErrorContext>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(severity: Severity, message: String, span: TextRange) -> Self {
        Diagnostic {
            severity,
            code: None,
            message,
            span,
            suggestion: None,
            related: ThinVec::new(),
            notes: ThinVec::new(),
            context: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(message: String, span: TextRange) -> Self {
        Self::new(Severity::Error, message, span)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: String, span: TextRange) -> Self {
        Self::new(Severity::Warning, message, span)
    }

    /// Create a diagnostic whose severity comes from its code.
    pub fn from_code(code: ErrorCode, message: String, span: TextRange) -> Self {
        Self::new(code.severity(), message, span).with_code(code)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Add related span information.
    pub fn with_related(mut self, span: TextRange, message: String) -> Self {
        self.related.push(RelatedInformation { span, message });
        self
    }

    /// Add a note.
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    /// Attach the source text the span points into.
    pub fn with_source(mut self, source: &str, filename: Option<&str>) -> Self {
        let mut context = ErrorContext::new(source.to_string(), self.span);
        if let Some(filename) = filename {
            context = context.with_filename(filename.to_string());
        }
        self.context = Some(context);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Diagnostic collector for batch reporting.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticCollector {
    /// Create a new diagnostic collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error | Severity::Fatal => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => {}
        }
        self.diagnostics.push(diagnostic);
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the collector, yielding the diagnostics in report order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_counts_by_severity() {
        let mut collector = DiagnosticCollector::new();
        collector.report(Diagnostic::from_code(
            ErrorCode::E3001,
            "undeclared identifier `x`".to_string(),
            TextRange::default(),
        ));
        collector.report(Diagnostic::from_code(
            ErrorCode::W3100,
            "unreachable statement".to_string(),
            TextRange::default(),
        ));

        assert!(collector.has_errors());
        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.warning_count(), 1);
        assert_eq!(
            collector.diagnostics()[0].to_string(),
            "error[E3001]: undeclared identifier `x`"
        );
    }
}
