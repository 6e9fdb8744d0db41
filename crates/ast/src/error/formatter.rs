//! Text rendering of diagnostics.

use super::codes::Severity;
use super::config::{ErrorConfig, RenderStyle};
use super::context::ErrorContext;
use super::diagnostic::Diagnostic;
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Renders diagnostics the way `config` asks for.
pub struct DiagnosticFormatter<'a> {
    config: &'a ErrorConfig,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(config: &'a ErrorConfig) -> Self {
        DiagnosticFormatter { config }
    }

    fn style(&self) -> RenderStyle {
        self.config.style
    }

    /// Format a single diagnostic, one line per part, ending in a newline.
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        self.write_header(&mut output, diagnostic);
        if self.style().source_lines
            && let Some(context) = &diagnostic.context
        {
            self.write_excerpt(&mut output, context);
        }

        for related in &diagnostic.related {
            let _ = writeln!(output, "  note: {}", related.message);
        }
        for note in &diagnostic.notes {
            let _ = writeln!(output, "  note: {}", note);
        }
        if let Some(suggestion) = &diagnostic.suggestion {
            let _ = writeln!(output, "  help: {}", suggestion);
        }
        output
    }

    fn write_header(&self, output: &mut String, diagnostic: &Diagnostic) {
        let severity = diagnostic.severity.as_str();
        let header = match (self.style().codes, diagnostic.code) {
            (true, Some(code)) => format!("{}[{}]", severity, code),
            _ => severity.to_string(),
        };
        if self.style().colors {
            let painted = match diagnostic.severity {
                Severity::Error | Severity::Fatal => header.bold().red().to_string(),
                Severity::Warning => header.bold().yellow().to_string(),
                Severity::Info => header.bold().cyan().to_string(),
            };
            output.push_str(&painted);
        } else {
            output.push_str(&header);
        }
        let _ = writeln!(output, ": {}", diagnostic.message);
    }

    /// `--> file:line:col`, the source line, and a caret run under the span.
    fn write_excerpt(&self, output: &mut String, context: &ErrorContext) {
        let arrow = if self.style().colors {
            "-->".blue().to_string()
        } else {
            "-->".to_string()
        };
        let _ = writeln!(output, "  {} {}", arrow, context.location());

        let (_, col) = context.line_and_column();
        let line = context.error_line();
        let room = line.chars().count().saturating_sub(col - 1);
        let width = usize::from(context.span.len()).min(room).max(1);
        let _ = writeln!(output, "   | {}", line);
        let _ = writeln!(output, "   | {}{}", " ".repeat(col - 1), "^".repeat(width));
    }

    /// Format every diagnostic the configuration reports, separated by blank lines.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .filter(|d| self.config.should_report(d.severity, d.code))
            .map(|d| self.format(d))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use text_size::TextRange;

    #[test]
    fn test_plain_format_with_excerpt() {
        let config = ErrorConfig::new().with_style(RenderStyle::PLAIN);
        let diagnostic = Diagnostic::from_code(
            ErrorCode::E3001,
            "undeclared identifier `y`".to_string(),
            TextRange::new(8.into(), 9.into()),
        )
        .with_source("int x = y;", Some("main.gl"));

        let text = DiagnosticFormatter::new(&config).format(&diagnostic);
        assert!(text.starts_with("error[E3001]: undeclared identifier `y`\n"));
        assert!(text.contains("--> main.gl:1:9"));
        assert!(text.contains("   |         ^\n"));
    }

    #[test]
    fn test_format_all_filters_by_severity() {
        let config = ErrorConfig::new()
            .with_style(RenderStyle {
                source_lines: false,
                ..RenderStyle::PLAIN
            })
            .with_min_severity(Severity::Error);
        let diagnostics = vec![
            Diagnostic::warning("unused".to_string(), TextRange::default()),
            Diagnostic::error("broken".to_string(), TextRange::default()),
        ];
        let text = DiagnosticFormatter::new(&config).format_all(&diagnostics);
        assert_eq!(text, "error: broken\n");
    }
}
