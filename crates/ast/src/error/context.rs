//! Error context for rich diagnostics.

use text_size::TextRange;

/// Source text surrounding a diagnostic.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorContext {
    /// The source file name (if available)
    pub filename: Option<String>,
    /// The source code
    pub source: String,
    /// The error location
    pub span: TextRange,
}

impl ErrorContext {
    /// Create a new error context.
    pub fn new(source: String, span: TextRange) -> Self {
        ErrorContext {
            filename: None,
            source,
            span,
        }
    }

    /// Set the filename.
    pub fn with_filename(mut self, filename: String) -> Self {
        self.filename = Some(filename);
        self
    }

    fn clamped_start(&self) -> usize {
        let start: usize = self.span.start().into();
        let mut start = start.min(self.source.len());
        while !self.source.is_char_boundary(start) {
            start -= 1;
        }
        start
    }

    /// Get the 1-based line and column number for the error.
    pub fn line_and_column(&self) -> (usize, usize) {
        let start = self.clamped_start();
        let line = self.source[..start].chars().filter(|&c| c == '\n').count() + 1;
        let line_start = self.source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let col = self.source[line_start..start].chars().count() + 1;
        (line, col)
    }

    /// Get the line containing the error.
    pub fn error_line(&self) -> &str {
        let start = self.clamped_start();
        let line_start = self.source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = self.source[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(self.source.len());

        &self.source[line_start..line_end]
    }

    /// `file:line:col`, or `line L:C` when no file name is known.
    pub fn location(&self) -> String {
        let (line, col) = self.line_and_column();
        match &self.filename {
            Some(filename) => format!("{}:{}:{}", filename, line, col),
            None => format!("line {}:{}", line, col),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column() {
        let source = "int g = 5;\nint f() { return h; }\n".to_string();
        let span = TextRange::new(28.into(), 29.into());
        let context = ErrorContext::new(source, span);

        assert_eq!(context.line_and_column(), (2, 18));
        assert_eq!(context.error_line(), "int f() { return h; }");
        assert_eq!(context.location(), "line 2:18");
    }

    #[test]
    fn test_span_past_end_is_clamped() {
        let context = ErrorContext::new("x".to_string(), TextRange::new(40.into(), 41.into()))
            .with_filename("main.gl".to_string());
        assert_eq!(context.location(), "main.gl:1:2");
    }
}
