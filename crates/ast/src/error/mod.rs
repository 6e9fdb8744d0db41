//! Diagnostics shared by every stage of the Glint compiler.
//!
//! Errors carry a stable [`ErrorCode`], a [`Severity`] and a source span.
//! Source text is attached lazily through [`Diagnostic::with_source`] since
//! later stages only see spans.

pub mod codes;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod formatter;

pub use codes::{ErrorCode, Severity};
pub use config::{ErrorConfig, RenderStyle};
pub use context::ErrorContext;
pub use diagnostic::{Diagnostic, DiagnosticCollector, RelatedInformation};
pub use formatter::DiagnosticFormatter;
