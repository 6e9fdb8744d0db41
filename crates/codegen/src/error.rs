//! Codegen error types

use crate::ir::IrType;
use glint_ast::error::{Diagnostic, ErrorCode};
use text_size::TextRange;
use thiserror::Error;

/// Failures raised while emitting IR.
///
/// Everything except [`CodegenError::Internal`] and
/// [`CodegenError::Verification`] describes a problem in the source program
/// and is recoverable: the emitter reports it and moves on to the next
/// statement or declaration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("use of undeclared identifier `{name}`")]
    UndeclaredIdentifier { name: String, span: TextRange },

    #[error("redeclaration of `{name}` in the same scope")]
    DuplicateDeclaration {
        name: String,
        span: TextRange,
        previous: TextRange,
    },

    #[error("initializer of global `{name}` is not a compile-time constant")]
    NonConstantGlobalInitializer { name: String, span: TextRange },

    #[error("`break` outside of a loop or switch")]
    BreakOutsideTarget { span: TextRange },

    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop { span: TextRange },

    #[error("conflicting declaration of function `{name}`: `{found}` vs previous `{previous}`")]
    ConflictingFunctionDeclaration {
        name: String,
        previous: String,
        found: String,
        span: TextRange,
    },

    #[error("redefinition of function `{name}`")]
    FunctionRedefinition { name: String, span: TextRange },

    #[error("cannot determine the type of `{name}`")]
    MissingType { name: String, span: TextRange },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: IrType,
        found: IrType,
        span: TextRange,
    },

    #[error("`{name}` is a local of an enclosing function")]
    EnclosingLocal { name: String, span: TextRange },

    #[error("`{name}` is not a function")]
    NotCallable { name: String, span: TextRange },

    #[error("function `{name}` cannot be used as a value")]
    NotAValue { name: String, span: TextRange },

    #[error("function `{name}` takes {expected} argument(s) but {found} were supplied")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: TextRange,
    },

    #[error("`case` or `default` label outside of a switch")]
    CaseOutsideSwitch { span: TextRange },

    #[error("duplicate case value `{value}`")]
    DuplicateCaseLabel {
        value: i64,
        span: TextRange,
        previous: TextRange,
    },

    #[error("internal compiler error: {0}")]
    Internal(String),

    #[error("IR verification failed in `{function}`: {message}")]
    Verification { function: String, message: String },
}

impl CodegenError {
    pub fn internal(message: impl Into<String>) -> Self {
        CodegenError::Internal(message.into())
    }

    /// Internal errors abort emission of the whole unit.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CodegenError::Internal(_) | CodegenError::Verification { .. }
        )
    }

    /// Source location of the offending construct.
    pub fn span(&self) -> Option<TextRange> {
        match self {
            CodegenError::UndeclaredIdentifier { span, .. }
            | CodegenError::DuplicateDeclaration { span, .. }
            | CodegenError::NonConstantGlobalInitializer { span, .. }
            | CodegenError::BreakOutsideTarget { span }
            | CodegenError::ContinueOutsideLoop { span }
            | CodegenError::ConflictingFunctionDeclaration { span, .. }
            | CodegenError::FunctionRedefinition { span, .. }
            | CodegenError::MissingType { span, .. }
            | CodegenError::TypeMismatch { span, .. }
            | CodegenError::EnclosingLocal { span, .. }
            | CodegenError::NotCallable { span, .. }
            | CodegenError::NotAValue { span, .. }
            | CodegenError::ArgumentCountMismatch { span, .. }
            | CodegenError::CaseOutsideSwitch { span }
            | CodegenError::DuplicateCaseLabel { span, .. } => Some(*span),
            CodegenError::Internal(_) | CodegenError::Verification { .. } => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CodegenError::UndeclaredIdentifier { .. } => ErrorCode::E3001,
            CodegenError::DuplicateDeclaration { .. } => ErrorCode::E3002,
            CodegenError::NonConstantGlobalInitializer { .. } => ErrorCode::E4020,
            CodegenError::BreakOutsideTarget { .. } => ErrorCode::E2011,
            CodegenError::ContinueOutsideLoop { .. } => ErrorCode::E2012,
            CodegenError::ConflictingFunctionDeclaration { .. } => ErrorCode::E3005,
            CodegenError::FunctionRedefinition { .. } => ErrorCode::E3006,
            CodegenError::MissingType { .. } => ErrorCode::E4015,
            CodegenError::TypeMismatch { .. } => ErrorCode::E4001,
            CodegenError::EnclosingLocal { .. } => ErrorCode::E3007,
            CodegenError::NotCallable { .. } => ErrorCode::E4009,
            CodegenError::NotAValue { .. } => ErrorCode::E4010,
            CodegenError::ArgumentCountMismatch { .. } => ErrorCode::E4004,
            CodegenError::CaseOutsideSwitch { .. } => ErrorCode::E2030,
            CodegenError::DuplicateCaseLabel { .. } => ErrorCode::E2031,
            CodegenError::Internal(_) | CodegenError::Verification { .. } => ErrorCode::E9001,
        }
    }

    /// Convert into a reportable diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic =
            Diagnostic::from_code(self.code(), self.to_string(), self.span().unwrap_or_default());
        match self {
            CodegenError::DuplicateDeclaration { name, previous, .. } => diagnostic
                .with_related(*previous, format!("previous declaration of `{}` is here", name)),
            CodegenError::DuplicateCaseLabel { previous, .. } => {
                diagnostic.with_related(*previous, "previous case label is here".to_string())
            }
            CodegenError::NonConstantGlobalInitializer { .. } => diagnostic.with_suggestion(
                "initialize the global with literals or other constant globals".to_string(),
            ),
            CodegenError::EnclosingLocal { name, .. } => diagnostic
                .with_suggestion(format!("pass `{}` to the nested function as a parameter", name)),
            CodegenError::ContinueOutsideLoop { .. } => diagnostic
                .with_note("a `switch` is not a `continue` target on its own".to_string()),
            _ => diagnostic,
        }
    }
}

pub type CodegenResult<T> = Result<T, CodegenError>;
