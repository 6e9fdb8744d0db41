//! Error codes and severities for Glint diagnostics.

use std::fmt;

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning that doesn't prevent emission
    Warning,
    /// Error in the source program; emission continues best-effort
    Error,
    /// Internal invariant violation; emission stops immediately
    Fatal,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }

    pub fn is_error(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error code categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // ===== Control Flow Errors (E2xxx) =====
    E2011, // Break outside loop or switch
    E2012, // Continue outside loop
    E2030, // Case label outside switch
    E2031, // Duplicate case label

    // ===== Name Resolution Errors (E3xxx) =====
    E3001, // Undefined name
    E3002, // Duplicate definition
    E3005, // Conflicting function declaration
    E3006, // Function redefinition
    E3007, // Local of an enclosing function

    // ===== Control Flow Warnings (W3100-W3199) =====
    W3100, // Unreachable code
    W3102, // Missing return statement

    // ===== Type Errors (E4xxx) =====
    E4001, // Type mismatch
    E4004, // Argument count mismatch
    E4009, // Not callable
    E4010, // Not a value
    E4015, // Missing type
    E4020, // Non-constant global initializer

    // ===== Internal Errors (E9xxx) =====
    E9001, // Internal compiler error
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2030 => "E2030",
            ErrorCode::E2031 => "E2031",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::W3100 => "W3100",
            ErrorCode::W3102 => "W3102",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4009 => "E4009",
            ErrorCode::E4010 => "E4010",
            ErrorCode::E4015 => "E4015",
            ErrorCode::E4020 => "E4020",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Short human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            ErrorCode::E2011 => "break outside loop or switch",
            ErrorCode::E2012 => "continue outside loop",
            ErrorCode::E2030 => "case label outside switch",
            ErrorCode::E2031 => "duplicate case label",
            ErrorCode::E3001 => "undeclared identifier",
            ErrorCode::E3002 => "duplicate declaration",
            ErrorCode::E3005 => "conflicting function declaration",
            ErrorCode::E3006 => "function redefinition",
            ErrorCode::E3007 => "local of an enclosing function",
            ErrorCode::W3100 => "unreachable code",
            ErrorCode::W3102 => "missing return",
            ErrorCode::E4001 => "type mismatch",
            ErrorCode::E4004 => "argument count mismatch",
            ErrorCode::E4009 => "not callable",
            ErrorCode::E4010 => "not a value",
            ErrorCode::E4015 => "missing type",
            ErrorCode::E4020 => "non-constant global initializer",
            ErrorCode::E9001 => "internal compiler error",
        }
    }

    /// Default severity for diagnostics carrying this code.
    pub fn severity(self) -> Severity {
        match self {
            ErrorCode::W3100 | ErrorCode::W3102 => Severity::Warning,
            ErrorCode::E9001 => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_codes_have_warning_severity() {
        assert_eq!(ErrorCode::W3100.severity(), Severity::Warning);
        assert!(!ErrorCode::W3102.severity().is_error());
        assert!(ErrorCode::E3001.severity().is_error());
        assert_eq!(ErrorCode::E9001.severity(), Severity::Fatal);
    }
}
