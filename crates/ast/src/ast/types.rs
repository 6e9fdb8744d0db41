//! Source-level types, qualifiers and identifiers.

use std::fmt;
use text_size::TextRange;

/// A resolved source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    Int,
    Uint,
    Float,
}

impl Type {
    pub fn as_str(self) -> &'static str {
        match self {
            Type::Void => "void",
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Uint => "uint",
            Type::Float => "float",
        }
    }

    pub fn is_void(self) -> bool {
        matches!(self, Type::Void)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a type qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualifierKind {
    Const,
    In,
    Out,
    Uniform,
}

/// A type qualifier as written in the source (`const int x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeQualifier {
    pub kind: QualifierKind,
    pub span: TextRange,
}

impl TypeQualifier {
    pub fn new(kind: QualifierKind, span: TextRange) -> Self {
        Self { kind, span }
    }

    /// Shorthand for a `const` qualifier.
    pub fn constant(span: TextRange) -> Self {
        Self::new(QualifierKind::Const, span)
    }

    pub fn is_const(&self) -> bool {
        self.kind == QualifierKind::Const
    }
}

impl fmt::Display for TypeQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            QualifierKind::Const => "const",
            QualifierKind::In => "in",
            QualifierKind::Out => "out",
            QualifierKind::Uniform => "uniform",
        };
        f.write_str(name)
    }
}

/// A declared or referenced name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: TextRange,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: TextRange) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
