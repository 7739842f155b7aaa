//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

/// Which kind of child a lookup asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Container,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf => write!(f, "leaf"),
            NodeKind::Container => write!(f, "container"),
        }
    }
}

/// Domain errors: document framing and tree lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("not a valid document: first line {first_line:?} is not the expected start marker")]
    NotAValidDocument { first_line: String },

    #[error("{kind} {name:?} not found in {parent:?}")]
    NotFound {
        kind: NodeKind,
        name: String,
        parent: String,
    },

    #[error("invalid value for {name:?}: {value:?} ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

impl DomainError {
    pub(crate) fn not_found(kind: NodeKind, name: &str, parent: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
            parent: parent.to_string(),
        }
    }

    /// True for lookup misses, which callers commonly treat as optional data.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
