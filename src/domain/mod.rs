//! Domain layer: document model and the tree builder
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod diagnostics;
pub mod error;
pub mod marker;
pub mod node;

pub use builder::{
    parse_document, split_leaf, ClosingMode, ParseOptions, TreeBuilder, DEFAULT_ROOT_NAME,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, NullSink, Severity, TracingSink};
pub use error::{DomainError, DomainResult, NodeKind};
pub use marker::{closes, is_block_end, is_block_start, marker_name};
pub use node::{Container, Leaf, Node};
