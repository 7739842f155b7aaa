//! phosys: reader for marker-delimited hierarchical text documents.
//!
//! A document is a tree of named blocks framed by `===Name Start===` and
//! `===Name End===` lines. Everything between the markers is either a nested
//! block or a `name:value` leaf.
//!
//! ```
//! use phosys::parse_document;
//!
//! let text = "===PHOSYS Start===\n===Meta Start===\nid:12345\n===Meta End===\n===PHOSYS End===\n";
//! let mut diagnostics: Vec<phosys::Diagnostic> = Vec::new();
//! let root = parse_document(text, &mut diagnostics).unwrap();
//!
//! let meta = root.get_container("Meta").unwrap();
//! assert_eq!(meta.get_leaf("id").unwrap().value(), "12345");
//! assert!(diagnostics.is_empty());
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    parse_document, ClosingMode, Container, Diagnostic, DiagnosticKind, DiagnosticSink,
    DomainError, DomainResult, Leaf, Node, NodeKind, ParseOptions, Severity, TreeBuilder,
};
