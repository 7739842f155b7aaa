//! Document service
//!
//! Acquires document text, runs the tree builder with a collecting sink and
//! hands back the tree together with everything the builder reported.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Container, Diagnostic, DomainResult, Leaf, ParseOptions, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// A parsed document and the structural diagnostics found while parsing it.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Root container (the top-level wrapper block)
    pub root: Container,
    /// Diagnostics in the order they were reported
    pub diagnostics: Vec<Diagnostic>,
    /// File the text came from, if any
    pub source: Option<PathBuf>,
}

impl ParsedDocument {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Look up `Container/.../leaf` below the root.
    pub fn lookup(&self, path: &str) -> DomainResult<&Leaf> {
        self.root.resolve(path)
    }
}

/// Service for loading and parsing documents.
pub struct DocumentService {
    fs: Arc<dyn FileSystem>,
    builder: TreeBuilder,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(fs: Arc<dyn FileSystem>, options: ParseOptions) -> Self {
        Self {
            fs,
            builder: TreeBuilder::new(options),
        }
    }

    pub fn options(&self) -> &ParseOptions {
        self.builder.options()
    }

    /// Parse in-memory text.
    #[instrument(level = "debug", skip_all)]
    pub fn parse_str(&self, text: &str) -> ApplicationResult<ParsedDocument> {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let root = self.builder.parse(text, &mut diagnostics)?;

        for diagnostic in &diagnostics {
            debug!(block = %diagnostic.block, line = diagnostic.line, "{}", diagnostic.message);
        }
        debug!(
            "parse_str: root={} children={} diagnostics={}",
            root.name(),
            root.len(),
            diagnostics.len()
        );

        Ok(ParsedDocument {
            root,
            diagnostics,
            source: None,
        })
    }

    /// Read and parse a document file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<ParsedDocument> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::DocumentNotFound(path.to_path_buf()));
        }
        let text = self
            .fs
            .read_to_string(path)
            .with_path_context("read document", path)?;

        let mut parsed = self.parse_str(&text)?;
        parsed.source = Some(path.to_path_buf());
        Ok(parsed)
    }
}
