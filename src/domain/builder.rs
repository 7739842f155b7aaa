//! Recursive-descent tree builder for marker-delimited documents.
//!
//! ```text
//! ===PHOSYS Start===
//! name:Testlang
//! ===Meta Start===
//! id:12345
//! ===Meta End===
//! ===PHOSYS End===
//! ```
//!
//! Every nested start marker opens a container that runs until the first
//! downstream end marker carrying the same name. The top-level block ends at
//! the first end marker for its name seen at its own level. Lines with exactly one `:` become named
//! leaves, other non-empty lines become nameless leaves, blank lines vanish.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::diagnostics::{Diagnostic, DiagnosticSink};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::marker::{closes, is_block_start, marker_name, opens};
use crate::domain::node::{Container, Leaf};

/// Separator between a leaf's name and its value.
pub const LEAF_SEPARATOR: char = ':';

/// Name of the wrapper block the reference tooling writes.
pub const DEFAULT_ROOT_NAME: &str = "PHOSYS";

/// How a start marker finds its end marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosingMode {
    /// First downstream end marker with the same name, ignoring nesting.
    ///
    /// An inner block reusing its parent's name therefore closes the parent.
    /// Legacy documents depend on this.
    #[default]
    FirstMatch,
    /// Same-named start markers are counted, so equal names nest properly.
    Nested,
}

/// Knobs for a single parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// When set, the first line must open exactly this block.
    pub root_name: Option<String>,
    pub closing: ClosingMode,
}

impl ParseOptions {
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    pub fn with_closing(mut self, closing: ClosingMode) -> Self {
        self.closing = closing;
        self
    }
}

/// Split a named leaf line into `(name, value)`.
///
/// Only lines with exactly one separator qualify; values containing `:`
/// therefore degrade to nameless leaves.
pub fn split_leaf(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(LEAF_SEPARATOR)?;
    if value.contains(LEAF_SEPARATOR) {
        return None;
    }
    Some((name, value))
}

/// Parse with default options, reporting structural problems to `sink`.
pub fn parse_document(text: &str, sink: &mut dyn DiagnosticSink) -> DomainResult<Container> {
    TreeBuilder::default().parse(text, sink)
}

/// Builds a [`Container`] tree from document text.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    options: ParseOptions,
}

impl TreeBuilder {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a whole document.
    ///
    /// Fails only if the first line is not an acceptable start marker.
    /// Unclosed blocks are reported to `sink` and left out of the tree.
    /// The root ends at the first line of its own level closing it; a root
    /// closer swallowed by a nested block does not end the root.
    #[instrument(level = "debug", skip_all, fields(bytes = text.len()))]
    pub fn parse(&self, text: &str, sink: &mut dyn DiagnosticSink) -> DomainResult<Container> {
        let normalized = text.replace('\t', "");
        let lines: Vec<&str> = normalized.lines().collect();

        let first_line = lines.first().copied().unwrap_or_default();
        let root_name = self.check_root(first_line)?;
        debug!("parse: root={} lines={}", root_name, lines.len());

        if self.find_closer(&lines, 0, root_name).is_none() {
            sink.report(Diagnostic::unclosed_block(root_name, 1));
        }

        let mut root = Container::new(root_name);
        if let Some(end) = self.fill_block(&mut root, &lines, 0, Some(root_name), sink) {
            self.check_trailing(&lines, end + 1, root_name, sink);
        }
        Ok(root)
    }

    fn check_root<'l>(&self, first_line: &'l str) -> DomainResult<&'l str> {
        let accepted = match (&self.options.root_name, marker_name(first_line)) {
            (Some(expected), Some(_)) => opens(first_line, expected),
            (None, Some(_)) => is_block_start(first_line),
            (_, None) => false,
        };
        match marker_name(first_line) {
            Some(name) if accepted => Ok(name),
            _ => Err(DomainError::NotAValidDocument {
                first_line: first_line.to_string(),
            }),
        }
    }

    fn check_trailing(
        &self,
        lines: &[&str],
        from: usize,
        root_name: &str,
        sink: &mut dyn DiagnosticSink,
    ) {
        let trailing = lines
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, line)| !line.is_empty());
        if let Some((index, _)) = trailing {
            sink.report(Diagnostic::trailing_content(root_name, index + 1));
        }
    }

    /// Build the container opened by `lines[0]`.
    ///
    /// `offset` is the document index of `lines[0]`, used for line numbers.
    fn build_block(&self, lines: &[&str], offset: usize, sink: &mut dyn DiagnosticSink) -> Container {
        let name = lines
            .first()
            .and_then(|line| marker_name(line))
            .unwrap_or_default();
        let mut container = Container::new(name);
        self.fill_block(&mut container, lines, offset, None, sink);
        container
    }

    /// Add the children found in `lines[1..]` to `container`.
    ///
    /// With `closer` set, scanning stops at the first line of this level
    /// closing that name and its index is returned.
    fn fill_block(
        &self,
        container: &mut Container,
        lines: &[&str],
        offset: usize,
        closer: Option<&str>,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<usize> {
        let mut i = 1;
        while i < lines.len() {
            let line = lines[i];
            if closer.is_some_and(|name| closes(line, name)) {
                return Some(i);
            }
            if is_block_start(line) {
                match self.extract_block(lines, i, offset, sink) {
                    Some((child, next)) => {
                        container.push(child);
                        i = next;
                    }
                    None => i += 1,
                }
                continue;
            }

            if let Some((key, value)) = split_leaf(line) {
                trace!("leaf {}:{}", key, value);
                container.push(Leaf::new(key, value));
            } else if !line.is_empty() {
                trace!("nameless leaf {:?}", line);
                container.push(Leaf::nameless(line));
            }
            i += 1;
        }
        None
    }

    /// Build the nested block starting at `lines[start]`.
    ///
    /// Returns the child and the index just past its end marker, or `None`
    /// after reporting an unclosed block.
    fn extract_block(
        &self,
        lines: &[&str],
        start: usize,
        offset: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<(Container, usize)> {
        let name = marker_name(lines[start])?;
        match self.find_closer(lines, start, name) {
            Some(end) => {
                trace!("block {} spans lines {}..={}", name, offset + start + 1, offset + end + 1);
                let child = self.build_block(&lines[start..end], offset + start, sink);
                Some((child, end + 1))
            }
            None => {
                debug!("block {} on line {} is not closed", name, offset + start + 1);
                sink.report(Diagnostic::unclosed_block(name, offset + start + 1));
                None
            }
        }
    }

    /// Index of the end marker for the block `name` opened at `lines[start]`.
    fn find_closer(&self, lines: &[&str], start: usize, name: &str) -> Option<usize> {
        let following = lines.iter().enumerate().skip(start + 1);
        match self.options.closing {
            ClosingMode::FirstMatch => following
                .filter(|(_, line)| closes(line, name))
                .map(|(index, _)| index)
                .next(),
            ClosingMode::Nested => {
                let mut depth = 0usize;
                for (index, line) in following {
                    if opens(line, name) {
                        depth += 1;
                    } else if closes(line, name) {
                        if depth == 0 {
                            return Some(index);
                        }
                        depth -= 1;
                    }
                }
                None
            }
        }
    }
}
