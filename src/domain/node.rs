//! Node model: leaves, containers and the lookups consumers rely on.

use std::fmt;
use std::str::FromStr;

use termtree::Tree;

use crate::domain::error::{DomainError, DomainResult, NodeKind};

/// Separator between path segments accepted by [`Container::resolve`].
pub const PATH_SEPARATOR: char = '/';

/// A single `name:value` data line.
///
/// Legacy documents may contain lines without a separator; those become
/// leaves with an empty name and the whole line as value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Leaf {
    name: String,
    value: String,
}

impl Leaf {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Leaf for a line that carried no usable name.
    pub fn nameless(value: impl Into<String>) -> Self {
        Self::new(String::new(), value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_nameless(&self) -> bool {
        self.name.is_empty()
    }

    /// Parse the raw value into `T`.
    ///
    /// The value is used verbatim; callers decide about trimming.
    pub fn parse<T>(&self) -> DomainResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.value
            .parse::<T>()
            .map_err(|e| DomainError::InvalidValue {
                name: self.name.clone(),
                value: self.value.clone(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nameless() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{}: {}", self.name, self.value)
        }
    }
}

/// Child of a container: either a data line or a nested block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Leaf(Leaf),
    Container(Container),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Leaf(leaf) => leaf.name(),
            Node::Container(container) => container.name(),
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Node::Leaf(_) => None,
            Node::Container(container) => Some(container),
        }
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Container> for Node {
    fn from(container: Container) -> Self {
        Node::Container(container)
    }
}

/// A named block owning its children in document order.
///
/// Duplicate names are kept; lookups return the first match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Container {
    name: String,
    children: Vec<Node>,
}

impl Container {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Build a container from already-constructed children.
    ///
    /// Mainly useful for comparing parse results against an expected shape.
    pub fn with_children(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub(crate) fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Direct leaf children in document order.
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.children.iter().filter_map(Node::as_leaf)
    }

    /// Direct container children in document order.
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.children.iter().filter_map(Node::as_container)
    }

    /// First direct leaf child named `name`.
    pub fn get_leaf(&self, name: &str) -> DomainResult<&Leaf> {
        self.leaves()
            .find(|leaf| leaf.name() == name)
            .ok_or_else(|| DomainError::not_found(NodeKind::Leaf, name, &self.name))
    }

    /// First direct container child named `name`.
    pub fn get_container(&self, name: &str) -> DomainResult<&Container> {
        self.containers()
            .find(|container| container.name() == name)
            .ok_or_else(|| DomainError::not_found(NodeKind::Container, name, &self.name))
    }

    /// Value of the first direct leaf named `name`.
    pub fn get_value(&self, name: &str) -> DomainResult<&str> {
        self.get_leaf(name).map(Leaf::value)
    }

    /// Every direct leaf named `name`, in document order.
    pub fn get_leaves<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Leaf> + 'a {
        self.leaves().filter(move |leaf| leaf.name() == name)
    }

    /// Follow `Container/.../leaf`, one direct-child lookup per segment.
    ///
    /// Every segment but the last names a container; the last names a leaf.
    pub fn resolve(&self, path: &str) -> DomainResult<&Leaf> {
        let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let leaf_name = segments.pop().unwrap_or_default();

        let mut current = self;
        for segment in segments {
            current = current.get_container(segment)?;
        }
        current.get_leaf(leaf_name)
    }

    /// Render the subtree for terminal display.
    pub fn to_tree(&self) -> Tree<String> {
        let leaves = self.children.iter().map(|child| match child {
            Node::Leaf(leaf) => Tree::new(leaf.to_string()),
            Node::Container(container) => container.to_tree(),
        });
        Tree::new(format!("[{}]", self.name)).with_leaves(leaves)
    }
}
