//! Bracket-structured tree builder
//!
//! Consumes the token stream and groups it into nested declaration nodes:
//! `{` and `(` open a node, `}`, `)` and `;` close one. Nodes live in a
//! [`NodeArena`] and refer to each other by [`NodeId`], so a node's `parent`
//! is a non-owning index consulted only for anonymous-name synthesis and
//! ancestor checks.
//!
//! The builder hands every completed node back to the caller through the
//! return value of [`TreeBuilder::offer`] — nested nodes at their closing
//! bracket, top-level leaves at their `;` — so classification happens
//! immediately, in source order.
//!
//! One non-obvious rule carried over from the declaration grammar: an open
//! bracket with no pending fragment re-opens the most recently built node.
//! That is how the parameter list of `void (*cb)(int)` attaches to the
//! `(*cb)` node after it has already been closed once.

use std::fmt;
use std::ops::{Index, IndexMut};

use super::lexer::Token;

/// Index of a node in its [`NodeArena`].
pub type NodeId = usize;

/// The bracket that opened a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enclosure {
    Brace,
    Paren,
}

impl Enclosure {
    pub fn open(self) -> char {
        match self {
            Enclosure::Brace => '{',
            Enclosure::Paren => '(',
        }
    }

    pub fn close(self) -> char {
        match self {
            Enclosure::Brace => '}',
            Enclosure::Paren => ')',
        }
    }
}

/// A child of a node: either a raw fragment group (comma-separated member,
/// parameter, enum value) or a nested node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Group(Vec<String>),
    Node(NodeId),
}

/// One syntactic unit delimited by an enclosure or terminated by `;`.
#[derive(Debug)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub parts: Vec<String>,
    pub children: Vec<Child>,
    pub enclosure: Option<Enclosure>,
}

/// Flat storage for all nodes of one parse.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, parent: Option<NodeId>, parts: Vec<String>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent,
            parts,
            children: Vec::new(),
            enclosure: None,
        });
        id
    }

    /// Renders a node back to bracketed text, for enum value expressions and
    /// diagnostics. With `include_parts` false only the bracketed body is
    /// rendered.
    pub fn flatten(&self, id: NodeId, include_parts: bool) -> String {
        let node = &self[id];
        let mut flat = if include_parts {
            let mut s = node.parts.join(" ");
            s.push(' ');
            s
        } else {
            String::new()
        };
        if let Some(enc) = node.enclosure {
            flat.push(enc.open());
        }
        for child in &node.children {
            match child {
                Child::Node(c) => {
                    flat.push(' ');
                    flat.push_str(&self.flatten(*c, true));
                    flat.push(' ');
                }
                Child::Group(g) => flat.push_str(&g.join(" ")),
            }
        }
        if let Some(enc) = node.enclosure {
            flat.push(enc.close());
        }
        flat
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }
}

/// Structural-input error: the token stream violated the tree invariant.
#[derive(Debug)]
pub struct TreeError {
    pub message: String,
}

impl TreeError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree builder: {}", self.message)
    }
}

impl std::error::Error for TreeError {}

/// Incremental tree builder over the token stream.
pub struct TreeBuilder {
    arena: NodeArena,
    current: Option<NodeId>,
    pending: Option<Vec<String>>,
    last_built: Option<NodeId>,
    last_was_close: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            current: None,
            pending: None,
            last_built: None,
            last_was_close: false,
        }
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    /// Feed one token. Returns a node ready for classification, if this
    /// token completed one.
    pub fn offer(&mut self, token: &Token) -> Result<Option<NodeId>, TreeError> {
        let result = self.step(token);
        self.last_was_close = matches!(token, Token::RBrace | Token::RParen);
        result
    }

    fn step(&mut self, token: &Token) -> Result<Option<NodeId>, TreeError> {
        match token {
            Token::Fragment(pieces) => {
                self.pending = Some(pieces.clone());
                Ok(None)
            }

            Token::LBrace | Token::LParen => {
                let enclosure = if matches!(token, Token::LBrace) {
                    Enclosure::Brace
                } else {
                    Enclosure::Paren
                };
                match self.pending.take() {
                    Some(parts) => {
                        let n = self.arena.alloc(self.current, parts);
                        self.arena[n].enclosure = Some(enclosure);
                        self.last_built = Some(n);
                        self.current = Some(n);
                    }
                    // No fragment to wrap: this bracket reattaches to the
                    // most recently built node (second parenthesis group of
                    // a function-pointer declarator).
                    None => match self.last_built {
                        Some(n) => self.current = Some(n),
                        None => {
                            return Err(TreeError::new(format!(
                                "'{}' with no declaration fragment before it",
                                enclosure.open()
                            )))
                        }
                    },
                }
                Ok(None)
            }

            Token::RBrace | Token::RParen | Token::Comma => {
                if let Some(parts) = self.pending.take() {
                    let current = self.current.ok_or_else(|| {
                        TreeError::new("fragment group outside any declaration")
                    })?;
                    self.arena[current].children.push(Child::Group(parts));
                }
                if matches!(token, Token::Comma) {
                    return Ok(None);
                }
                let current = self
                    .current
                    .ok_or_else(|| TreeError::new("close bracket with no open node"))?;
                if let Some(parent) = self.arena[current].parent {
                    let linked = self.arena[parent]
                        .children
                        .iter()
                        .any(|c| matches!(c, Child::Node(id) if *id == current));
                    if !linked {
                        self.arena[parent].children.push(Child::Node(current));
                    }
                }
                self.current = self.arena[current].parent;
                Ok(Some(current))
            }

            Token::Semicolon => {
                if let Some(parts) = self.pending.take() {
                    let n = self.arena.alloc(self.current, parts);
                    self.last_built = Some(n);
                    match self.current {
                        Some(current) => {
                            self.arena[current].children.push(Child::Node(n));
                            Ok(None)
                        }
                        None => Ok(Some(n)),
                    }
                } else if !self.last_was_close {
                    match self.current {
                        Some(current) => {
                            let done = if self.arena[current].parent.is_none() {
                                Some(current)
                            } else {
                                None
                            };
                            self.current = self.arena[current].parent;
                            Ok(done)
                        }
                        // Empty statement.
                        None => Ok(None),
                    }
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// End-of-input check: every opened node must have been closed.
    pub fn finish(&self) -> Result<(), TreeError> {
        match self.current {
            Some(id) => Err(TreeError::new(format!(
                "unclosed '{}' at end of input",
                self.arena[id]
                    .enclosure
                    .map(Enclosure::open)
                    .unwrap_or('{')
            ))),
            None => Ok(()),
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
