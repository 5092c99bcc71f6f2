//! Skip-and-continue diagnostics
//!
//! Every declaration shape the pipeline cannot handle is recorded here and
//! the offending declaration is dropped; a diagnostic never aborts a run.
//! The CLI prints the collected entries to stderr after generation.

use std::fmt;

/// One reported-and-skipped condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A struct member whose shape matched none of the supported patterns.
    UnsupportedMember { strukt: String, member: String },

    /// A completed tree node that fit none of the declaration kinds.
    UnrecognizedNode { detail: String },

    /// `typedef foo;` with no definition to alias.
    TypedefForward { detail: String },

    /// A pending `typedef struct {...}` whose inner declaration could not be
    /// classified; the typedef is dropped.
    TypedefUnresolved { detail: String },

    /// Variadic prototypes cannot be forwarded; no wrapper is generated.
    VariadicFunction { name: String },

    /// The function matched `ignore-functions-regexp`.
    IgnoredFunction { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedMember { strukt, member } => {
                write!(f, "unsupported member in struct {}: {}", strukt, member)
            }
            Diagnostic::UnrecognizedNode { detail } => {
                write!(f, "don't know what to do with: {}", detail)
            }
            Diagnostic::TypedefForward { detail } => {
                write!(f, "ignoring typedef forward declaration: {}", detail)
            }
            Diagnostic::TypedefUnresolved { detail } => {
                write!(f, "typedef wraps an unclassifiable declaration: {}", detail)
            }
            Diagnostic::VariadicFunction { name } => {
                write!(f, "ignored: {}() cannot handle variable arguments", name)
            }
            Diagnostic::IgnoredFunction { name } => {
                write!(f, "ignoring {} as requested", name)
            }
        }
    }
}

/// Ordered collection of diagnostics for one generation run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diag: Diagnostic) {
        self.entries.push(diag);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if any entry matches the given predicate; convenient in tests.
    pub fn any(&self, pred: impl Fn(&Diagnostic) -> bool) -> bool {
        self.entries.iter().any(pred)
    }
}
