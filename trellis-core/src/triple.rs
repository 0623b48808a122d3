//! Triple types for the exported document.
//!
//! A triple represents a (subject, predicate, object) statement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An IRI (resolved, absolute).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Iri(pub String);

impl Iri {
    /// Create a new IRI.
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    /// Get the IRI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Iri {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Object position of a triple: an IRI or a literal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// A resolved IRI.
    Iri(Iri),
    /// A literal string value.
    Literal(String),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "{}", iri),
            Term::Literal(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A (subject, predicate, object) triple.
///
/// `Eq + Hash` so a flattened graph can be compared as a set; the order
/// triples come out of [`crate::Materializer::flatten`] is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject IRI.
    pub subject: Iri,

    /// Predicate IRI.
    pub predicate: Iri,

    /// Object term.
    pub object: Term,
}

impl Triple {
    /// Create a new triple.
    pub fn new(subject: impl Into<Iri>, predicate: impl Into<Iri>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}
