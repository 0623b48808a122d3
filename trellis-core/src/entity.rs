//! Entity instances and edge targets.

use crate::relation::RelationId;
use crate::template::TemplateId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Unique identifier for an entity instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create a new entity ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Target of an edge: another entity, or a literal string value.
///
/// Literal targets never participate in inverse synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Another entity in the same graph.
    Entity(EntityId),
    /// A literal string value.
    Literal(String),
}

impl Target {
    /// The entity ID, if this target is an entity.
    pub fn as_entity(&self) -> Option<&EntityId> {
        match self {
            Target::Entity(id) => Some(id),
            Target::Literal(_) => None,
        }
    }

    /// Whether this target is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(self, Target::Literal(_))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Entity(id) => write!(f, "{}", id),
            Target::Literal(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// An entity instance of exactly one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier; never changes.
    pub id: EntityId,

    /// The owning template.
    pub template: TemplateId,

    /// Mutable display name.
    pub name: String,

    /// Mutable version string; may be empty.
    pub version: String,

    /// Mutable description; may be empty.
    pub description: String,

    /// Outgoing edges, keyed by relation. A bucket is never left empty:
    /// removing the last target removes the bucket.
    pub edges: HashMap<RelationId, HashSet<Target>>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, template: TemplateId, name: impl Into<String>) -> Self {
        Self {
            id,
            template,
            name: name.into(),
            version: String::new(),
            description: String::new(),
            edges: HashMap::new(),
        }
    }

    /// Whether the edge `(self, relation, target)` exists.
    pub fn has_edge(&self, relation: &RelationId, target: &Target) -> bool {
        self.edges
            .get(relation)
            .is_some_and(|bucket| bucket.contains(target))
    }

    /// Targets of a relation bucket, if present.
    pub fn targets(&self, relation: &RelationId) -> Option<&HashSet<Target>> {
        self.edges.get(relation)
    }

    /// Total number of outgoing edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|bucket| bucket.len()).sum()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
