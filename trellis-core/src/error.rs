use crate::{EntityId, RelationId, TemplateId};
use thiserror::Error;

/// Errors that can occur in trellis-core.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A template with the same sanitized name is already registered.
    #[error("Duplicate template name: {0}")]
    DuplicateTemplate(String),
    /// A relation with the same sanitized name is already registered.
    #[error("Duplicate relation name: {0}")]
    DuplicateRelation(String),
    /// Reference to an unregistered template.
    #[error("Template not found: {0}")]
    UnknownTemplate(TemplateId),
    /// Reference to an unregistered relation.
    #[error("Relation not found: {0}")]
    UnknownRelation(RelationId),
    /// Reference to an entity that is not in the graph.
    #[error("Entity not found: {0}")]
    UnknownEntity(EntityId),
    /// Reference to a sub-model that is not declared or not imported.
    #[error("Model not found: {0}")]
    UnknownModel(String),
    /// An edge rejected by the advisory domain/range check.
    #[error("Edge not allowed: {0}")]
    InvalidEdge(String),
    /// A parent link that would make a template its own ancestor.
    #[error("Hierarchy cycle: {child} cannot take {parent} as a parent")]
    HierarchyCycle {
        child: TemplateId,
        parent: TemplateId,
    },
}

/// Result type alias for trellis-core.
pub type Result<T> = std::result::Result<T, Error>;
