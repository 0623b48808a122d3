//! Relations and the relation catalog.
//!
//! A relation is a typed predicate connecting an entity to another entity or
//! to a literal value. Domain and range are template sets with asymmetric
//! closure semantics: range members are expanded with their descendant
//! closure when added (a snapshot, not a live view), while domain members are
//! stored verbatim and subtype applicability is computed at query time via
//! the ancestor closure.

use crate::error::{Error, Result};
use crate::template::{TemplateId, TemplateRegistry};
use crate::vocabulary::sanitize_name;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Unique identifier for a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationId(pub String);

impl RelationId {
    /// Create a new relation ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RelationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A relation definition in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Unique identifier (the sanitized name).
    pub id: RelationId,

    /// Human-readable name as declared.
    pub name: String,

    /// Description text; may be empty.
    pub description: String,

    /// Templates whose instances may issue this relation as subject.
    /// Stored exactly as given; subtypes apply via the ancestor closure.
    pub domain: HashSet<TemplateId>,

    /// Templates whose instances may be targets. Descendant-closed at the
    /// time each member was added.
    pub range: HashSet<TemplateId>,

    /// Inverse relation, linked symmetrically.
    pub inverse: Option<RelationId>,

    /// Super-relation, if any.
    pub super_relation: Option<RelationId>,
}

/// Catalog of relation definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationRegistry {
    relations: HashMap<RelationId, Relation>,
}

impl RelationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of defined relations.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Whether a relation is defined.
    pub fn contains(&self, id: &RelationId) -> bool {
        self.relations.contains_key(id)
    }

    /// Get a relation by ID.
    pub fn get(&self, id: &RelationId) -> Option<&Relation> {
        self.relations.get(id)
    }

    /// Iterate over all relations.
    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    /// Define a new relation.
    ///
    /// Range members are expanded with their full descendant closure computed
    /// right now. If `inverse` is given it must already be defined, and the
    /// link is written on both sides in this call.
    #[allow(clippy::too_many_arguments)]
    pub fn define(
        &mut self,
        templates: &TemplateRegistry,
        name: &str,
        description: &str,
        domain: &[TemplateId],
        range: &[TemplateId],
        inverse: Option<&RelationId>,
        super_relation: Option<&RelationId>,
    ) -> Result<RelationId> {
        let id = RelationId::new(sanitize_name(name));
        if self.relations.contains_key(&id) {
            return Err(Error::DuplicateRelation(id.0));
        }
        for t in domain.iter().chain(range.iter()) {
            if !templates.contains(t) {
                return Err(Error::UnknownTemplate(t.clone()));
            }
        }
        if let Some(inv) = inverse {
            if !self.relations.contains_key(inv) {
                return Err(Error::UnknownRelation(inv.clone()));
            }
        }
        if let Some(sup) = super_relation {
            if !self.relations.contains_key(sup) {
                return Err(Error::UnknownRelation(sup.clone()));
            }
        }

        let mut closed_range = HashSet::new();
        for t in range {
            closed_range.insert(t.clone());
            closed_range.extend(templates.descendants(t)?);
        }

        self.relations.insert(
            id.clone(),
            Relation {
                id: id.clone(),
                name: name.trim().to_string(),
                description: description.to_string(),
                domain: domain.iter().cloned().collect(),
                range: closed_range,
                inverse: None,
                super_relation: super_relation.cloned(),
            },
        );
        if let Some(inv) = inverse {
            self.set_inverse(&id, inv)?;
        }

        tracing::debug!(relation = %id, "defined relation");
        Ok(id)
    }

    /// Add a template to a relation's domain.
    ///
    /// Only the exact template is stored; instances of its subtypes become
    /// eligible through the ancestor closure in [`applicable_relations`].
    ///
    /// [`applicable_relations`]: RelationRegistry::applicable_relations
    pub fn add_domain(
        &mut self,
        templates: &TemplateRegistry,
        relation: &RelationId,
        template: &TemplateId,
    ) -> Result<()> {
        if !templates.contains(template) {
            return Err(Error::UnknownTemplate(template.clone()));
        }
        let rel = self
            .relations
            .get_mut(relation)
            .ok_or_else(|| Error::UnknownRelation(relation.clone()))?;
        rel.domain.insert(template.clone());
        Ok(())
    }

    /// Add a template and its full descendant closure to a relation's range.
    ///
    /// The closure is a snapshot taken now; templates that become descendants
    /// of `template` later are not retroactively included.
    pub fn add_range(
        &mut self,
        templates: &TemplateRegistry,
        relation: &RelationId,
        template: &TemplateId,
    ) -> Result<()> {
        let closure = templates.descendants(template)?;
        let rel = self
            .relations
            .get_mut(relation)
            .ok_or_else(|| Error::UnknownRelation(relation.clone()))?;
        rel.range.insert(template.clone());
        rel.range.extend(closure);
        Ok(())
    }

    /// Link two relations as inverses of each other.
    ///
    /// A single symmetric write: `a.inverse = b` and `b.inverse = a`.
    /// Re-linking later silently overwrites both sides.
    pub fn set_inverse(&mut self, a: &RelationId, b: &RelationId) -> Result<()> {
        if !self.relations.contains_key(a) {
            return Err(Error::UnknownRelation(a.clone()));
        }
        if !self.relations.contains_key(b) {
            return Err(Error::UnknownRelation(b.clone()));
        }
        if let Some(rel) = self.relations.get_mut(a) {
            rel.inverse = Some(b.clone());
        }
        if let Some(rel) = self.relations.get_mut(b) {
            rel.inverse = Some(a.clone());
        }
        Ok(())
    }

    /// Set a relation's super-relation.
    pub fn set_super_relation(&mut self, relation: &RelationId, sup: &RelationId) -> Result<()> {
        if !self.relations.contains_key(sup) {
            return Err(Error::UnknownRelation(sup.clone()));
        }
        let rel = self
            .relations
            .get_mut(relation)
            .ok_or_else(|| Error::UnknownRelation(relation.clone()))?;
        rel.super_relation = Some(sup.clone());
        Ok(())
    }

    /// All relations whose domain intersects `{template} ∪ ancestors(template)`.
    pub fn applicable_relations(
        &self,
        templates: &TemplateRegistry,
        template: &TemplateId,
    ) -> Result<HashSet<RelationId>> {
        let mut pool = templates.ancestors(template)?;
        pool.insert(template.clone());

        Ok(self
            .relations
            .values()
            .filter(|rel| rel.domain.iter().any(|t| pool.contains(t)))
            .map(|rel| rel.id.clone())
            .collect())
    }
}
