//! Templates and the inheritance registry.
//!
//! Templates are the reusable type descriptors of a domain model. They form a
//! multi-parent inheritance DAG, kept in an arena keyed by [`TemplateId`] with
//! explicit parent/child id-sets mirrored on both ends.

use crate::error::{Error, Result};
use crate::vocabulary::sanitize_name;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Unique identifier for a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

impl TemplateId {
    /// Create a new template ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A template (type node) in the inheritance hierarchy.
///
/// Immutable vocabulary object once registered, apart from the mirrored
/// parent/child sets maintained by [`TemplateRegistry::add_parent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier (the sanitized name).
    pub id: TemplateId,

    /// Human-readable name as declared.
    pub name: String,

    /// Description text; may be empty.
    pub description: String,

    /// Direct parents. `B ∈ A.parents ⇔ A ∈ B.children`.
    pub parents: HashSet<TemplateId>,

    /// Direct children, mirror of `parents`.
    pub children: HashSet<TemplateId>,
}

/// Registry of templates and their multi-parent inheritance DAG.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateRegistry {
    templates: HashMap<TemplateId, Template>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Whether a template is registered.
    pub fn contains(&self, id: &TemplateId) -> bool {
        self.templates.contains_key(id)
    }

    /// Get a template by ID.
    pub fn get(&self, id: &TemplateId) -> Option<&Template> {
        self.templates.get(id)
    }

    /// Iterate over all templates.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Register a new template.
    ///
    /// The ID is the sanitized name; registration fails with
    /// [`Error::DuplicateTemplate`] if it collides with an existing one.
    /// All parents must already be registered.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        parents: &[TemplateId],
    ) -> Result<TemplateId> {
        let id = TemplateId::new(sanitize_name(name));
        if self.templates.contains_key(&id) {
            return Err(Error::DuplicateTemplate(id.0));
        }
        for parent in parents {
            if !self.templates.contains_key(parent) {
                return Err(Error::UnknownTemplate(parent.clone()));
            }
        }

        self.templates.insert(
            id.clone(),
            Template {
                id: id.clone(),
                name: name.trim().to_string(),
                description: description.to_string(),
                parents: parents.iter().cloned().collect(),
                children: HashSet::new(),
            },
        );
        for parent in parents {
            if let Some(node) = self.templates.get_mut(parent) {
                node.children.insert(id.clone());
            }
        }

        tracing::debug!(template = %id, parents = parents.len(), "registered template");
        Ok(id)
    }

    /// Link `parent` as a direct parent of `child`, mirroring both sets.
    ///
    /// Rejects links that would make a template its own ancestor with
    /// [`Error::HierarchyCycle`].
    pub fn add_parent(&mut self, child: &TemplateId, parent: &TemplateId) -> Result<()> {
        if !self.templates.contains_key(child) {
            return Err(Error::UnknownTemplate(child.clone()));
        }
        if child == parent || self.ancestors(parent)?.contains(child) {
            return Err(Error::HierarchyCycle {
                child: child.clone(),
                parent: parent.clone(),
            });
        }

        if let Some(node) = self.templates.get_mut(child) {
            node.parents.insert(parent.clone());
        }
        if let Some(node) = self.templates.get_mut(parent) {
            node.children.insert(child.clone());
        }
        Ok(())
    }

    /// Transitive closure over parent edges, excluding the template itself.
    ///
    /// Visited-set BFS; terminates on diamond inheritance.
    pub fn ancestors(&self, id: &TemplateId) -> Result<HashSet<TemplateId>> {
        self.closure(id, |t| &t.parents)
    }

    /// Transitive closure over child edges, excluding the template itself.
    pub fn descendants(&self, id: &TemplateId) -> Result<HashSet<TemplateId>> {
        self.closure(id, |t| &t.children)
    }

    fn closure<F>(&self, start: &TemplateId, next: F) -> Result<HashSet<TemplateId>>
    where
        F: Fn(&Template) -> &HashSet<TemplateId>,
    {
        let first = self
            .templates
            .get(start)
            .ok_or_else(|| Error::UnknownTemplate(start.clone()))?;

        let mut visited: HashSet<TemplateId> = HashSet::new();
        let mut queue: VecDeque<TemplateId> = next(first).iter().cloned().collect();
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(node) = self.templates.get(&id) {
                for step in next(node) {
                    if !visited.contains(step) {
                        queue.push_back(step.clone());
                    }
                }
            }
        }
        Ok(visited)
    }
}
