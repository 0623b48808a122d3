//! The entity/edge graph.
//!
//! Entities and their outgoing edges for one document. Every mutation either
//! fully completes (including inverse-edge synchronization) or reports an
//! error without committing partial state: all id validation happens before
//! the first write.

use crate::entity::{Entity, EntityId, Target};
use crate::error::{Error, Result};
use crate::relation::{RelationId, RelationRegistry};
use crate::template::{TemplateId, TemplateRegistry};
use crate::vocabulary::sanitize_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entity instances and their edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityGraph {
    entities: HashMap<EntityId, Entity>,
    serial: u64,
}

impl EntityGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Total number of edges across all entities.
    pub fn edge_count(&self) -> usize {
        self.entities.values().map(Entity::edge_count).sum()
    }

    /// Whether the graph holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether an entity exists.
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Get an entity by ID.
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Iterate over all entities.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Create a new entity instance of `template`.
    ///
    /// The ID is derived from the sanitized name plus a serial, so renaming
    /// an entity later never changes its identity.
    pub fn create_entity(
        &mut self,
        templates: &TemplateRegistry,
        template: &TemplateId,
        name: &str,
    ) -> Result<EntityId> {
        if !templates.contains(template) {
            return Err(Error::UnknownTemplate(template.clone()));
        }

        self.serial += 1;
        let id = EntityId::new(format!("{}_{}", sanitize_name(name), self.serial));
        self.entities
            .insert(id.clone(), Entity::new(id.clone(), template.clone(), name.trim()));

        tracing::debug!(entity = %id, template = %template, "created entity");
        Ok(id)
    }

    /// Update an entity's metadata in place. Identity never changes.
    pub fn update_entity(
        &mut self,
        id: &EntityId,
        name: &str,
        version: &str,
        description: &str,
    ) -> Result<()> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| Error::UnknownEntity(id.clone()))?;
        entity.name = name.trim().to_string();
        entity.version = version.to_string();
        entity.description = description.to_string();
        Ok(())
    }

    /// Whether the edge `(source, relation, target)` exists.
    pub fn has_edge(&self, source: &EntityId, relation: &RelationId, target: &Target) -> bool {
        self.entities
            .get(source)
            .is_some_and(|e| e.has_edge(relation, target))
    }

    /// Add an edge, keeping the inverse edge in sync.
    ///
    /// Idempotent: if the edge already exists this is a no-op. When the
    /// relation has an inverse and the target is an entity, the mirrored
    /// edge `(target, inverse, source)` is inserted as well unless it is
    /// already present; the existence check bounds the mutual recursion to a
    /// single inverse insertion. Literal targets skip inverse bookkeeping
    /// entirely.
    pub fn add_edge(
        &mut self,
        relations: &RelationRegistry,
        source: &EntityId,
        relation: &RelationId,
        target: &Target,
    ) -> Result<()> {
        let rel = relations
            .get(relation)
            .ok_or_else(|| Error::UnknownRelation(relation.clone()))?;
        if !self.entities.contains_key(source) {
            return Err(Error::UnknownEntity(source.clone()));
        }
        if let Some(entity_target) = target.as_entity() {
            if !self.entities.contains_key(entity_target) {
                return Err(Error::UnknownEntity(entity_target.clone()));
            }
        }

        if self.has_edge(source, relation, target) {
            return Ok(());
        }
        self.insert_edge(source, relation, target.clone());

        if let (Some(inverse), Some(entity_target)) = (&rel.inverse, target.as_entity()) {
            let mirrored = Target::Entity(source.clone());
            if !self.has_edge(entity_target, inverse, &mirrored) {
                self.insert_edge(entity_target, inverse, mirrored);
            }
        }

        tracing::debug!(source = %source, relation = %relation, target = %target, "added edge");
        Ok(())
    }

    /// Remove an edge, cleaning up the inverse edge and empty buckets.
    ///
    /// The mirrored edge removal is a defensive no-op when it is already
    /// gone, as is removing an edge that does not exist.
    pub fn remove_edge(
        &mut self,
        relations: &RelationRegistry,
        source: &EntityId,
        relation: &RelationId,
        target: &Target,
    ) -> Result<()> {
        let rel = relations
            .get(relation)
            .ok_or_else(|| Error::UnknownRelation(relation.clone()))?;
        if !self.entities.contains_key(source) {
            return Err(Error::UnknownEntity(source.clone()));
        }

        self.delete_edge(source, relation, target);

        if let (Some(inverse), Some(entity_target)) = (&rel.inverse, target.as_entity()) {
            self.delete_edge(entity_target, inverse, &Target::Entity(source.clone()));
        }

        tracing::debug!(source = %source, relation = %relation, target = %target, "removed edge");
        Ok(())
    }

    /// Destroy an entity.
    ///
    /// Outgoing edges are torn down through [`remove_edge`] semantics so
    /// inverse bookkeeping stays consistent, then any remaining inbound
    /// references from other entities are scrubbed (their buckets are
    /// dropped when they empty).
    ///
    /// [`remove_edge`]: EntityGraph::remove_edge
    pub fn remove_entity(&mut self, relations: &RelationRegistry, id: &EntityId) -> Result<()> {
        if !self.entities.contains_key(id) {
            return Err(Error::UnknownEntity(id.clone()));
        }

        let outgoing: Vec<(RelationId, Target)> = self.entities[id]
            .edges
            .iter()
            .flat_map(|(rel, bucket)| bucket.iter().map(|t| (rel.clone(), t.clone())))
            .collect();
        for (rel, target) in outgoing {
            self.remove_edge(relations, id, &rel, &target)?;
        }
        self.entities.remove(id);

        // Inbound edges over relations without an inverse are not reachable
        // from the removed entity's buckets; scrub them directly.
        let gone = Target::Entity(id.clone());
        for entity in self.entities.values_mut() {
            entity.edges.retain(|_, bucket| {
                bucket.remove(&gone);
                !bucket.is_empty()
            });
        }

        tracing::debug!(entity = %id, "removed entity");
        Ok(())
    }

    /// Advisory domain/range check for a prospective edge.
    ///
    /// Returns [`Error::InvalidEdge`] when the source template closure misses
    /// the relation's domain, or an entity target's template is outside the
    /// (descendant-closed) range. Literal targets only undergo the domain
    /// check. `add_edge` itself never enforces this; callers that want
    /// pre-filtering run it first.
    pub fn check_edge(
        &self,
        templates: &TemplateRegistry,
        relations: &RelationRegistry,
        source: &EntityId,
        relation: &RelationId,
        target: &Target,
    ) -> Result<()> {
        let rel = relations
            .get(relation)
            .ok_or_else(|| Error::UnknownRelation(relation.clone()))?;
        let source_entity = self
            .entities
            .get(source)
            .ok_or_else(|| Error::UnknownEntity(source.clone()))?;

        let mut pool = templates.ancestors(&source_entity.template)?;
        pool.insert(source_entity.template.clone());
        if !rel.domain.iter().any(|t| pool.contains(t)) {
            return Err(Error::InvalidEdge(format!(
                "{} is not in the domain of {}",
                source_entity.template, relation
            )));
        }

        if let Some(entity_target) = target.as_entity() {
            let target_entity = self
                .entities
                .get(entity_target)
                .ok_or_else(|| Error::UnknownEntity(entity_target.clone()))?;
            if !rel.range.contains(&target_entity.template) {
                return Err(Error::InvalidEdge(format!(
                    "{} is not in the range of {}",
                    target_entity.template, relation
                )));
            }
        }
        Ok(())
    }

    fn insert_edge(&mut self, source: &EntityId, relation: &RelationId, target: Target) {
        if let Some(entity) = self.entities.get_mut(source) {
            entity.edges.entry(relation.clone()).or_default().insert(target);
        }
    }

    fn delete_edge(&mut self, source: &EntityId, relation: &RelationId, target: &Target) {
        if let Some(entity) = self.entities.get_mut(source) {
            if let Some(bucket) = entity.edges.get_mut(relation) {
                bucket.remove(target);
                if bucket.is_empty() {
                    entity.edges.remove(relation);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        templates: TemplateRegistry,
        relations: RelationRegistry,
        graph: EntityGraph,
        enforced: RelationId,
        implements: RelationId,
        has_link: RelationId,
        p1: EntityId,
        pr1: EntityId,
    }

    fn fixture() -> Fixture {
        let mut templates = TemplateRegistry::new();
        let policy = templates.register("Policy", "", &[]).unwrap();
        let process = templates.register("Process", "", &[]).unwrap();

        let mut relations = RelationRegistry::new();
        let enforced = relations
            .define(&templates, "isEnforcedBy", "", &[policy.clone()], &[process.clone()], None, None)
            .unwrap();
        let implements = relations
            .define(
                &templates,
                "isImplementationOf",
                "",
                &[process.clone()],
                &[policy.clone()],
                Some(&enforced),
                None,
            )
            .unwrap();
        let has_link = relations
            .define(&templates, "hasLink", "", &[policy.clone()], &[], None, None)
            .unwrap();

        let mut graph = EntityGraph::new();
        let p1 = graph.create_entity(&templates, &policy, "p1").unwrap();
        let pr1 = graph.create_entity(&templates, &process, "pr1").unwrap();

        Fixture {
            templates,
            relations,
            graph,
            enforced,
            implements,
            has_link,
            p1,
            pr1,
        }
    }

    #[test]
    fn test_create_entity_unknown_template() {
        let mut f = fixture();
        let err = f
            .graph
            .create_entity(&f.templates, &TemplateId::new("Ghost"), "x")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTemplate(_)));
    }

    #[test]
    fn test_add_edge_syncs_inverse() {
        let mut f = fixture();
        f.graph
            .add_edge(&f.relations, &f.p1, &f.enforced, &Target::Entity(f.pr1.clone()))
            .unwrap();

        assert!(f.graph.has_edge(&f.p1, &f.enforced, &Target::Entity(f.pr1.clone())));
        assert!(f.graph.has_edge(&f.pr1, &f.implements, &Target::Entity(f.p1.clone())));
    }

    #[test]
    fn test_add_edge_idempotent() {
        let mut f = fixture();
        let target = Target::Entity(f.pr1.clone());
        f.graph.add_edge(&f.relations, &f.p1, &f.enforced, &target).unwrap();
        f.graph.add_edge(&f.relations, &f.p1, &f.enforced, &target).unwrap();

        assert_eq!(f.graph.get(&f.p1).unwrap().targets(&f.enforced).unwrap().len(), 1);
        assert_eq!(f.graph.edge_count(), 2); // forward + inverse, once each
    }

    #[test]
    fn test_remove_edge_removes_both_directions() {
        let mut f = fixture();
        let target = Target::Entity(f.pr1.clone());
        f.graph.add_edge(&f.relations, &f.p1, &f.enforced, &target).unwrap();
        f.graph.remove_edge(&f.relations, &f.p1, &f.enforced, &target).unwrap();

        assert!(!f.graph.has_edge(&f.p1, &f.enforced, &target));
        assert!(!f.graph.has_edge(&f.pr1, &f.implements, &Target::Entity(f.p1.clone())));
        // Invariant 4: empty buckets are gone.
        assert!(f.graph.get(&f.p1).unwrap().edges.is_empty());
        assert!(f.graph.get(&f.pr1).unwrap().edges.is_empty());
    }

    #[test]
    fn test_remove_edge_from_inverse_side() {
        let mut f = fixture();
        f.graph
            .add_edge(&f.relations, &f.p1, &f.enforced, &Target::Entity(f.pr1.clone()))
            .unwrap();
        // Removing the mirrored edge drops the original too.
        f.graph
            .remove_edge(&f.relations, &f.pr1, &f.implements, &Target::Entity(f.p1.clone()))
            .unwrap();

        assert_eq!(f.graph.edge_count(), 0);
    }

    #[test]
    fn test_literal_target_skips_inverse_bookkeeping() {
        let mut f = fixture();
        let literal = Target::Literal("http://example.org/doc".into());
        f.graph.add_edge(&f.relations, &f.p1, &f.has_link, &literal).unwrap();

        assert!(f.graph.has_edge(&f.p1, &f.has_link, &literal));
        assert_eq!(f.graph.edge_count(), 1);

        f.graph.remove_edge(&f.relations, &f.p1, &f.has_link, &literal).unwrap();
        assert_eq!(f.graph.edge_count(), 0);
        assert!(f.graph.get(&f.p1).unwrap().edges.is_empty());
    }

    #[test]
    fn test_remove_missing_edge_is_noop() {
        let mut f = fixture();
        let target = Target::Entity(f.pr1.clone());
        f.graph.remove_edge(&f.relations, &f.p1, &f.enforced, &target).unwrap();
        assert_eq!(f.graph.edge_count(), 0);
    }

    #[test]
    fn test_update_entity_keeps_identity_and_edges() {
        let mut f = fixture();
        let target = Target::Entity(f.pr1.clone());
        f.graph.add_edge(&f.relations, &f.p1, &f.enforced, &target).unwrap();

        f.graph
            .update_entity(&f.p1, "Data retention", "1.1", "Updated")
            .unwrap();
        let entity = f.graph.get(&f.p1).unwrap();
        assert_eq!(entity.name, "Data retention");
        assert_eq!(entity.version, "1.1");
        assert!(entity.has_edge(&f.enforced, &target));
    }

    #[test]
    fn test_remove_entity_cleans_up_references() {
        let mut f = fixture();
        f.graph
            .add_edge(&f.relations, &f.p1, &f.enforced, &Target::Entity(f.pr1.clone()))
            .unwrap();

        f.graph.remove_entity(&f.relations, &f.pr1).unwrap();
        assert!(!f.graph.contains(&f.pr1));
        assert_eq!(f.graph.edge_count(), 0);
        assert!(f.graph.get(&f.p1).unwrap().edges.is_empty());
    }

    #[test]
    fn test_check_edge_is_advisory_only() {
        let mut f = fixture();
        // pr1:Process is not in the domain of isEnforcedBy (domain = {Policy}).
        let bad = f
            .graph
            .check_edge(&f.templates, &f.relations, &f.pr1, &f.enforced, &Target::Entity(f.p1.clone()));
        assert!(matches!(bad, Err(Error::InvalidEdge(_))));

        // The permissive low-level call still accepts it.
        f.graph
            .add_edge(&f.relations, &f.pr1, &f.enforced, &Target::Entity(f.p1.clone()))
            .unwrap();
        assert!(f.graph.has_edge(&f.pr1, &f.enforced, &Target::Entity(f.p1.clone())));
    }

    #[test]
    fn test_check_edge_accepts_subtype_source() {
        let mut f = fixture();
        let agg = f
            .templates
            .register("AggregatedPolicy", "", &[TemplateId::new("Policy")])
            .unwrap();
        let a1 = f.graph.create_entity(&f.templates, &agg, "a1").unwrap();

        f.graph
            .check_edge(&f.templates, &f.relations, &a1, &f.enforced, &Target::Entity(f.pr1.clone()))
            .unwrap();
    }
}
