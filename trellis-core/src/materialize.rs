//! Flattening the registries and graph into an exportable triple set.

use crate::entity::Target;
use crate::graph::EntityGraph;
use crate::relation::RelationRegistry;
use crate::template::TemplateRegistry;
use crate::triple::{Iri, Term, Triple};
use crate::vocabulary::Namespaces;
use std::collections::HashSet;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
pub const OWL_INVERSE_OF: &str = "http://www.w3.org/2002/07/owl#inverseOf";
pub const OWL_VERSION_INFO: &str = "http://www.w3.org/2002/07/owl#versionInfo";

/// Flattens TemplateRegistry + RelationRegistry + EntityGraph into a
/// deduplicated triple sequence. Reads all three without mutating them.
///
/// Definition triples (template/relation metadata, inheritance) are emitted
/// once each by definition identity, regardless of how many entities
/// reference them. The output order is not deterministic; compare results as
/// sets.
pub struct Materializer<'a> {
    templates: &'a TemplateRegistry,
    relations: &'a RelationRegistry,
    graph: &'a EntityGraph,
    namespaces: &'a Namespaces,
}

impl<'a> Materializer<'a> {
    /// Create a materializer over the three components of one document.
    pub fn new(
        templates: &'a TemplateRegistry,
        relations: &'a RelationRegistry,
        graph: &'a EntityGraph,
        namespaces: &'a Namespaces,
    ) -> Self {
        Self {
            templates,
            relations,
            graph,
            namespaces,
        }
    }

    /// Flatten into a triple sequence.
    pub fn flatten(&self) -> Vec<Triple> {
        let mut out: HashSet<Triple> = HashSet::new();

        for template in self.templates.iter() {
            let subject = self.namespaces.resolve_template(&template.id);
            out.insert(Triple::new(
                subject.clone(),
                RDFS_LABEL,
                Term::Literal(template.name.clone()),
            ));
            if !template.description.is_empty() {
                out.insert(Triple::new(
                    subject.clone(),
                    RDFS_COMMENT,
                    Term::Literal(template.description.clone()),
                ));
            }
            for parent in &template.parents {
                out.insert(Triple::new(
                    subject.clone(),
                    RDFS_SUB_CLASS_OF,
                    Term::Iri(self.namespaces.resolve_template(parent)),
                ));
            }
        }

        for relation in self.relations.iter() {
            let subject = self.namespaces.resolve_relation(&relation.id);
            out.insert(Triple::new(
                subject.clone(),
                RDFS_LABEL,
                Term::Literal(relation.name.clone()),
            ));
            if !relation.description.is_empty() {
                out.insert(Triple::new(
                    subject.clone(),
                    RDFS_COMMENT,
                    Term::Literal(relation.description.clone()),
                ));
            }
            for template in &relation.domain {
                out.insert(Triple::new(
                    subject.clone(),
                    RDFS_DOMAIN,
                    Term::Iri(self.namespaces.resolve_template(template)),
                ));
            }
            for template in &relation.range {
                out.insert(Triple::new(
                    subject.clone(),
                    RDFS_RANGE,
                    Term::Iri(self.namespaces.resolve_template(template)),
                ));
            }
            if let Some(inverse) = &relation.inverse {
                out.insert(Triple::new(
                    subject.clone(),
                    OWL_INVERSE_OF,
                    Term::Iri(self.namespaces.resolve_relation(inverse)),
                ));
            }
            if let Some(sup) = &relation.super_relation {
                out.insert(Triple::new(
                    subject.clone(),
                    RDFS_SUB_PROPERTY_OF,
                    Term::Iri(self.namespaces.resolve_relation(sup)),
                ));
            }
        }

        for entity in self.graph.entities() {
            let subject = self.namespaces.resolve_entity(&entity.id);
            out.insert(Triple::new(
                subject.clone(),
                RDF_TYPE,
                Term::Iri(self.namespaces.resolve_template(&entity.template)),
            ));
            out.insert(Triple::new(
                subject.clone(),
                RDFS_LABEL,
                Term::Literal(entity.name.clone()),
            ));
            if !entity.version.is_empty() {
                out.insert(Triple::new(
                    subject.clone(),
                    OWL_VERSION_INFO,
                    Term::Literal(entity.version.clone()),
                ));
            }
            if !entity.description.is_empty() {
                out.insert(Triple::new(
                    subject.clone(),
                    RDFS_COMMENT,
                    Term::Literal(entity.description.clone()),
                ));
            }

            for (relation, bucket) in &entity.edges {
                let predicate = self.namespaces.resolve_relation(relation);
                for target in bucket {
                    let object = match target {
                        Target::Entity(id) => Term::Iri(self.namespaces.resolve_entity(id)),
                        Target::Literal(value) => Term::Literal(value.clone()),
                    };
                    out.insert(Triple::new(subject.clone(), predicate.clone(), object));
                }
            }
        }

        tracing::debug!(triples = out.len(), "flattened graph");
        out.into_iter().collect()
    }
}
