//! One editable document: registries, graph and namespaces together.
//!
//! A `Scenario` owns the TemplateRegistry + RelationRegistry + EntityGraph
//! of one document and exposes the synchronous command API a front end
//! drives. Every command runs to completion on the calling thread; hosts in
//! a multi-threaded environment put the whole scenario behind a single lock
//! (`&mut Scenario` is the mutual-exclusion boundary).

use crate::entity::{EntityId, Target};
use crate::error::{Error, Result};
use crate::formats::{NTriples, Turtle};
use crate::graph::EntityGraph;
use crate::materialize::Materializer;
use crate::relation::{RelationId, RelationRegistry};
use crate::template::{TemplateId, TemplateRegistry};
use crate::triple::Triple;
use crate::vocabulary::{sanitize_name, Namespaces, Vocabulary};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A document under interactive editing.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub templates: TemplateRegistry,
    pub relations: RelationRegistry,
    pub graph: EntityGraph,
    pub namespaces: Namespaces,
}

impl Scenario {
    /// Create a scenario over already-populated registries.
    pub fn new(
        templates: TemplateRegistry,
        relations: RelationRegistry,
        namespaces: Namespaces,
    ) -> Self {
        Self {
            templates,
            relations,
            graph: EntityGraph::new(),
            namespaces,
        }
    }

    /// Install a vocabulary and open an empty scenario over it.
    pub fn from_vocabulary(vocabulary: &Vocabulary) -> Result<Self> {
        let (templates, relations, namespaces) = vocabulary.install()?;
        Ok(Self::new(templates, relations, namespaces))
    }

    /// Create an entity instance.
    pub fn create_entity(&mut self, template: &TemplateId, name: &str) -> Result<EntityId> {
        self.graph.create_entity(&self.templates, template, name)
    }

    /// Update an entity's metadata.
    pub fn update_entity(
        &mut self,
        id: &EntityId,
        name: &str,
        version: &str,
        description: &str,
    ) -> Result<()> {
        self.graph.update_entity(id, name, version, description)
    }

    /// Destroy an entity and every edge referencing it.
    pub fn remove_entity(&mut self, id: &EntityId) -> Result<()> {
        self.graph.remove_entity(&self.relations, id)
    }

    /// Add an edge (permissive, like the underlying graph call).
    pub fn add_edge(
        &mut self,
        source: &EntityId,
        relation: &RelationId,
        target: &Target,
    ) -> Result<()> {
        self.graph.add_edge(&self.relations, source, relation, target)
    }

    /// Add an edge after running the advisory domain/range check.
    pub fn add_edge_checked(
        &mut self,
        source: &EntityId,
        relation: &RelationId,
        target: &Target,
    ) -> Result<()> {
        self.graph
            .check_edge(&self.templates, &self.relations, source, relation, target)?;
        self.graph.add_edge(&self.relations, source, relation, target)
    }

    /// Remove an edge.
    pub fn remove_edge(
        &mut self,
        source: &EntityId,
        relation: &RelationId,
        target: &Target,
    ) -> Result<()> {
        self.graph
            .remove_edge(&self.relations, source, relation, target)
    }

    /// Relations an instance of `template` may issue as subject.
    pub fn applicable_relations(&self, template: &TemplateId) -> Result<HashSet<RelationId>> {
        self.relations.applicable_relations(&self.templates, template)
    }

    /// Flatten into the exportable triple sequence.
    pub fn flatten(&self) -> Vec<Triple> {
        Materializer::new(&self.templates, &self.relations, &self.graph, &self.namespaces).flatten()
    }

    /// Serialize as Turtle.
    pub fn to_turtle(&self) -> Result<String> {
        Turtle::to_string(&self.flatten(), &self.namespaces)
    }

    /// Serialize as N-Triples.
    pub fn to_ntriples(&self) -> Result<String> {
        NTriples::to_string(&self.flatten())
    }

    /// Apply an instance file: create its entities, then its edges.
    ///
    /// With `checked` the advisory domain/range check runs before each edge
    /// (front-end pre-filtering); without it edges go straight to the
    /// permissive graph call. Returns the mapping from file keys to the
    /// assigned entity IDs.
    pub fn apply(&mut self, file: &ScenarioFile, checked: bool) -> Result<HashMap<String, EntityId>> {
        if let Some(namespace) = &file.namespace {
            self.namespaces.set_default_base(namespace);
        }

        let mut keys: HashMap<String, EntityId> = HashMap::new();
        for decl in &file.entities {
            let template = TemplateId::new(local_name(&decl.template));
            let id = self.create_entity(&template, &decl.name)?;
            if !decl.version.is_empty() || !decl.description.is_empty() {
                self.update_entity(&id, &decl.name, &decl.version, &decl.description)?;
            }
            keys.insert(decl.key.clone(), id);
        }

        for decl in &file.edges {
            let source = keys
                .get(&decl.source)
                .ok_or_else(|| Error::UnknownEntity(EntityId::new(decl.source.clone())))?
                .clone();
            let relation = RelationId::new(local_name(&decl.relation));
            let target = match &decl.target {
                TargetDecl::Entity(key) => Target::Entity(
                    keys.get(key)
                        .ok_or_else(|| Error::UnknownEntity(EntityId::new(key.clone())))?
                        .clone(),
                ),
                TargetDecl::Literal(value) => Target::Literal(value.clone()),
            };
            if checked {
                self.add_edge_checked(&source, &relation, &target)?;
            } else {
                self.add_edge(&source, &relation, &target)?;
            }
        }

        tracing::info!(
            entities = file.entities.len(),
            edges = file.edges.len(),
            "applied scenario file"
        );
        Ok(keys)
    }
}

/// Strip an optional `prefix:` and sanitize.
fn local_name(reference: &str) -> String {
    let local = reference
        .split_once(':')
        .map_or(reference, |(_, local)| local);
    sanitize_name(local)
}

/// Declaration of one entity in a scenario file, keyed so edges can refer to
/// it before its graph ID is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDecl {
    pub key: String,
    pub template: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

/// Target of a declared edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetDecl {
    /// Key of an entity declared in the same file.
    Entity(String),
    /// A literal string value.
    Literal(String),
}

/// Declaration of one edge in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDecl {
    pub source: String,
    pub relation: String,
    pub target: TargetDecl,
}

/// Instance declarations loadable into a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    /// Namespace for the entities of this scenario; defaults to
    /// [`crate::vocabulary::DEFAULT_INSTANCE_NS`].
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub entities: Vec<EntityDecl>,
    #[serde(default)]
    pub edges: Vec<EdgeDecl>,
}

impl ScenarioFile {
    /// Parse from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary::from_json(
            r#"{
                "models": [{
                    "prefix": "gov",
                    "namespace": "http://example.org/gov#",
                    "templates": [
                        {"name": "Policy"},
                        {"name": "Process"}
                    ],
                    "relations": [
                        {"name": "isEnforcedBy", "domain": ["Policy"], "range": ["Process"],
                         "inverse": "isImplementationOf"},
                        {"name": "isImplementationOf", "domain": ["Process"], "range": ["Policy"]},
                        {"name": "hasLink", "domain": ["Policy"]}
                    ]
                }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_apply_scenario_file() {
        let mut scenario = Scenario::from_vocabulary(&vocabulary()).unwrap();
        let file = ScenarioFile::from_json(
            r#"{
                "namespace": "http://example.org/demo#",
                "entities": [
                    {"key": "p1", "template": "gov:Policy", "name": "Data retention"},
                    {"key": "pr1", "template": "Process", "name": "Quarterly audit"}
                ],
                "edges": [
                    {"source": "p1", "relation": "isEnforcedBy", "target": {"entity": "pr1"}},
                    {"source": "p1", "relation": "hasLink", "target": {"literal": "http://example.org/doc"}}
                ]
            }"#,
        )
        .unwrap();

        let keys = scenario.apply(&file, true).unwrap();
        let p1 = &keys["p1"];
        let pr1 = &keys["pr1"];

        assert!(scenario.graph.has_edge(
            p1,
            &RelationId::new("isEnforcedBy"),
            &Target::Entity(pr1.clone())
        ));
        // Inverse synchronized by the graph.
        assert!(scenario.graph.has_edge(
            pr1,
            &RelationId::new("isImplementationOf"),
            &Target::Entity(p1.clone())
        ));
        assert_eq!(scenario.namespaces.default_base(), "http://example.org/demo#");
    }

    #[test]
    fn test_apply_checked_rejects_bad_edge() {
        let mut scenario = Scenario::from_vocabulary(&vocabulary()).unwrap();
        let file = ScenarioFile::from_json(
            r#"{
                "entities": [
                    {"key": "pr1", "template": "Process", "name": "Audit"},
                    {"key": "pr2", "template": "Process", "name": "Review"}
                ],
                "edges": [
                    {"source": "pr1", "relation": "isEnforcedBy", "target": {"entity": "pr2"}}
                ]
            }"#,
        )
        .unwrap();

        assert!(matches!(
            scenario.apply(&file, true),
            Err(Error::InvalidEdge(_))
        ));
    }

    #[test]
    fn test_apply_unknown_edge_key() {
        let mut scenario = Scenario::from_vocabulary(&vocabulary()).unwrap();
        let file = ScenarioFile::from_json(
            r#"{
                "entities": [{"key": "p1", "template": "Policy", "name": "P"}],
                "edges": [{"source": "ghost", "relation": "hasLink", "target": {"literal": "x"}}]
            }"#,
        )
        .unwrap();

        assert!(matches!(
            scenario.apply(&file, false),
            Err(Error::UnknownEntity(_))
        ));
    }
}
