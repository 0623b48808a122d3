//! Core types for typed entity-relation domain models.
//!
//! This crate provides the building blocks for assembling a domain model out
//! of reusable entity templates and typed relations, and exporting it as a
//! semantic triple document:
//!
//! - [`TemplateRegistry`] - type nodes and their multi-parent inheritance DAG
//! - [`RelationRegistry`] - relation definitions with domain/range closures
//!   and inverse links
//! - [`EntityGraph`] - entity instances and inverse-synchronized edges
//! - [`Materializer`] - flattens all three into an exportable triple set
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{EntityGraph, RelationRegistry, Target, TemplateRegistry};
//!
//! let mut templates = TemplateRegistry::new();
//! let policy = templates.register("Policy", "A governing rule", &[]).unwrap();
//! let process = templates.register("Process", "", &[]).unwrap();
//!
//! let mut relations = RelationRegistry::new();
//! let enforced = relations
//!     .define(&templates, "isEnforcedBy", "", &[policy.clone()], &[process.clone()], None, None)
//!     .unwrap();
//! let implements = relations
//!     .define(&templates, "isImplementationOf", "", &[process.clone()], &[policy.clone()],
//!             Some(&enforced), None)
//!     .unwrap();
//!
//! let mut graph = EntityGraph::new();
//! let p1 = graph.create_entity(&templates, &policy, "Data retention").unwrap();
//! let pr1 = graph.create_entity(&templates, &process, "Quarterly audit").unwrap();
//!
//! // Adding the edge keeps the inverse edge in sync.
//! graph.add_edge(&relations, &p1, &enforced, &Target::Entity(pr1.clone())).unwrap();
//! assert!(graph.has_edge(&pr1, &implements, &Target::Entity(p1)));
//! ```
//!
//! Vocabularies (the fixed template/relation declarations built at startup)
//! are installed through [`vocabulary::Vocabulary`]; one editable document is
//! a [`Scenario`]; the flattened triples are written by the handlers in
//! [`formats`].

mod entity;
mod error;
mod graph;
mod relation;
mod scenario;
mod template;
mod triple;

pub mod formats;
pub mod materialize;
pub mod vocabulary;

pub use entity::{Entity, EntityId, Target};
pub use error::{Error, Result};
pub use graph::EntityGraph;
pub use materialize::Materializer;
pub use relation::{Relation, RelationId, RelationRegistry};
pub use scenario::{EdgeDecl, EntityDecl, Scenario, ScenarioFile, TargetDecl};
pub use template::{Template, TemplateId, TemplateRegistry};
pub use triple::{Iri, Term, Triple};
pub use vocabulary::{Namespaces, RelationDecl, SubModel, TemplateDecl, Vocabulary};
