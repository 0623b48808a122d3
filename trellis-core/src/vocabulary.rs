//! Vocabulary declarations and namespace handling.
//!
//! A vocabulary is the fixed input built before any user entity exists: a
//! list of template and relation declarations partitioned into named
//! sub-models. Each sub-model owns a namespace prefix; a model may import
//! another model, making its templates and relations usable as parents and
//! domain/range members. Installation into fresh registries is
//! all-or-nothing: any error aborts startup.

use crate::entity::EntityId;
use crate::error::{Error, Result};
use crate::relation::{RelationId, RelationRegistry};
use crate::template::{TemplateId, TemplateRegistry};
use crate::triple::Iri;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Default namespace for entity instances, used when a scenario does not
/// declare its own.
pub const DEFAULT_INSTANCE_NS: &str = "http://example.org/scenario#";

/// Sanitize a declared name into an identifier.
///
/// Keeps alphanumerics, `_` and `-` (the character set valid in a prefixed
/// local name); everything else becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

/// Prefix table mapping sub-models to namespaces, plus the per-node prefix
/// bindings the Materializer and writers use to resolve IRIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespaces {
    prefixes: HashMap<String, String>,
    template_bindings: HashMap<String, String>,
    relation_bindings: HashMap<String, String>,
    default_base: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new(DEFAULT_INSTANCE_NS)
    }
}

impl Namespaces {
    /// Create a table with the given instance namespace.
    pub fn new(default_base: impl Into<String>) -> Self {
        Self {
            prefixes: HashMap::new(),
            template_bindings: HashMap::new(),
            relation_bindings: HashMap::new(),
            default_base: default_base.into(),
        }
    }

    /// Register a sub-model prefix.
    pub fn insert_prefix(&mut self, prefix: impl Into<String>, base: impl Into<String>) {
        self.prefixes.insert(prefix.into(), base.into());
    }

    /// Bind a template ID to the sub-model that declared it.
    pub fn bind_template(&mut self, id: &TemplateId, prefix: &str) {
        self.template_bindings
            .insert(id.as_str().to_string(), prefix.to_string());
    }

    /// Bind a relation ID to the sub-model that declared it.
    pub fn bind_relation(&mut self, id: &RelationId, prefix: &str) {
        self.relation_bindings
            .insert(id.as_str().to_string(), prefix.to_string());
    }

    /// The sub-model that declared a template, if any.
    pub fn template_model(&self, id: &TemplateId) -> Option<&str> {
        self.template_bindings.get(id.as_str()).map(String::as_str)
    }

    /// The sub-model that declared a relation, if any.
    pub fn relation_model(&self, id: &RelationId) -> Option<&str> {
        self.relation_bindings.get(id.as_str()).map(String::as_str)
    }

    /// The instance namespace.
    pub fn default_base(&self) -> &str {
        &self.default_base
    }

    /// Override the instance namespace.
    pub fn set_default_base(&mut self, base: impl Into<String>) {
        self.default_base = base.into();
    }

    /// Resolve a template ID to an IRI under its declaring namespace.
    ///
    /// Unbound IDs (direct API use without a vocabulary) fall back to the
    /// instance namespace.
    pub fn resolve_template(&self, id: &TemplateId) -> Iri {
        self.resolve(id.as_str(), &self.template_bindings)
    }

    /// Resolve a relation ID to an IRI under its declaring namespace.
    pub fn resolve_relation(&self, id: &RelationId) -> Iri {
        self.resolve(id.as_str(), &self.relation_bindings)
    }

    /// Resolve an entity ID to an IRI under the instance namespace.
    pub fn resolve_entity(&self, id: &EntityId) -> Iri {
        Iri::new(format!("{}{}", self.default_base, id.as_str()))
    }

    fn resolve(&self, id: &str, bindings: &HashMap<String, String>) -> Iri {
        let base = bindings
            .get(id)
            .and_then(|prefix| self.prefixes.get(prefix))
            .map_or(self.default_base.as_str(), String::as_str);
        Iri::new(format!("{}{}", base, id))
    }

    /// All prefixes for document writers: the sub-model table, the instance
    /// namespace under `scn`, and the well-known vocabularies used by the
    /// Materializer's metadata triples.
    pub fn prefix_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("rdf".into(), "http://www.w3.org/1999/02/22-rdf-syntax-ns#".into());
        map.insert("rdfs".into(), "http://www.w3.org/2000/01/rdf-schema#".into());
        map.insert("owl".into(), "http://www.w3.org/2002/07/owl#".into());
        map.insert("xsd".into(), "http://www.w3.org/2001/XMLSchema#".into());
        map.insert("scn".into(), self.default_base.clone());
        for (prefix, base) in &self.prefixes {
            map.insert(prefix.clone(), base.clone());
        }
        map
    }
}

/// A template declaration inside a sub-model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDecl {
    /// Plain (unqualified) name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Parent references: plain names for this model, `prefix:Name` for
    /// imported ones.
    #[serde(default)]
    pub parents: Vec<String>,
}

/// A relation declaration inside a sub-model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationDecl {
    /// Plain (unqualified) name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: Vec<String>,
    #[serde(default)]
    pub range: Vec<String>,
    /// Inverse relation reference; linked symmetrically after all relations
    /// of the vocabulary are defined, so forward references work.
    #[serde(default)]
    pub inverse: Option<String>,
    #[serde(default)]
    pub super_relation: Option<String>,
}

/// A named namespace group of declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubModel {
    /// Prefix naming this model, e.g. `gov`.
    pub prefix: String,
    /// Namespace base IRI, e.g. `http://example.org/gov#`.
    pub namespace: String,
    /// Prefixes of models whose declarations may be referenced here.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub templates: Vec<TemplateDecl>,
    #[serde(default)]
    pub relations: Vec<RelationDecl>,
}

/// A complete vocabulary: the sub-models to install at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub models: Vec<SubModel>,
}

impl Vocabulary {
    /// Parse from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Install the vocabulary into fresh registries.
    ///
    /// Two-pass per kind: templates are registered before parent links so
    /// declaration order inside a model does not matter, and relations are
    /// defined before inverse/super links for the same reason. Any failure
    /// aborts the whole installation.
    pub fn install(&self) -> Result<(TemplateRegistry, RelationRegistry, Namespaces)> {
        let declared: HashSet<&str> = self.models.iter().map(|m| m.prefix.as_str()).collect();
        for model in &self.models {
            for import in &model.imports {
                if !declared.contains(import.as_str()) {
                    return Err(Error::UnknownModel(import.clone()));
                }
            }
        }

        let mut namespaces = Namespaces::default();
        for model in &self.models {
            namespaces.insert_prefix(&model.prefix, &model.namespace);
        }

        let mut templates = TemplateRegistry::new();
        for model in &self.models {
            for decl in &model.templates {
                let id = templates.register(&decl.name, &decl.description, &[])?;
                namespaces.bind_template(&id, &model.prefix);
            }
        }
        for model in &self.models {
            for decl in &model.templates {
                let child = TemplateId::new(sanitize_name(&decl.name));
                for parent_ref in &decl.parents {
                    let parent = self.template_ref(model, parent_ref, &namespaces)?;
                    templates.add_parent(&child, &parent)?;
                }
            }
        }

        let mut relations = RelationRegistry::new();
        for model in &self.models {
            for decl in &model.relations {
                let domain = decl
                    .domain
                    .iter()
                    .map(|r| self.template_ref(model, r, &namespaces))
                    .collect::<Result<Vec<_>>>()?;
                let range = decl
                    .range
                    .iter()
                    .map(|r| self.template_ref(model, r, &namespaces))
                    .collect::<Result<Vec<_>>>()?;
                let id =
                    relations.define(&templates, &decl.name, &decl.description, &domain, &range, None, None)?;
                namespaces.bind_relation(&id, &model.prefix);
            }
        }
        for model in &self.models {
            for decl in &model.relations {
                let id = RelationId::new(sanitize_name(&decl.name));
                if let Some(inverse_ref) = &decl.inverse {
                    let inverse = self.relation_ref(model, inverse_ref, &namespaces)?;
                    relations.set_inverse(&id, &inverse)?;
                }
                if let Some(super_ref) = &decl.super_relation {
                    let sup = self.relation_ref(model, super_ref, &namespaces)?;
                    relations.set_super_relation(&id, &sup)?;
                }
            }
        }

        tracing::info!(
            models = self.models.len(),
            templates = templates.len(),
            relations = relations.len(),
            "installed vocabulary"
        );
        Ok((templates, relations, namespaces))
    }

    /// Resolve a template reference from within `model`.
    fn template_ref(
        &self,
        model: &SubModel,
        reference: &str,
        namespaces: &Namespaces,
    ) -> Result<TemplateId> {
        let (owner, id) = resolve_ref(model, reference)?;
        let id = TemplateId::new(id);
        match namespaces.template_model(&id) {
            Some(prefix) if prefix == owner => Ok(id),
            _ => Err(Error::UnknownTemplate(id)),
        }
    }

    /// Resolve a relation reference from within `model`.
    fn relation_ref(
        &self,
        model: &SubModel,
        reference: &str,
        namespaces: &Namespaces,
    ) -> Result<RelationId> {
        let (owner, id) = resolve_ref(model, reference)?;
        let id = RelationId::new(id);
        match namespaces.relation_model(&id) {
            Some(prefix) if prefix == owner => Ok(id),
            _ => Err(Error::UnknownRelation(id)),
        }
    }
}

/// Split a reference into its owning model prefix and sanitized ID.
///
/// A qualified reference must name the model itself or one of its imports.
fn resolve_ref<'a>(model: &'a SubModel, reference: &str) -> Result<(&'a str, String)> {
    match reference.split_once(':') {
        Some((prefix, local)) => {
            if prefix == model.prefix {
                return Ok((model.prefix.as_str(), sanitize_name(local)));
            }
            match model.imports.iter().find(|i| i.as_str() == prefix) {
                Some(owner) => Ok((owner.as_str(), sanitize_name(local))),
                None => Err(Error::UnknownModel(prefix.to_string())),
            }
        }
        None => Ok((model.prefix.as_str(), sanitize_name(reference))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOCAB: &str = r#"{
        "models": [
            {
                "prefix": "base",
                "namespace": "http://example.org/base#",
                "templates": [
                    {"name": "Element", "description": "Root of everything"}
                ],
                "relations": [
                    {"name": "relatesTo", "domain": ["Element"], "range": ["Element"]}
                ]
            },
            {
                "prefix": "gov",
                "namespace": "http://example.org/gov#",
                "imports": ["base"],
                "templates": [
                    {"name": "Policy", "parents": ["base:Element"]},
                    {"name": "Process", "parents": ["base:Element"]}
                ],
                "relations": [
                    {
                        "name": "isEnforcedBy",
                        "domain": ["Policy"],
                        "range": ["Process"],
                        "inverse": "isImplementationOf"
                    },
                    {
                        "name": "isImplementationOf",
                        "domain": ["Process"],
                        "range": ["Policy"],
                        "super_relation": "base:relatesTo"
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_install_composable_models() {
        let vocab = Vocabulary::from_json(VOCAB).unwrap();
        let (templates, relations, namespaces) = vocab.install().unwrap();

        assert_eq!(templates.len(), 3);
        assert_eq!(relations.len(), 3);

        let policy = TemplateId::new("Policy");
        let element = TemplateId::new("Element");
        assert!(templates.ancestors(&policy).unwrap().contains(&element));

        // Forward reference within one model: inverse linked symmetrically.
        let enforced = RelationId::new("isEnforcedBy");
        let implements = RelationId::new("isImplementationOf");
        assert_eq!(
            relations.get(&enforced).unwrap().inverse.as_ref(),
            Some(&implements)
        );
        assert_eq!(
            relations.get(&implements).unwrap().inverse.as_ref(),
            Some(&enforced)
        );

        // Cross-model super-relation.
        assert_eq!(
            relations.get(&implements).unwrap().super_relation.as_ref(),
            Some(&RelationId::new("relatesTo"))
        );

        assert_eq!(
            namespaces.resolve_template(&policy).as_str(),
            "http://example.org/gov#Policy"
        );
        assert_eq!(
            namespaces.resolve_template(&element).as_str(),
            "http://example.org/base#Element"
        );
    }

    #[test]
    fn test_unimported_reference_rejected() {
        let mut vocab = Vocabulary::from_json(VOCAB).unwrap();
        // gov no longer imports base, so "base:Element" is out of reach.
        vocab.models[1].imports.clear();

        assert!(matches!(vocab.install(), Err(Error::UnknownModel(_))));
    }

    #[test]
    fn test_unknown_import_rejected() {
        let mut vocab = Vocabulary::from_json(VOCAB).unwrap();
        vocab.models[1].imports.push("missing".into());

        assert!(matches!(vocab.install(), Err(Error::UnknownModel(_))));
    }

    #[test]
    fn test_cross_model_duplicate_is_fatal() {
        let mut vocab = Vocabulary::from_json(VOCAB).unwrap();
        vocab.models[1].templates.push(TemplateDecl {
            name: "Element".into(),
            description: String::new(),
            parents: Vec::new(),
        });

        assert!(matches!(vocab.install(), Err(Error::DuplicateTemplate(_))));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("  Data retention "), "Data_retention");
        assert_eq!(sanitize_name("has link!"), "has_link_");
        assert_eq!(sanitize_name("already_clean-1"), "already_clean-1");
    }
}
