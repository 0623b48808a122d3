//! Turtle format.
//!
//! Human-readable serialization with prefix support.
//!
//! Reference: <https://www.w3.org/TR/rdf12-turtle/>
//!
//! Example:
//! ```turtle
//! @prefix gov: <http://example.org/gov#> .
//!
//! gov:Policy rdfs:label "Policy" ;
//!     rdfs:comment "A governing rule" .
//! ```

use super::escape_literal;
use crate::triple::{Term, Triple};
use crate::vocabulary::Namespaces;
use crate::Result;
use std::collections::HashMap;
use std::io::Write;

/// Turtle format handler.
pub struct Turtle;

impl Turtle {
    /// Write triples to Turtle format.
    ///
    /// Groups triples by subject for readability. Prefixes come from the
    /// namespace table (sub-models, instance namespace, well-known
    /// vocabularies).
    pub fn write<W: Write>(triples: &[Triple], namespaces: &Namespaces, mut writer: W) -> Result<()> {
        let prefixes = namespaces.prefix_map();

        let mut header: Vec<_> = prefixes.iter().collect();
        header.sort();
        for (prefix, base) in header {
            writeln!(writer, "@prefix {}: <{}> .", prefix, base)?;
        }
        if !prefixes.is_empty() {
            writeln!(writer)?;
        }

        // Group triples by subject
        let mut by_subject: HashMap<&str, Vec<&Triple>> = HashMap::new();
        for triple in triples {
            by_subject
                .entry(triple.subject.as_str())
                .or_default()
                .push(triple);
        }

        for (subject, group) in by_subject {
            let subject_str = format_iri(subject, &prefixes);
            write!(writer, "{}", subject_str)?;

            for (i, triple) in group.iter().enumerate() {
                let pred = format_iri(triple.predicate.as_str(), &prefixes);
                let obj = format_term(&triple.object, &prefixes);

                if i == 0 {
                    write!(writer, " {} {}", pred, obj)?;
                } else {
                    write!(writer, " ;\n    {} {}", pred, obj)?;
                }
            }
            writeln!(writer, " .")?;
        }

        Ok(())
    }

    /// Convert to string.
    pub fn to_string(triples: &[Triple], namespaces: &Namespaces) -> Result<String> {
        let mut buf = Vec::new();
        Self::write(triples, namespaces, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}

/// Format a term for the object position.
fn format_term(term: &Term, prefixes: &HashMap<String, String>) -> String {
    match term {
        Term::Iri(iri) => format_iri(iri.as_str(), prefixes),
        Term::Literal(value) => format!("\"{}\"", escape_literal(value)),
    }
}

/// Format an IRI, compacting with prefixes if possible.
fn format_iri(iri: &str, prefixes: &HashMap<String, String>) -> String {
    for (prefix, base) in prefixes {
        if iri.starts_with(base.as_str()) {
            let local = &iri[base.len()..];
            if is_valid_local_name(local) {
                return format!("{}:{}", prefix, local);
            }
        }
    }
    format!("<{}>", iri)
}

/// Check if a string is a valid Turtle local name.
fn is_valid_local_name(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triple::Iri;

    #[test]
    fn test_turtle_output() {
        let mut namespaces = Namespaces::default();
        namespaces.insert_prefix("gov", "http://example.org/gov#");

        let triples = vec![
            Triple::new(
                "http://example.org/gov#Policy",
                "http://www.w3.org/2000/01/rdf-schema#label",
                Term::Literal("Policy".into()),
            ),
            Triple::new(
                "http://example.org/gov#Policy",
                "http://www.w3.org/2000/01/rdf-schema#comment",
                Term::Literal("A governing rule".into()),
            ),
        ];

        let output = Turtle::to_string(&triples, &namespaces).unwrap();
        assert!(output.contains("@prefix gov: <http://example.org/gov#> ."));
        assert!(output.contains("gov:Policy"));
        assert!(output.contains("rdfs:label \"Policy\""));
        assert!(output.contains(" ;\n    "));
    }

    #[test]
    fn test_literal_escaping() {
        let namespaces = Namespaces::default();
        let triples = vec![Triple::new(
            "http://x/s",
            "http://x/p",
            Term::Literal("line\n\"quoted\"".into()),
        )];

        let output = Turtle::to_string(&triples, &namespaces).unwrap();
        assert!(output.contains(r#""line\n\"quoted\"""#));
    }

    #[test]
    fn test_unprefixed_iri_stays_angle_bracketed() {
        let namespaces = Namespaces::default();
        let triples = vec![Triple::new(
            "http://elsewhere.org/thing",
            "http://x/p",
            Term::Iri(Iri::new("http://elsewhere.org/other")),
        )];

        let output = Turtle::to_string(&triples, &namespaces).unwrap();
        assert!(output.contains("<http://elsewhere.org/thing>"));
    }
}
