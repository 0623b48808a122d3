//! N-Triples format.
//!
//! Line-based, simple. Each line is `<subject> <predicate> object .`
//!
//! Reference: <https://www.w3.org/TR/rdf12-n-triples/>

use super::escape_literal;
use crate::triple::{Term, Triple};
use crate::Result;
use std::io::Write;

/// N-Triples format handler.
pub struct NTriples;

impl NTriples {
    /// Write triples to N-Triples format.
    pub fn write<W: Write>(triples: &[Triple], mut writer: W) -> Result<()> {
        for triple in triples {
            let object = match &triple.object {
                Term::Iri(iri) => format!("<{}>", iri),
                Term::Literal(value) => format!("\"{}\"", escape_literal(value)),
            };
            writeln!(
                writer,
                "<{}> <{}> {} .",
                triple.subject, triple.predicate, object
            )?;
        }
        Ok(())
    }

    /// Convert to string.
    pub fn to_string(triples: &[Triple]) -> Result<String> {
        let mut buf = Vec::new();
        Self::write(triples, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}
