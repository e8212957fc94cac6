//! Configuration for the dictamen parser.
//!
//! Compile-time limits bound the state machine and the law-mention
//! heuristics. The tables that depend on the legislative corpus (law name
//! aliases, which statute a dictamen Título amends) live in
//! [`ResolverConfig`], which can be swapped per corpus and loaded from YAML.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParserError, Result};

/// Non-blank lines scanned after an empty `ARTÍCULO N-` marker for the
/// operative verb that opens the operation.
pub const MAX_HEADER_LOOKAHEAD: usize = 2;

/// Header continuation lines accepted while waiting for a trigger phrase.
///
/// Past this cap an incorporation starts capturing its body and any other
/// operation stops scanning, so a missing trigger cannot swallow the rest of
/// the document into one header.
pub const MAX_HEADER_LINES: usize = 6;

/// Distance in characters from the operative verb within which a law
/// mention counts as proximate.
pub const LAW_PROXIMITY_WINDOW: usize = 120;

/// Characters before a law mention searched for a cross-reference marker.
pub const CROSS_REFERENCE_WINDOW: usize = 40;

/// Minimum digits in a law number mention (filters out years and article numbers).
pub const MIN_LAW_NUMBER_DIGITS: usize = 4;

/// A named-law alias: a phrase that designates a statute by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawAlias {
    /// Phrase as written in dictámenes; matched case- and accent-insensitively.
    pub pattern: String,
    /// Statute number the phrase designates.
    pub law: String,
}

impl LawAlias {
    pub fn new(pattern: &str, law: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            law: law.to_string(),
        }
    }
}

/// Corpus-specific tables used by the target and law resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Named-law aliases, checked in order before numeric mentions.
    pub law_aliases: Vec<LawAlias>,
    /// Dictamen Título → statute it amends, for contextual inference.
    pub title_laws: BTreeMap<String, String>,
    /// Phrases that turn a following law mention into a cross-reference.
    pub cross_reference_markers: Vec<String>,
    /// Phrases that refer back to "the" law of the surrounding Título.
    pub contextual_cues: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::argentine_labour_reform()
    }
}

/// On-disk corpus file; the parser only reads the `resolver` section.
#[derive(Debug, Default, Deserialize)]
struct CorpusFile {
    #[serde(default)]
    resolver: ResolverConfig,
}

impl ResolverConfig {
    /// Tables for the Argentine labour-reform dictamen, whose Título I amends
    /// the Ley de Contrato de Trabajo (20.744).
    pub fn argentine_labour_reform() -> Self {
        let law_aliases = [
            ("ley de contrato de trabajo", "20744"),
            ("regimen de contrato de trabajo", "20744"),
            ("l.c.t.", "20744"),
            ("ley de organizacion y procedimiento", "18345"),
            ("ley de honorarios", "27423"),
            ("ley nacional de empleo", "24013"),
            ("jornada de trabajo", "11544"),
            ("riesgos del trabajo", "24557"),
            ("asociaciones sindicales", "23551"),
            ("convenciones colectivas", "14250"),
            ("empleo no registrado", "25323"),
            ("teletrabajo", "27555"),
            ("regimen nacional de trabajo agrario", "26727"),
            ("casas particulares", "26844"),
            ("pequena y mediana empresa", "24467"),
            ("pyme", "24467"),
            ("sistema integrado de jubilaciones", "24241"),
        ]
        .into_iter()
        .map(|(pattern, law)| LawAlias::new(pattern, law))
        .collect();

        let cross_reference_markers = [
            "en los terminos de",
            "en los terminos del",
            "conforme a",
            "conforme al",
            "conforme la",
            "conforme lo",
            "segun",
            "previsto en",
            "prevista en",
            "previstos en",
            "establecido en",
            "establecida en",
            "dispuesto en",
            "de acuerdo con",
            "de acuerdo a",
            "a que se refiere",
            "en el marco de",
            "regido por",
            "regidos por",
            "modificado por",
            "modificada por",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let contextual_cues = ["de la ley", "esta ley", "dicha ley", "la citada ley"]
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            law_aliases,
            title_laws: BTreeMap::from([("I".to_string(), "20744".to_string())]),
            cross_reference_markers,
            contextual_cues,
        }
    }

    /// Parse the `resolver` section of a YAML corpus file. Missing keys keep
    /// their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: CorpusFile = serde_yaml_ng::from_str(yaml)?;
        Ok(file.resolver)
    }

    /// Load a YAML corpus file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&std::fs::read_to_string(path)?),
            _ => Err(ParserError::UnsupportedFormat(path.display().to_string())),
        }
    }
}
