//! Manual corrections applied on top of automatic resolution.
//!
//! Records are keyed by the dictamen's own article number and can force
//! the affected law, force a target article, or null a target so that a
//! derogation applies to the whole law. Overlay-corrected operations are
//! indistinguishable from automatically resolved ones downstream.

use std::collections::BTreeMap;
use std::path::Path;

use cotejo_shared::numbering::normalize_article_number;
use cotejo_shared::{ArticleRef, LawNumber, Operation, Target};
use serde::{Deserialize, Serialize};

use crate::error::{ParserError, Result};

/// Force the law and/or target article of one dictamen article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualMatch {
    pub dictamen_articulo: String,
    #[serde(default)]
    pub target_ley: Option<String>,
    #[serde(default)]
    pub target_articulo: Option<String>,
}

/// A set of manual corrections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    /// Dictamen article → law number.
    #[serde(default)]
    pub law_replacements: BTreeMap<String, String>,
    #[serde(default)]
    pub manual_matches: Vec<ManualMatch>,
    /// Dictamen articles whose target must be cleared.
    #[serde(default)]
    pub null_target_overrides: Vec<String>,
}

impl Overlay {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let overlay: Self = serde_json::from_str(json)?;
        overlay.validate()?;
        Ok(overlay)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let overlay: Self = serde_yaml_ng::from_str(yaml)?;
        overlay.validate()?;
        Ok(overlay)
    }

    /// Load an overlay, choosing the format by file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => Err(ParserError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Reject records that could never be applied.
    pub fn validate(&self) -> Result<()> {
        for record in &self.manual_matches {
            if let Some(article) = &record.target_articulo {
                if ArticleRef::parse(article).is_none() {
                    return Err(ParserError::InvalidOverlay {
                        dictamen_article: record.dictamen_articulo.clone(),
                        reason: format!("target_articulo '{article}' is not an article number"),
                    });
                }
            }
            if record.target_ley.is_none() && record.target_articulo.is_none() {
                return Err(ParserError::InvalidOverlay {
                    dictamen_article: record.dictamen_articulo.clone(),
                    reason: "manual match forces neither a law nor an article".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Apply the corrections in place. Returns the number of operations changed.
    ///
    /// Per operation: law replacement, then manual match (which ends
    /// processing of that operation), then null-target override.
    pub fn apply(&self, operations: &mut [Operation]) -> usize {
        let mut changed = 0;
        for op in operations.iter_mut() {
            let key = normalize_article_number(&op.dictamen_article);
            let before = op.clone();

            if let Some(law) = self
                .law_replacements
                .iter()
                .find(|(k, _)| normalize_article_number(k) == key)
                .map(|(_, law)| law)
            {
                op.affected_law = LawNumber::parse(law);
            }

            if let Some(record) = self
                .manual_matches
                .iter()
                .find(|m| normalize_article_number(&m.dictamen_articulo) == key)
            {
                if let Some(law) = &record.target_ley {
                    op.affected_law = LawNumber::parse(law);
                }
                if let Some(article) = record.target_articulo.as_deref().and_then(ArticleRef::parse) {
                    op.target = Some(Target::article(article));
                }
            } else if self
                .null_target_overrides
                .iter()
                .any(|k| normalize_article_number(k) == key)
            {
                op.target = op
                    .action
                    .is_derogation()
                    .then_some(Target::WholeLaw { confirmed: true });
            }

            if *op != before {
                tracing::debug!(dictamen_article = %op.dictamen_article, "overlay applied");
                changed += 1;
            }
        }
        changed
    }
}
