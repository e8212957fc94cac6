//! Multi-law reconciliation.
//!
//! A dictamen usually amends several statutes. [`ReconciliationService`]
//! holds the available law trees, groups operations by affected law (keeping
//! document order inside each group) and reconciles every law it has.

use std::collections::BTreeMap;
use std::path::Path;

use cotejo_shared::{Law, LawDocument, LawNumber, Operation};

use crate::config::ReconcileConfig;
use crate::error::{EngineError, Result};
use crate::reconcile::{reconcile, ReconcileOutcome};

/// File name prefix of law trees in a laws directory (`ley_20744.json`).
pub const LAW_FILE_PREFIX: &str = "ley_";

/// Result of reconciling a whole dictamen.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Per normalized law number.
    pub outcomes: BTreeMap<String, ReconcileOutcome>,
    /// Laws with operations but no tree, with the dictamen articles affected.
    pub missing_laws: BTreeMap<String, Vec<String>>,
    /// Dictamen articles whose law could not be resolved.
    pub unknown_law: Vec<String>,
    /// Dictamen articles without a target.
    pub unresolved: Vec<String>,
}

impl BatchReport {
    pub fn warning_count(&self) -> usize {
        self.outcomes.values().map(|o| o.warnings.len()).sum()
    }
}

/// Law trees keyed by normalized number, plus the reconciliation tables.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationService {
    laws: BTreeMap<String, Law>,
    config: ReconcileConfig,
}

impl ReconciliationService {
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            laws: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Register a law tree. Returns its normalized number.
    pub fn add_law(&mut self, law: Law) -> Result<String> {
        let key = LawNumber::normalize(&law.number);
        if key.is_empty() {
            return Err(EngineError::InvalidLaw {
                path: law.name.clone(),
                reason: "law has no number".to_string(),
            });
        }
        if self.laws.insert(key.clone(), law).is_some() {
            tracing::warn!(law = %key, "law tree replaced");
        }
        Ok(key)
    }

    /// Parse a wrapped (`{"ley": ...}`) or bare law document.
    pub fn load_law_json(&mut self, json: &str) -> Result<String> {
        let document: LawDocument = serde_json::from_str(json)?;
        self.add_law(document.into_law())
    }

    /// Load a law file. A law without `numero` takes it from a
    /// `ley_<numero>.json` file name.
    pub fn load_law_file(&mut self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)?;
        let mut law = serde_json::from_str::<LawDocument>(&content)?.into_law();
        if LawNumber::normalize(&law.number).is_empty() {
            law.number = law_number_from_file_name(path).ok_or_else(|| EngineError::InvalidLaw {
                path: path.display().to_string(),
                reason: "no numero in document or file name".to_string(),
            })?;
        }
        let key = self.add_law(law)?;
        tracing::debug!(law = %key, path = %path.display(), "law loaded");
        Ok(key)
    }

    /// Load every `ley_*.json` in `dir`, in file name order.
    pub fn load_laws_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                tracing::debug!(path = %path.display(), "skipping subdirectory");
            } else if law_number_from_file_name(&path).is_none() {
                tracing::debug!(path = %path.display(), "skipping non-law file");
            } else {
                paths.push(path);
            }
        }
        paths.sort();
        for path in &paths {
            self.load_law_file(path)?;
        }
        Ok(paths.len())
    }

    pub fn has_law(&self, number: &str) -> bool {
        self.laws.contains_key(&LawNumber::normalize(number))
    }

    pub fn law(&self, number: &str) -> Option<&Law> {
        self.laws.get(&LawNumber::normalize(number))
    }

    pub fn law_count(&self) -> usize {
        self.laws.len()
    }

    pub fn list_laws(&self) -> Vec<&str> {
        self.laws.keys().map(String::as_str).collect()
    }

    /// Reconcile one law with the operations addressed to it.
    pub fn reconcile_law(&self, number: &str, operations: &[Operation]) -> Option<ReconcileOutcome> {
        let key = LawNumber::normalize(number);
        let law = self.laws.get(&key)?;
        let own: Vec<Operation> = operations
            .iter()
            .filter(|op| op.affected_law.as_known() == Some(key.as_str()))
            .cloned()
            .collect();
        Some(reconcile(law, &own, &self.config))
    }

    /// Reconcile every law the operations touch.
    pub fn reconcile_all(&self, operations: &[Operation]) -> BatchReport {
        let mut report = BatchReport::default();
        let mut by_law: BTreeMap<String, Vec<Operation>> = BTreeMap::new();

        for op in operations {
            if op.target.is_none() {
                report.unresolved.push(op.dictamen_article.clone());
            }
            match op.affected_law.as_known() {
                Some(law) => by_law.entry(law.to_string()).or_default().push(op.clone()),
                None => report.unknown_law.push(op.dictamen_article.clone()),
            }
        }

        for (number, ops) in by_law {
            match self.laws.get(&number) {
                Some(law) => {
                    report.outcomes.insert(number, reconcile(law, &ops, &self.config));
                }
                None => {
                    tracing::warn!(law = %number, operations = ops.len(), "no law tree for affected law");
                    report
                        .missing_laws
                        .insert(number, ops.iter().map(|op| op.dictamen_article.clone()).collect());
                }
            }
        }

        tracing::info!(
            laws = report.outcomes.len(),
            missing = report.missing_laws.len(),
            unknown_law = report.unknown_law.len(),
            unresolved = report.unresolved.len(),
            "dictamen reconciled"
        );
        report
    }
}

/// `ley_20744.json` → `20744`.
pub fn law_number_from_file_name(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let number = LawNumber::normalize(stem.strip_prefix(LAW_FILE_PREFIX)?);
    (!number.is_empty()).then_some(number)
}

/// File name a law's comparison is written to.
pub fn comparison_file_name(number: &str) -> String {
    format!("comparacion_{LAW_FILE_PREFIX}{}.json", LawNumber::normalize(number))
}
