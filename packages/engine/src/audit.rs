//! Audit pass: operations that did not land anywhere.
//!
//! Run after [`crate::ReconciliationService::reconcile_all`]. Every
//! operation must either surface in its law's comparison tree (its dictamen
//! article recorded on some node) or be covered by a whole-law or chapter
//! derogation. The rest is listed for manual review.
//!
//! Operations whose header or replacement text names only laws other than
//! their `ley_afectada` are listed too, since that is how a misattributed
//! law shows up.

use std::collections::BTreeSet;

use cotejo_parser::resolve::mentioned_laws;
use cotejo_shared::numbering::same_division;
use cotejo_shared::{Operation, Target};
use serde::{Deserialize, Serialize};

use crate::comparison::Comparison;
use crate::service::BatchReport;

/// Header phrases of operations that legitimately name no statute: new
/// regimes ("créase") and closing formulae.
const NO_LAW_EXPECTED: [&str; 5] = ["créase", "crease", "créanse", "de forma", "comuníquese"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MismatchKind {
    UnknownLaw,
    LawTreeMissing,
    UnresolvedTarget,
    ArticleNotFoundInLaw,
    LawMentionMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    #[serde(rename = "tipo")]
    pub kind: MismatchKind,
    pub dictamen_articulo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ley: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destino: Option<String>,
    pub encabezado: String,
    /// Laws named in the operation text, for `LAW_MENTION_MISMATCH`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leyes_mencionadas: Vec<String>,
}

impl Mismatch {
    fn new(kind: MismatchKind, op: &Operation) -> Self {
        Self {
            kind,
            dictamen_articulo: op.dictamen_article.clone(),
            ley: op.affected_law.as_known().map(String::from),
            destino: op.target.as_ref().map(ToString::to_string),
            encabezado: op.header.clone(),
            leyes_mencionadas: Vec::new(),
        }
    }
}

/// List operations that need manual review, in document order.
pub fn audit(operations: &[Operation], report: &BatchReport) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    for op in operations {
        if let Some(mentioned) = foreign_mentions(op) {
            tracing::debug!(
                dictamen_article = %op.dictamen_article,
                mentioned = ?mentioned,
                "affected law not mentioned in operation text"
            );
            mismatches.push(Mismatch {
                leyes_mencionadas: mentioned,
                ..Mismatch::new(MismatchKind::LawMentionMismatch, op)
            });
        }
        let kind = match op.affected_law.as_known() {
            None if expects_no_law(&op.header) => None,
            None => Some(MismatchKind::UnknownLaw),
            Some(law) if report.missing_laws.contains_key(law) => Some(MismatchKind::LawTreeMissing),
            Some(_) if op.target.is_none() => Some(MismatchKind::UnresolvedTarget),
            Some(law) => match report.outcomes.get(law) {
                Some(outcome) if surfaced(op, &outcome.comparison) => None,
                _ => Some(MismatchKind::ArticleNotFoundInLaw),
            },
        };
        if let Some(kind) = kind {
            mismatches.push(Mismatch::new(kind, op));
        }
    }
    tracing::info!(mismatches = mismatches.len(), "audit complete");
    mismatches
}

/// Laws named in the header and replacement text, when there are some and
/// the affected law is not among them.
fn foreign_mentions(op: &Operation) -> Option<Vec<String>> {
    let law = op.affected_law.as_known()?;
    let mut mentioned = mentioned_laws(&op.header);
    if let Some(text) = &op.replacement_text {
        mentioned.extend(mentioned_laws(text));
        mentioned.sort();
        mentioned.dedup();
    }
    (!mentioned.is_empty() && !mentioned.iter().any(|m| m == law)).then_some(mentioned)
}

fn expects_no_law(header: &str) -> bool {
    let header = header.to_lowercase();
    NO_LAW_EXPECTED.iter().any(|phrase| header.contains(phrase))
}

fn surfaced(op: &Operation, comparison: &Comparison) -> bool {
    let metadata = &comparison.metadatos;
    if metadata.derogacion_total && op.action.is_derogation() {
        return true;
    }
    if let Some(Target::Chapter { number, .. }) = &op.target {
        if metadata.capitulos_derogados.iter().any(|c| same_division(c, number)) {
            return true;
        }
    }
    recorded_dictamen_articles(comparison).contains(op.dictamen_article.as_str())
}

fn recorded_dictamen_articles(comparison: &Comparison) -> BTreeSet<&str> {
    let chapters = comparison
        .ley
        .titulos
        .iter()
        .flat_map(|t| &t.capitulos)
        .filter_map(|c| c.dictamen_articulo.as_deref());
    comparison
        .articles()
        .filter_map(|a| a.dictamen_articulo.as_deref())
        .chain(chapters)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconcileConfig;
    use crate::service::ReconciliationService;
    use cotejo_shared::{Action, ArticleRef, LawNumber, NO_TITLE};
    use pretty_assertions::assert_eq;

    const LAW: &str = r#"{"numero": "20744", "nombre": "LCT", "titulos": [
        {"numero": "I", "nombre": "General", "articulos": [
            {"numero": "1", "titulo": "", "texto": "Uno."},
            {"numero": "2", "titulo": "", "texto": "Dos."}
        ]}
    ]}"#;

    fn op(dictamen: &str, header: &str, law: &str, target: Option<Target>) -> Operation {
        Operation {
            dictamen_article: dictamen.to_string(),
            title_context: NO_TITLE.to_string(),
            header: header.to_string(),
            action: Action::Derogates,
            target,
            affected_law: LawNumber::parse(law),
            replacement_text: None,
        }
    }

    fn article(n: u32) -> Option<Target> {
        Some(Target::article(ArticleRef::new(n, None)))
    }

    fn kinds(ops: &[Operation]) -> Vec<(String, MismatchKind)> {
        let mut service = ReconciliationService::new(ReconcileConfig::empty());
        service.load_law_json(LAW).unwrap();
        let report = service.reconcile_all(ops);
        audit(ops, &report)
            .into_iter()
            .map(|m| (m.dictamen_articulo, m.kind))
            .collect()
    }

    #[test]
    fn test_clean_dictamen_has_no_mismatches() {
        let ops = [op("1", "ARTÍCULO 1- Derógase el artículo 2", "20744", article(2))];
        assert!(kinds(&ops).is_empty());
    }

    #[test]
    fn test_every_kind_is_reported() {
        let ops = [
            op("1", "ARTÍCULO 1- Derógase el artículo 99", "20744", article(99)),
            op("2", "ARTÍCULO 2- Derógase algo", "UNKNOWN", None),
            op("3", "ARTÍCULO 3- Derógase el artículo 5", "24013", article(5)),
            op("4", "ARTÍCULO 4- Derógase lo que corresponda", "20744", None),
        ];
        assert_eq!(
            kinds(&ops),
            vec![
                ("1".to_string(), MismatchKind::ArticleNotFoundInLaw),
                ("2".to_string(), MismatchKind::UnknownLaw),
                ("3".to_string(), MismatchKind::LawTreeMissing),
                ("4".to_string(), MismatchKind::UnresolvedTarget),
            ]
        );
    }

    #[test]
    fn test_new_regimes_and_closings_are_skipped() {
        let ops = [
            op("10", "ARTÍCULO 10- Créase el Fondo de Asistencia Laboral.", "UNKNOWN", None),
            op("11", "ARTÍCULO 11- Comuníquese al Poder Ejecutivo Nacional.", "UNKNOWN", None),
        ];
        assert!(kinds(&ops).is_empty());
    }

    #[test]
    fn test_whole_law_derogation_covers_operations() {
        let ops = [
            op("1", "ARTÍCULO 1- Derógase la Ley N° 20.744.", "20744", Some(Target::WholeLaw { confirmed: true })),
            op("2", "ARTÍCULO 2- Derógase el artículo 77", "20744", article(77)),
        ];
        assert!(kinds(&ops).is_empty());
    }

    #[test]
    fn test_law_mention_mismatch() {
        let mut misattributed = op(
            "5",
            "ARTÍCULO 5- Derógase el artículo 2 de la Ley N° 25.323.",
            "20744",
            article(2),
        );
        let consistent = op("6", "ARTÍCULO 6- Derógase el artículo 1 de la Ley N° 20.744.", "20744", article(1));
        assert_eq!(
            kinds(&[misattributed.clone(), consistent]),
            vec![("5".to_string(), MismatchKind::LawMentionMismatch)]
        );

        let unnamed = op("7", "ARTÍCULO 7- Derógase el artículo 1 de esta ley.", "20744", article(1));
        assert!(foreign_mentions(&unnamed).is_none());

        misattributed.replacement_text = Some("Conforme la Ley N° 20.744 y sus modificatorias.".to_string());
        assert!(foreign_mentions(&misattributed).is_none());
    }

    #[test]
    fn test_law_mention_mismatch_lists_mentions() {
        let mut service = ReconciliationService::new(ReconcileConfig::empty());
        service.load_law_json(LAW).unwrap();
        let ops = [op(
            "5",
            "ARTÍCULO 5- Derógase el artículo 2 de la Ley N° 25.323 y la Ley N° 24.013.",
            "20744",
            article(2),
        )];
        let report = service.reconcile_all(&ops);
        let mismatches = audit(&ops, &report);
        assert_eq!(mismatches[0].kind, MismatchKind::LawMentionMismatch);
        assert_eq!(mismatches[0].leyes_mencionadas, vec!["24013".to_string(), "25323".to_string()]);
        let json = serde_json::to_value(&mismatches[0]).unwrap();
        assert_eq!(json["tipo"], "LAW_MENTION_MISMATCH");
    }

    #[test]
    fn test_mismatch_serialization() {
        let mismatch = Mismatch::new(
            MismatchKind::UnknownLaw,
            &op("2", "ARTÍCULO 2- Derógase algo", "UNKNOWN", None),
        );
        let json = serde_json::to_value(&mismatch).unwrap();
        assert_eq!(json["tipo"], "UNKNOWN_LAW");
        assert!(json.get("ley").is_none());
        assert!(json.get("leyes_mencionadas").is_none());
    }
}
