//! End-to-end reconciliation of a labour reform dictamen against the LCT tree.

use std::path::PathBuf;

use cotejo_engine::{
    audit, reconcile, Comparison, Disposition, MismatchKind, ReconcileConfig, ReconciliationService,
};
use cotejo_shared::{Law, LawDocument, Operation};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_law() -> Law {
    let json = std::fs::read_to_string(fixture("ley_20744.json")).unwrap();
    serde_json::from_str::<LawDocument>(&json).unwrap().into_law()
}

fn load_operations() -> Vec<Operation> {
    let json = std::fs::read_to_string(fixture("ops_reforma.json")).unwrap();
    serde_json::from_str(&json).unwrap()
}

fn comparison() -> Comparison {
    let mut service = ReconciliationService::new(ReconcileConfig::default());
    service.load_law_file(&fixture("ley_20744.json")).unwrap();
    service
        .reconcile_law("20744", &load_operations())
        .unwrap()
        .comparison
}

fn numbers<'a>(articles: impl IntoIterator<Item = &'a cotejo_engine::ComparedArticle>) -> Vec<&'a str> {
    articles.into_iter().map(|a| a.numero.as_str()).collect()
}

#[test]
fn test_metadata_counts() {
    let metadata = comparison().metadatos;
    assert_eq!(metadata.ley_numero, "20744");
    assert_eq!(metadata.total_sustituciones, 2);
    assert_eq!(metadata.total_incorporaciones, 2);
    assert_eq!(metadata.total_derogaciones, 8);
    assert_eq!(metadata.capitulos_derogados, vec!["VIII".to_string()]);
    assert!(!metadata.derogacion_total);
    assert_eq!(metadata.advertencias.len(), 2);
}

#[test]
fn test_substitution_keeps_original_text() {
    let comparison = comparison();
    let article = comparison.find_article("2").unwrap();
    assert_eq!(article.estado, Disposition::Substituted);
    assert_eq!(article.dictamen_articulo.as_deref(), Some("1"));
    assert_eq!(article.titulo_nuevo.as_deref(), Some("Ámbito de aplicación."));
    assert!(article
        .texto_original
        .as_deref()
        .unwrap()
        .ends_with("resulte compatible:"));
    assert!(article
        .texto_nuevo
        .as_deref()
        .unwrap()
        .ends_with("naturaleza de la actividad."));
    assert_eq!(article.incisos.len(), 3);
}

#[test]
fn test_last_substitution_wins() {
    let comparison = comparison();
    let article = comparison.find_article("21").unwrap();
    assert_eq!(article.dictamen_articulo.as_deref(), Some("4"));
    assert!(article.texto_nuevo.as_deref().unwrap().contains("mediante remuneración"));
}

#[test]
fn test_incorporations_follow_reading_order() {
    let comparison = comparison();
    let titles = &comparison.ley.titulos;
    assert_eq!(numbers(&titles[0].articulos), vec!["1", "2", "2 bis", "3"]);
    assert_eq!(numbers(&titles[1].capitulos[1].articulos), vec!["29", "29 bis", "30"]);

    let incorporated = comparison.find_article("29 bis").unwrap();
    assert_eq!(incorporated.estado, Disposition::Incorporated);
    assert_eq!(incorporated.titulo, "Empresas de servicios eventuales.");
}

#[test]
fn test_chapter_fallback_synthesizes_seven_articles() {
    let comparison = comparison();
    let title = &comparison.ley.titulos[2];
    let chapters: Vec<&str> = title.capitulos.iter().map(|c| c.numero.as_str()).collect();
    assert_eq!(chapters, vec!["VII", "VIII"]);

    let chapter = &title.capitulos[1];
    assert_eq!(chapter.estado, Disposition::Derogated);
    assert_eq!(chapter.articulos.len(), 7);
    assert!(chapter.articulos.iter().all(|a| a.sintetico && a.estado == Disposition::Derogated));
    assert_eq!(chapter.articulos[0].numero, "CAP_VIII_ART_1");
    assert_eq!(chapter.articulos[6].dictamen_articulo.as_deref(), Some("7"));
}

#[test]
fn test_containers_reflect_changes() {
    let comparison = comparison();
    let title = &comparison.ley.titulos[2];
    assert_eq!(title.capitulos[0].estado, Disposition::Substituted);
    assert_eq!(comparison.find_article("84").unwrap().estado, Disposition::Unchanged);
    assert_eq!(comparison.find_article("85").unwrap().estado, Disposition::Derogated);
}

#[test]
fn test_reconciliation_is_deterministic() {
    let law = load_law();
    let ops: Vec<Operation> = load_operations()
        .into_iter()
        .filter(|op| op.affected_law.as_known() == Some("20744"))
        .collect();
    let config = ReconcileConfig::default();
    let first = reconcile(&law, &ops, &config).comparison.to_json_pretty().unwrap();
    let second = reconcile(&law, &ops, &config).comparison.to_json_pretty().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_batch_audit() {
    let mut service = ReconciliationService::default();
    service.load_law_file(&fixture("ley_20744.json")).unwrap();
    let ops = load_operations();
    let report = service.reconcile_all(&ops);

    assert_eq!(report.missing_laws.get("24013"), Some(&vec!["9".to_string()]));
    assert_eq!(report.unknown_law, vec!["10".to_string()]);

    let mismatches: Vec<(String, MismatchKind)> = audit(&ops, &report)
        .into_iter()
        .map(|m| (m.dictamen_articulo, m.kind))
        .collect();
    assert_eq!(
        mismatches,
        vec![
            ("3".to_string(), MismatchKind::ArticleNotFoundInLaw),
            ("8".to_string(), MismatchKind::ArticleNotFoundInLaw),
            ("9".to_string(), MismatchKind::LawTreeMissing),
        ]
    );
}
