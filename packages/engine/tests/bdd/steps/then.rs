//! Then step definitions
//!
//! Steps that inspect the comparison tree and its metadata.

use cucumber::then;

use crate::world::CotejoWorld;

// =============================================================================
// Article steps
// =============================================================================

#[then(expr = "article {string} is {string}")]
fn article_disposition(world: &mut CotejoWorld, number: String, estado: String) {
    let article = world.article(&number);
    let actual = serde_json::to_value(&article.estado).unwrap();
    assert_eq!(actual, estado, "disposition of article {number}");
}

#[then(expr = "article {string} comes from dictamen article {string}")]
fn article_source(world: &mut CotejoWorld, number: String, dictamen: String) {
    let article = world.article(&number);
    assert_eq!(article.dictamen_articulo.as_deref(), Some(dictamen.as_str()));
}

#[then(expr = "article {string} has action {string}")]
fn article_action(world: &mut CotejoWorld, number: String, action: String) {
    let article = world.article(&number);
    assert_eq!(article.accion.as_deref(), Some(action.as_str()));
}

#[then(expr = "article {string} has new text {string}")]
fn article_new_text(world: &mut CotejoWorld, number: String, text: String) {
    let article = world.article(&number);
    assert_eq!(article.texto_nuevo.as_deref(), Some(text.as_str()));
}

#[then(expr = "article {string} keeps original text {string}")]
fn article_original_text(world: &mut CotejoWorld, number: String, text: String) {
    let article = world.article(&number);
    assert_eq!(article.texto_original.as_deref(), Some(text.as_str()));
}

#[then(expr = "article {string} has text {string}")]
fn article_text(world: &mut CotejoWorld, number: String, text: String) {
    assert_eq!(world.article(&number).texto, text);
}

// =============================================================================
// Structure steps
// =============================================================================

#[then(expr = "title {string} lists articles {string}")]
fn title_order(world: &mut CotejoWorld, title: String, expected: String) {
    let title = world
        .outcome()
        .comparison
        .ley
        .titulos
        .iter()
        .find(|t| t.numero == title)
        .unwrap_or_else(|| panic!("title {title} not in comparison"));
    let actual: Vec<&str> = title.all_articles().map(|a| a.numero.as_str()).collect();
    let expected: Vec<&str> = expected.split(',').map(str::trim).collect();
    assert_eq!(actual, expected);
}

#[then(expr = "chapter {string} of title {string} is {string} with {int} synthetic articles")]
fn chapter_synthetic(world: &mut CotejoWorld, chapter: String, title: String, estado: String, count: usize) {
    let chapter = world
        .outcome()
        .comparison
        .ley
        .titulos
        .iter()
        .filter(|t| t.numero == title)
        .flat_map(|t| &t.capitulos)
        .find(|c| c.numero == chapter)
        .unwrap_or_else(|| panic!("chapter {chapter} of title {title} not in comparison"));
    assert_eq!(serde_json::to_value(&chapter.estado).unwrap(), estado);
    assert_eq!(chapter.articulos.iter().filter(|a| a.sintetico).count(), count);
}

#[then("every article is derogated")]
fn every_article_derogated(world: &mut CotejoWorld) {
    let comparison = &world.outcome().comparison;
    for article in comparison.articles() {
        assert_eq!(
            serde_json::to_value(&article.estado).unwrap(),
            "derogado",
            "article {}",
            article.numero
        );
    }
}

// =============================================================================
// Metadata steps
// =============================================================================

#[then(expr = "the comparison counts {int} substitutions, {int} incorporations and {int} derogations")]
fn metadata_counts(world: &mut CotejoWorld, substitutions: usize, incorporations: usize, derogations: usize) {
    let metadata = &world.outcome().comparison.metadatos;
    assert_eq!(metadata.total_sustituciones, substitutions);
    assert_eq!(metadata.total_incorporaciones, incorporations);
    assert_eq!(metadata.total_derogaciones, derogations);
}

#[then("the whole law is marked as derogated")]
fn whole_law_derogated(world: &mut CotejoWorld) {
    assert!(world.outcome().comparison.metadatos.derogacion_total);
}

#[then(expr = "a warning mentions {string}")]
fn warning_mentions(world: &mut CotejoWorld, fragment: String) {
    let warnings = &world.outcome().comparison.metadatos.advertencias;
    assert!(
        warnings.iter().any(|w| w.contains(&fragment)),
        "no warning mentions '{fragment}': {warnings:?}"
    );
}

#[then("there are no warnings")]
fn no_warnings(world: &mut CotejoWorld) {
    assert!(world.outcome().warnings.is_empty(), "{:?}", world.outcome().warnings);
}

#[then("both comparisons are identical")]
fn identical_runs(world: &mut CotejoWorld) {
    assert_eq!(world.runs.len(), 2);
    assert_eq!(world.runs[0], world.runs[1]);
}
