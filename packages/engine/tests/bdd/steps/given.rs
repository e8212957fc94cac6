//! Given step definitions
//!
//! Steps that build the law tree and the dictamen operations.

use cotejo_engine::ReconcileConfig;
use cotejo_shared::{Action, Article, Target};
use cucumber::{gherkin::Step, given};

use crate::world::{article_ref, CotejoWorld};

// =============================================================================
// Law tree steps
// =============================================================================

#[given(expr = "the law {string} with the following articles:")]
fn law_with_articles(world: &mut CotejoWorld, number: String, step: &Step) {
    world.law.number = number;
    world.law.name = "Ley de Contrato de Trabajo".to_string();

    let table = step.table.as_ref().expect("articles table");
    let header = &table.rows[0];
    let column = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .unwrap_or_else(|| panic!("missing column '{name}'"))
    };
    let (title, chapter, number, text) = (column("titulo"), column("capitulo"), column("numero"), column("texto"));

    for row in table.rows.iter().skip(1) {
        let article = Article {
            number: row[number].clone(),
            body_text: row[text].clone(),
            ..Article::default()
        };
        world.add_article(&row[title], &row[chapter], article);
    }
}

#[given("no chapter fallbacks are configured")]
fn no_chapter_fallbacks(world: &mut CotejoWorld) {
    world.config = ReconcileConfig::empty();
}

// =============================================================================
// Operation steps
// =============================================================================

#[given(expr = "dictamen article {string} substitutes article {string} with:")]
fn substitutes_article(world: &mut CotejoWorld, dictamen: String, article: String, step: &Step) {
    let text = step.docstring.clone().expect("replacement text docstring");
    let target = Target::article(article_ref(&article));
    world.push_operation(&dictamen, Action::Substitutes, Some(target), Some(text.trim().to_string()));
}

#[given(expr = "dictamen article {string} incorporates article {string} with:")]
fn incorporates_article(world: &mut CotejoWorld, dictamen: String, article: String, step: &Step) {
    let text = step.docstring.clone().expect("replacement text docstring");
    let target = Target::article(article_ref(&article));
    world.push_operation(&dictamen, Action::Incorporates, Some(target), Some(text.trim().to_string()));
}

#[given(expr = "dictamen article {string} derogates article {string}")]
fn derogates_article(world: &mut CotejoWorld, dictamen: String, article: String) {
    let target = Target::article(article_ref(&article));
    world.push_operation(&dictamen, Action::Derogates, Some(target), None);
}

#[given(expr = "dictamen article {string} derogates chapter {string} of title {string}")]
fn derogates_chapter(world: &mut CotejoWorld, dictamen: String, chapter: String, title: String) {
    let target = Target::Chapter {
        number: chapter,
        title: Some(title),
    };
    world.push_operation(&dictamen, Action::Derogates, Some(target), None);
}

#[given(expr = "dictamen article {string} derogates the whole law")]
fn derogates_whole_law(world: &mut CotejoWorld, dictamen: String) {
    let target = Target::WholeLaw { confirmed: true };
    world.push_operation(&dictamen, Action::Derogates, Some(target), None);
}

#[given(expr = "dictamen article {string} derogates the law without naming what")]
fn derogates_inferred_whole_law(world: &mut CotejoWorld, dictamen: String) {
    let target = Target::WholeLaw { confirmed: false };
    world.push_operation(&dictamen, Action::Derogates, Some(target), None);
}
