//! World struct for Cucumber BDD tests
//!
//! Holds the law tree, the operations and the reconciliation results of one
//! scenario.

use cotejo_engine::{reconcile, ComparedArticle, ReconcileConfig, ReconcileOutcome};
use cotejo_shared::{Action, Article, ArticleRef, Chapter, Law, LawNumber, Operation, Target, Title, NO_TITLE};
use cucumber::World;
use std::fmt;

/// Test world that holds state across steps in a Cucumber scenario.
#[derive(World)]
#[world(init = Self::new)]
pub struct CotejoWorld {
    pub law: Law,
    pub config: ReconcileConfig,
    /// Operations in dictamen order
    pub operations: Vec<Operation>,
    pub outcome: Option<ReconcileOutcome>,
    /// Serialized comparisons, one per reconciliation run
    pub runs: Vec<String>,
}

impl fmt::Debug for CotejoWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CotejoWorld")
            .field("law", &self.law.number)
            .field("articles", &self.law.article_count())
            .field("operations", &self.operations.len())
            .field("warnings", &self.outcome.as_ref().map(|o| o.warnings.len()))
            .field("runs", &self.runs.len())
            .finish()
    }
}

impl Default for CotejoWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CotejoWorld {
    pub fn new() -> Self {
        Self {
            law: Law::default(),
            config: ReconcileConfig::default(),
            operations: Vec::new(),
            outcome: None,
            runs: Vec::new(),
        }
    }

    /// Append an article to the tree, creating its Título and Capítulo on
    /// first mention. An empty chapter puts the article directly under the
    /// Título.
    pub fn add_article(&mut self, title: &str, chapter: &str, article: Article) {
        let position = match self.law.titles.iter().position(|t| t.number == title) {
            Some(position) => position,
            None => {
                self.law.titles.push(Title {
                    number: title.to_string(),
                    name: format!("Título {title}"),
                    ..Title::default()
                });
                self.law.titles.len() - 1
            }
        };
        let title = &mut self.law.titles[position];
        if chapter.is_empty() {
            title.articles.push(article);
            return;
        }
        match title.chapters.iter_mut().find(|c| c.number == chapter) {
            Some(existing) => existing.articles.push(article),
            None => title.chapters.push(Chapter {
                number: chapter.to_string(),
                name: format!("Capítulo {chapter}"),
                articles: vec![article],
            }),
        }
    }

    pub fn push_operation(&mut self, dictamen: &str, action: Action, target: Option<Target>, text: Option<String>) {
        let target_label = target.as_ref().map(ToString::to_string).unwrap_or_default();
        self.operations.push(Operation {
            dictamen_article: dictamen.to_string(),
            title_context: NO_TITLE.to_string(),
            header: format!("ARTÍCULO {dictamen}- {action} {target_label} de la Ley N° {}", self.law.number),
            action,
            target,
            affected_law: LawNumber::parse(&self.law.number),
            replacement_text: text,
        });
    }

    pub fn run_reconciliation(&mut self) {
        let outcome = reconcile(&self.law, &self.operations, &self.config);
        let json = outcome
            .comparison
            .to_json_pretty()
            .expect("comparison serializes");
        self.runs.push(json);
        self.outcome = Some(outcome);
    }

    pub fn outcome(&self) -> &ReconcileOutcome {
        self.outcome.as_ref().expect("the law has not been reconciled")
    }

    pub fn article(&self, number: &str) -> &ComparedArticle {
        self.outcome()
            .comparison
            .find_article(number)
            .unwrap_or_else(|| panic!("article {number} not in comparison"))
    }
}

/// Parse an article number written in a feature file.
pub fn article_ref(raw: &str) -> ArticleRef {
    ArticleRef::parse(raw).unwrap_or_else(|| panic!("invalid article number '{raw}'"))
}
