//! Change index: what the operations addressed to one law ask for.
//!
//! Article-level changes are keyed by article number, later operations
//! overwriting earlier ones (document order). Chapter derogations and the
//! whole-law derogation are collected separately because they apply by
//! position in the tree, not by number.

use std::collections::BTreeMap;

use cotejo_shared::{Action, ArticleRef, Operation, Target};

use crate::article_text::{split_articles, strip_inciso_marker};
use crate::comparison::SourceOperation;
use crate::warning::ReconcileWarning;

/// Identity of the operation behind a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSource {
    pub action: Action,
    pub dictamen_article: String,
}

impl ChangeSource {
    fn of(op: &Operation) -> Self {
        Self {
            action: op.action,
            dictamen_article: op.dictamen_article.clone(),
        }
    }

    /// Persisted form, with the verb as `accion`.
    pub fn to_source_operation(&self) -> SourceOperation {
        self.annotated("")
    }

    /// Persisted form with a qualifier after the verb (`"sustitúyese (inciso c)"`).
    pub fn annotated(&self, qualifier: &str) -> SourceOperation {
        let accion = if qualifier.is_empty() {
            self.action.verb().to_string()
        } else {
            format!("{} ({qualifier})", self.action.verb())
        };
        SourceOperation {
            accion,
            dictamen_articulo: self.dictamen_article.clone(),
        }
    }
}

/// Edit of one inciso of an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncisoEdit {
    Replace { letter: char, text: String },
    Remove { letter: char },
}

impl IncisoEdit {
    pub fn letter(&self) -> char {
        match self {
            IncisoEdit::Replace { letter, .. } | IncisoEdit::Remove { letter } => *letter,
        }
    }
}

/// Requested change for one article number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleChange {
    Substitute { source: ChangeSource, text: String },
    Derogate { source: ChangeSource },
    /// Insertion of a new article. Becomes a substitution if the number exists.
    Incorporate { source: ChangeSource, text: String },
    /// Accumulated inciso edits, in document order.
    Incisos { source: ChangeSource, edits: Vec<IncisoEdit> },
}

impl ArticleChange {
    pub fn source(&self) -> &ChangeSource {
        match self {
            ArticleChange::Substitute { source, .. }
            | ArticleChange::Derogate { source }
            | ArticleChange::Incorporate { source, .. }
            | ArticleChange::Incisos { source, .. } => source,
        }
    }
}

/// A chapter derogation, optionally scoped to a Título.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDerogation {
    pub number: String,
    pub title: Option<String>,
    pub source: ChangeSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WholeLawDerogation {
    pub confirmed: bool,
    pub source: ChangeSource,
}

/// Changes requested for one law, built from its operations in document order.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub articles: BTreeMap<ArticleRef, ArticleChange>,
    pub chapters: Vec<ChapterDerogation>,
    pub whole_law: Option<WholeLawDerogation>,
    pub warnings: Vec<ReconcileWarning>,
}

impl ChangeSet {
    pub fn build(operations: &[Operation]) -> Self {
        let mut changes = Self::default();
        for op in operations {
            changes.add(op);
        }
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.chapters.is_empty() && self.whole_law.is_none()
    }

    fn add(&mut self, op: &Operation) {
        let Some(target) = &op.target else {
            self.warn(ReconcileWarning::UnresolvedTarget {
                dictamen_article: op.dictamen_article.clone(),
            });
            return;
        };
        let source = ChangeSource::of(op);

        match target {
            Target::WholeLaw { confirmed } if op.action.is_derogation() => {
                let confirmed = *confirmed || self.whole_law.as_ref().is_some_and(|w| w.confirmed);
                self.whole_law = Some(WholeLawDerogation { confirmed, source });
            }
            Target::Chapter { number, title } if op.action.is_derogation() => {
                let duplicate = self
                    .chapters
                    .iter()
                    .any(|c| c.number.eq_ignore_ascii_case(number) && c.title == *title);
                if !duplicate {
                    self.chapters.push(ChapterDerogation {
                        number: number.clone(),
                        title: title.clone(),
                        source,
                    });
                }
            }
            Target::WholeLaw { .. } | Target::Chapter { .. } => {
                self.warn(ReconcileWarning::UnsupportedTarget {
                    dictamen_article: op.dictamen_article.clone(),
                    target: target.to_string(),
                });
            }
            Target::Article { article } => {
                self.add_article(op, *article, op.replacement_text.as_deref(), source);
            }
            Target::ArticleList { articles } => self.add_list(op, articles, source),
            Target::Inciso { letter, parent } => self.add_inciso(op, *letter, *parent, source),
        }
    }

    fn add_article(&mut self, op: &Operation, article: ArticleRef, text: Option<&str>, source: ChangeSource) {
        let change = if op.action.is_derogation() {
            ArticleChange::Derogate { source }
        } else {
            let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
                self.warn(ReconcileWarning::MissingReplacementText {
                    dictamen_article: op.dictamen_article.clone(),
                    article: article.to_string(),
                });
                return;
            };
            let text = text.to_string();
            if op.action.is_insertion() {
                ArticleChange::Incorporate { source, text }
            } else {
                ArticleChange::Substitute { source, text }
            }
        };
        if let Some(previous) = self.articles.insert(article, change) {
            tracing::debug!(
                article = %article,
                overwritten = %previous.source().dictamen_article,
                by = %op.dictamen_article,
                "later operation overwrites article change"
            );
        }
    }

    /// Each listed article gets its own `ARTÍCULO N` block of the replacement.
    fn add_list(&mut self, op: &Operation, articles: &[ArticleRef], source: ChangeSource) {
        let blocks = op
            .replacement_text
            .as_deref()
            .map(split_articles)
            .unwrap_or_default();
        for article in articles {
            let text = match blocks.iter().find(|(number, _)| number == article) {
                Some((_, block)) => Some(block.as_str()),
                None if articles.len() == 1 => op.replacement_text.as_deref(),
                None => None,
            };
            self.add_article(op, *article, text, source.clone());
        }
    }

    fn add_inciso(&mut self, op: &Operation, letter: char, parent: ArticleRef, source: ChangeSource) {
        let edit = if op.action.is_derogation() {
            IncisoEdit::Remove { letter }
        } else {
            match op.replacement_text.as_deref().map(strip_inciso_marker) {
                Some(text) if !text.is_empty() => IncisoEdit::Replace { letter, text },
                _ => {
                    self.warn(ReconcileWarning::MissingReplacementText {
                        dictamen_article: op.dictamen_article.clone(),
                        article: format!("{parent}, inciso {letter})"),
                    });
                    return;
                }
            }
        };

        match self.articles.get_mut(&parent) {
            Some(ArticleChange::Incisos { source: current, edits }) => {
                edits.retain(|e| e.letter() != letter);
                edits.push(edit);
                *current = source;
            }
            _ => {
                self.articles.insert(
                    parent,
                    ArticleChange::Incisos {
                        source,
                        edits: vec![edit],
                    },
                );
            }
        }
    }

    fn warn(&mut self, warning: ReconcileWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}
