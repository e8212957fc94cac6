//! Conditions reconciliation reports instead of failing on.

use std::fmt;

/// A reportable condition found while reconciling one law.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileWarning {
    /// The same article number appears twice in one scope of the source tree.
    DuplicateArticleNumber { scope: String, number: String },
    /// An operation addressed to this law has no target.
    UnresolvedTarget { dictamen_article: String },
    /// The target kind cannot be applied with this action.
    UnsupportedTarget { dictamen_article: String, target: String },
    /// A substitution or incorporation carries no replacement text.
    MissingReplacementText { dictamen_article: String, article: String },
    /// A substituted or derogated article does not exist in the tree.
    ArticleNotFound { dictamen_article: String, article: String },
    /// An incorporation names an article that already exists; applied as a substitution.
    IncorporationOfExistingArticle { dictamen_article: String, article: String },
    /// An incorporation was skipped because the whole law is derogated.
    IncorporationUnderWholeLawDerogation { dictamen_article: String, article: String },
    /// The law has no Título to receive an incorporated article.
    NoInsertionPoint { dictamen_article: String, article: String },
    /// A derogated chapter does not exist in the tree and has no fallback.
    ChapterNotFound { dictamen_article: String, chapter: String },
    /// A derogated chapter has no articles and no fallback.
    EmptyDerogatedChapter { dictamen_article: String, chapter: String },
    /// Placeholder articles were synthesized for a derogated chapter.
    ChapterFallbackApplied { dictamen_article: String, chapter: String, articles: usize },
    /// A whole-law derogation inferred from a missing target; needs confirmation.
    UnconfirmedWholeLawDerogation { dictamen_article: String },
}

impl ReconcileWarning {
    /// Dictamen article the condition comes from, if any.
    pub fn dictamen_article(&self) -> Option<&str> {
        match self {
            ReconcileWarning::DuplicateArticleNumber { .. } => None,
            ReconcileWarning::UnresolvedTarget { dictamen_article }
            | ReconcileWarning::UnsupportedTarget { dictamen_article, .. }
            | ReconcileWarning::MissingReplacementText { dictamen_article, .. }
            | ReconcileWarning::ArticleNotFound { dictamen_article, .. }
            | ReconcileWarning::IncorporationOfExistingArticle { dictamen_article, .. }
            | ReconcileWarning::IncorporationUnderWholeLawDerogation { dictamen_article, .. }
            | ReconcileWarning::NoInsertionPoint { dictamen_article, .. }
            | ReconcileWarning::ChapterNotFound { dictamen_article, .. }
            | ReconcileWarning::EmptyDerogatedChapter { dictamen_article, .. }
            | ReconcileWarning::ChapterFallbackApplied { dictamen_article, .. }
            | ReconcileWarning::UnconfirmedWholeLawDerogation { dictamen_article } => {
                Some(dictamen_article)
            }
        }
    }
}

impl fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileWarning::DuplicateArticleNumber { scope, number } => {
                write!(f, "duplicate article number {number} in {scope}")
            }
            ReconcileWarning::UnresolvedTarget { dictamen_article } => {
                write!(f, "dictamen article {dictamen_article}: no target resolved")
            }
            ReconcileWarning::UnsupportedTarget {
                dictamen_article,
                target,
            } => write!(
                f,
                "dictamen article {dictamen_article}: target '{target}' cannot be applied with this action"
            ),
            ReconcileWarning::MissingReplacementText {
                dictamen_article,
                article,
            } => write!(
                f,
                "dictamen article {dictamen_article}: no replacement text for article {article}"
            ),
            ReconcileWarning::ArticleNotFound {
                dictamen_article,
                article,
            } => write!(
                f,
                "dictamen article {dictamen_article}: article {article} not found in law"
            ),
            ReconcileWarning::IncorporationOfExistingArticle {
                dictamen_article,
                article,
            } => write!(
                f,
                "dictamen article {dictamen_article}: incorporated article {article} already exists, applied as substitution"
            ),
            ReconcileWarning::IncorporationUnderWholeLawDerogation {
                dictamen_article,
                article,
            } => write!(
                f,
                "dictamen article {dictamen_article}: incorporation of article {article} skipped, whole law is derogated"
            ),
            ReconcileWarning::NoInsertionPoint {
                dictamen_article,
                article,
            } => write!(
                f,
                "dictamen article {dictamen_article}: no título to receive article {article}"
            ),
            ReconcileWarning::ChapterNotFound {
                dictamen_article,
                chapter,
            } => write!(
                f,
                "dictamen article {dictamen_article}: derogated chapter {chapter} not found in law"
            ),
            ReconcileWarning::EmptyDerogatedChapter {
                dictamen_article,
                chapter,
            } => write!(
                f,
                "dictamen article {dictamen_article}: derogated chapter {chapter} has no articles"
            ),
            ReconcileWarning::ChapterFallbackApplied {
                dictamen_article,
                chapter,
                articles,
            } => write!(
                f,
                "dictamen article {dictamen_article}: {articles} placeholder articles synthesized for chapter {chapter}"
            ),
            ReconcileWarning::UnconfirmedWholeLawDerogation { dictamen_article } => write!(
                f,
                "dictamen article {dictamen_article}: whole-law derogation inferred from a missing target, confirm manually"
            ),
        }
    }
}
