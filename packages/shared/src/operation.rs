//! Amendment operations.
//!
//! One [`Operation`] per "ARTÍCULO N-" directive of a dictamen. Operations are
//! produced by the parser, optionally corrected by a manual overlay, and
//! consumed by the reconciliation engine. The engine does not care which of
//! the two produced them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::numbering::ArticleRef;

/// Title context used for operations that precede any Título heading.
pub const NO_TITLE: &str = "SIN_TITULO";

/// Sentinel persisted for an unresolved law number.
pub const UNKNOWN_LAW: &str = "UNKNOWN";

/// Operative verb of an amendment, persisted as the canonical Spanish form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "sustitúyese", alias = "sustituyese")]
    Substitutes,
    #[serde(rename = "incorpórase", alias = "incorporase")]
    Incorporates,
    #[serde(rename = "derógase", alias = "derogase")]
    Derogates,
    #[serde(rename = "modifícase", alias = "modificase")]
    Modifies,
    #[serde(rename = "suprímese", alias = "suprimese")]
    Suppresses,
    #[serde(rename = "reemplázase", alias = "reemplazase")]
    Replaces,
    #[serde(rename = "créase", alias = "crease")]
    Creates,
}

impl Action {
    /// Canonical Spanish verb.
    pub fn verb(self) -> &'static str {
        match self {
            Action::Substitutes => "sustitúyese",
            Action::Incorporates => "incorpórase",
            Action::Derogates => "derógase",
            Action::Modifies => "modifícase",
            Action::Suppresses => "suprímese",
            Action::Replaces => "reemplázase",
            Action::Creates => "créase",
        }
    }

    /// Map an accent-folded, lowercase inflection (`"sustituyense"`) to its action.
    pub fn from_folded_verb(word: &str) -> Option<Self> {
        const STEMS: [(&str, Action); 7] = [
            ("sustituy", Action::Substitutes),
            ("incorpor", Action::Incorporates),
            ("derog", Action::Derogates),
            ("modific", Action::Modifies),
            ("suprim", Action::Suppresses),
            ("reemplaz", Action::Replaces),
            ("cre", Action::Creates),
        ];
        STEMS
            .iter()
            .find(|(stem, _)| word.starts_with(stem))
            .map(|(_, action)| *action)
    }

    /// Derogates or suppresses.
    pub fn is_derogation(self) -> bool {
        matches!(self, Action::Derogates | Action::Suppresses)
    }

    /// Substitutes, modifies or replaces.
    pub fn is_substitution(self) -> bool {
        matches!(self, Action::Substitutes | Action::Modifies | Action::Replaces)
    }

    /// Incorporates or creates.
    pub fn is_insertion(self) -> bool {
        matches!(self, Action::Incorporates | Action::Creates)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// What an operation acts upon in the target statute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum Target {
    #[serde(rename = "articulo")]
    Article {
        #[serde(rename = "numero")]
        article: ArticleRef,
    },
    /// "los artículos 10, 16 y 21": one reference per listed number.
    #[serde(rename = "articulos")]
    ArticleList {
        #[serde(rename = "numeros")]
        articles: Vec<ArticleRef>,
    },
    #[serde(rename = "inciso")]
    Inciso {
        #[serde(rename = "letra")]
        letter: char,
        #[serde(rename = "articulo")]
        parent: ArticleRef,
    },
    #[serde(rename = "capitulo")]
    Chapter {
        #[serde(rename = "numero")]
        number: String,
        /// Enclosing Título when the header names one ("del Título III").
        #[serde(rename = "titulo", default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Derogation of the whole statute. `confirmed` is set when the header
    /// literally derogates "la ley" or an overlay asserted it; otherwise the
    /// target was inferred from the absence of any other target.
    #[serde(rename = "ley_completa")]
    WholeLaw {
        #[serde(rename = "confirmada", default)]
        confirmed: bool,
    },
}

impl Target {
    pub fn article(article: ArticleRef) -> Self {
        Target::Article { article }
    }

    /// Article references this target addresses individually.
    pub fn article_refs(&self) -> Vec<ArticleRef> {
        match self {
            Target::Article { article } => vec![*article],
            Target::ArticleList { articles } => articles.clone(),
            Target::Inciso { parent, .. } => vec![*parent],
            Target::Chapter { .. } | Target::WholeLaw { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Article { article } => write!(f, "artículo {article}"),
            Target::ArticleList { articles } => {
                let list: Vec<String> = articles.iter().map(ToString::to_string).collect();
                write!(f, "artículos {}", list.join(", "))
            }
            Target::Inciso { letter, parent } => write!(f, "inciso {letter}) del artículo {parent}"),
            Target::Chapter { number, title: Some(title) } => {
                write!(f, "capítulo {number} del título {title}")
            }
            Target::Chapter { number, title: None } => write!(f, "capítulo {number}"),
            Target::WholeLaw { .. } => f.write_str("ley completa"),
        }
    }
}

/// Statute identifier of an operation, or the `UNKNOWN` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LawNumber {
    Known(String),
    #[default]
    Unknown,
}

impl LawNumber {
    /// Build from a raw mention (`"20.744"`, `"Nº 20744"`, `"1285/58"`).
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == UNKNOWN_LAW {
            return LawNumber::Unknown;
        }
        let normalized = Self::normalize(raw);
        if normalized.chars().any(|c| c.is_ascii_digit()) {
            LawNumber::Known(normalized)
        } else {
            LawNumber::Unknown
        }
    }

    /// Keep digits and the decree-law year separator only.
    pub fn normalize(raw: &str) -> String {
        raw.chars()
            .filter(|c| c.is_ascii_digit() || *c == '/')
            .collect()
    }

    pub fn as_known(&self) -> Option<&str> {
        match self {
            LawNumber::Known(number) => Some(number),
            LawNumber::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, LawNumber::Unknown)
    }
}

impl fmt::Display for LawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_known().unwrap_or(UNKNOWN_LAW))
    }
}

impl From<String> for LawNumber {
    fn from(value: String) -> Self {
        LawNumber::parse(&value)
    }
}

impl From<LawNumber> for String {
    fn from(value: LawNumber) -> Self {
        value.to_string()
    }
}

/// One amendment directive of a dictamen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// The dictamen's own article number; an identifier, never a target.
    #[serde(rename = "dictamen_articulo")]
    pub dictamen_article: String,
    /// The dictamen's own Título, or [`NO_TITLE`].
    #[serde(rename = "titulo_dictamen")]
    pub title_context: String,
    #[serde(rename = "encabezado")]
    pub header: String,
    #[serde(rename = "accion")]
    pub action: Action,
    /// `None` when no target could be derived; such operations are reported.
    #[serde(rename = "destino", default)]
    pub target: Option<Target>,
    #[serde(rename = "ley_afectada", default)]
    pub affected_law: LawNumber,
    #[serde(rename = "texto_nuevo", default, skip_serializing_if = "Option::is_none")]
    pub replacement_text: Option<String>,
}

impl Operation {
    /// Whether this operation derogates the whole statute.
    pub fn is_whole_law_derogation(&self) -> bool {
        self.action.is_derogation() && matches!(self.target, Some(Target::WholeLaw { .. }))
    }
}
