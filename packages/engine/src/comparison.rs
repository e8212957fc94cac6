//! Comparison tree: the law tree annotated with what the dictamen does to it.
//!
//! Built fresh by every reconciliation and never mutated afterwards. The
//! persisted field names are the Spanish ones downstream reports consume.

use cotejo_shared::{Article, Inciso};
use serde::{Deserialize, Serialize};

use crate::config::UNNUMBERED_ARTICLE;

/// Outcome for one node of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    #[serde(rename = "sin_cambios")]
    Unchanged,
    #[serde(rename = "sustituido")]
    Substituted,
    #[serde(rename = "derogado")]
    Derogated,
    #[serde(rename = "incorporado")]
    Incorporated,
}

/// Operation that produced a disposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOperation {
    pub accion: String,
    pub dictamen_articulo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedArticle {
    pub numero: String,
    pub titulo: String,
    pub texto: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incisos: Vec<Inciso>,
    pub estado: Disposition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texto_original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texto_nuevo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulo_nuevo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incisos_originales: Option<Vec<Inciso>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incisos_nuevos: Option<Vec<Inciso>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictamen_articulo: Option<String>,
    /// Placeholder article synthesized for a chapter without enumerable articles.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sintetico: bool,
}

impl ComparedArticle {
    /// An unchanged copy of a source article.
    pub fn unchanged(article: &Article) -> Self {
        let numero = match article.number.trim() {
            "" => UNNUMBERED_ARTICLE.to_string(),
            n => n.to_string(),
        };
        Self {
            numero,
            titulo: article.title_text.clone(),
            texto: article.body_text.clone(),
            incisos: article.incisos.clone(),
            estado: Disposition::Unchanged,
            texto_original: None,
            texto_nuevo: None,
            titulo_nuevo: None,
            incisos_originales: None,
            incisos_nuevos: None,
            accion: None,
            dictamen_articulo: None,
            sintetico: false,
        }
    }

    /// Mark as derogated; the stored text is kept as is.
    pub fn derogate(mut self, source: SourceOperation) -> Self {
        self.estado = Disposition::Derogated;
        self.record(source)
    }

    pub(crate) fn record(mut self, source: SourceOperation) -> Self {
        self.accion = Some(source.accion);
        self.dictamen_articulo = Some(source.dictamen_articulo);
        self
    }

    pub fn is_changed(&self) -> bool {
        self.estado != Disposition::Unchanged
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedChapter {
    pub numero: String,
    pub nombre: String,
    pub estado: Disposition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictamen_articulo: Option<String>,
    pub articulos: Vec<ComparedArticle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedTitle {
    pub numero: String,
    pub nombre: String,
    pub estado: Disposition,
    pub articulos: Vec<ComparedArticle>,
    pub capitulos: Vec<ComparedChapter>,
}

impl ComparedTitle {
    /// Direct articles followed by chapter articles.
    pub fn all_articles(&self) -> impl Iterator<Item = &ComparedArticle> {
        self.articulos
            .iter()
            .chain(self.capitulos.iter().flat_map(|c| c.articulos.iter()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedLaw {
    pub numero: String,
    pub nombre: String,
    pub titulos: Vec<ComparedTitle>,
}

/// Tree-level summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub ley_numero: String,
    pub total_sustituciones: usize,
    pub total_incorporaciones: usize,
    pub total_derogaciones: usize,
    pub capitulos_derogados: Vec<String>,
    pub derogacion_total: bool,
    /// Reconciliation warnings, rendered.
    #[serde(default)]
    pub advertencias: Vec<String>,
}

/// Reconciliation result as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub ley: ComparedLaw,
    pub metadatos: Metadata,
}

impl Comparison {
    pub fn articles(&self) -> impl Iterator<Item = &ComparedArticle> {
        self.ley.titulos.iter().flat_map(ComparedTitle::all_articles)
    }

    /// First article whose `numero` equals `number` after normalization.
    pub fn find_article(&self, number: &str) -> Option<&ComparedArticle> {
        let wanted = cotejo_shared::numbering::normalize_article_number(number);
        self.articles()
            .find(|a| cotejo_shared::numbering::normalize_article_number(&a.numero) == wanted)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Disposition of a container from its own derogation flag and its articles.
///
/// Derogated when explicitly derogated or when it holds at least one article
/// and all of them are derogated; substituted when anything inside changed.
pub fn container_disposition<'a>(
    explicitly_derogated: bool,
    articles: impl IntoIterator<Item = &'a ComparedArticle>,
) -> Disposition {
    if explicitly_derogated {
        return Disposition::Derogated;
    }
    let mut any = false;
    let mut all_derogated = true;
    let mut changed = false;
    for article in articles {
        any = true;
        all_derogated &= article.estado == Disposition::Derogated;
        changed |= article.is_changed();
    }
    if any && all_derogated {
        Disposition::Derogated
    } else if changed {
        Disposition::Substituted
    } else {
        Disposition::Unchanged
    }
}
