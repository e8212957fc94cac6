//! Statute tree: Law → Título → Capítulo → Artículo → Inciso.
//!
//! The persisted form uses the Spanish field names produced by the statute
//! normalizer (`numero`, `nombre`, `titulos`, `articulos`, `capitulos`,
//! `titulo`, `texto`, `incisos`, `letra`). Numbers may arrive as JSON
//! strings, numbers or `null`; they are always read as strings.

use serde::{Deserialize, Deserializer, Serialize};

use crate::numbering::{same_division, ArticleRef};

/// A statute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Law {
    #[serde(rename = "numero", default, deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(rename = "nombre", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "titulos", default)]
    pub titles: Vec<Title>,
}

/// A Título: articles declared directly under it plus its chapters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Title {
    #[serde(rename = "numero", default, deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(rename = "nombre", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "articulos", default)]
    pub articles: Vec<Article>,
    #[serde(rename = "capitulos", default)]
    pub chapters: Vec<Chapter>,
}

/// A Capítulo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(rename = "numero", default, deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(rename = "nombre", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "articulos", default)]
    pub articles: Vec<Article>,
}

/// An Artículo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "numero", default, deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(rename = "titulo", default, deserialize_with = "lenient_string")]
    pub title_text: String,
    #[serde(rename = "texto", default, deserialize_with = "lenient_string")]
    pub body_text: String,
    #[serde(default)]
    pub incisos: Vec<Inciso>,
}

/// A lettered inciso of an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inciso {
    #[serde(rename = "letra", default, deserialize_with = "lenient_string")]
    pub letter: String,
    #[serde(rename = "texto", default, deserialize_with = "lenient_string")]
    pub text: String,
}

/// Law JSON as written by the statute normalizer (`{"ley": {...}}`) or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LawDocument {
    Wrapped { ley: Law },
    Bare(Law),
}

impl LawDocument {
    pub fn into_law(self) -> Law {
        match self {
            LawDocument::Wrapped { ley } => ley,
            LawDocument::Bare(law) => law,
        }
    }
}

/// Where an article lives in the tree.
#[derive(Debug, Clone, Copy)]
pub struct ArticleLocation<'a> {
    pub title: &'a Title,
    pub chapter: Option<&'a Chapter>,
    pub article: &'a Article,
}

/// An article number declared more than once within one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateArticle {
    /// Human-readable scope, e.g. `"Título II, Capítulo I"`.
    pub scope: String,
    pub number: String,
}

impl Law {
    /// Every article in document order: a title's direct articles first,
    /// then each of its chapters.
    pub fn articles(&self) -> impl Iterator<Item = ArticleLocation<'_>> {
        self.titles.iter().flat_map(|title| {
            let direct = title.articles.iter().map(move |article| ArticleLocation {
                title,
                chapter: None,
                article,
            });
            let nested = title.chapters.iter().flat_map(move |chapter| {
                chapter.articles.iter().map(move |article| ArticleLocation {
                    title,
                    chapter: Some(chapter),
                    article,
                })
            });
            direct.chain(nested)
        })
    }

    pub fn article_count(&self) -> usize {
        self.articles().count()
    }

    /// First article whose number parses to `target`.
    pub fn find_article(&self, target: &ArticleRef) -> Option<ArticleLocation<'_>> {
        self.articles()
            .find(|loc| loc.article.reference().as_ref() == Some(target))
    }

    pub fn contains_article(&self, target: &ArticleRef) -> bool {
        self.find_article(target).is_some()
    }

    /// Locate a chapter by number, optionally restricted to one Título.
    pub fn find_chapter(&self, number: &str, title: Option<&str>) -> Option<(&Title, &Chapter)> {
        self.titles
            .iter()
            .filter(|t| title.is_none_or(|wanted| same_division(&t.number, wanted)))
            .find_map(|t| {
                t.chapters
                    .iter()
                    .find(|c| same_division(&c.number, number))
                    .map(|c| (t, c))
            })
    }

    /// Article numbers repeated within a title's direct list or within a
    /// chapter. Source anomalies are reported, never merged.
    pub fn duplicate_articles(&self) -> Vec<DuplicateArticle> {
        let mut duplicates = Vec::new();
        for title in &self.titles {
            let scope = format!("Título {}", title.number);
            collect_duplicates(&scope, &title.articles, &mut duplicates);
            for chapter in &title.chapters {
                let scope = format!("Título {}, Capítulo {}", title.number, chapter.number);
                collect_duplicates(&scope, &chapter.articles, &mut duplicates);
            }
        }
        duplicates
    }
}

fn collect_duplicates(scope: &str, articles: &[Article], out: &mut Vec<DuplicateArticle>) {
    let mut seen: Vec<&str> = Vec::with_capacity(articles.len());
    for article in articles {
        let number = article.number.trim();
        if number.is_empty() {
            continue;
        }
        if seen.contains(&number)
            && !out.iter().any(|d| d.scope == scope && d.number == number)
        {
            out.push(DuplicateArticle {
                scope: scope.to_string(),
                number: number.to_string(),
            });
        }
        seen.push(number);
    }
}

impl Title {
    /// Direct articles followed by chapter articles.
    pub fn all_articles(&self) -> impl Iterator<Item = &Article> {
        self.articles
            .iter()
            .chain(self.chapters.iter().flat_map(|c| c.articles.iter()))
    }

    /// Lowest and highest article base number in the title, suffixes ignored.
    pub fn article_range(&self) -> Option<(u32, u32)> {
        range_of(self.all_articles())
    }
}

impl Chapter {
    pub fn article_range(&self) -> Option<(u32, u32)> {
        range_of(self.articles.iter())
    }
}

fn range_of<'a>(articles: impl Iterator<Item = &'a Article>) -> Option<(u32, u32)> {
    articles
        .filter_map(|a| a.reference())
        .fold(None, |range, r| match range {
            None => Some((r.base, r.base)),
            Some((lo, hi)) => Some((lo.min(r.base), hi.max(r.base))),
        })
}

impl Article {
    pub fn reference(&self) -> Option<ArticleRef> {
        ArticleRef::parse(&self.number)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Integer(n)) => n.to_string(),
        Some(Scalar::Float(f)) => f.to_string(),
        Some(Scalar::Flag(b)) => b.to_string(),
        None => String::new(),
    })
}
