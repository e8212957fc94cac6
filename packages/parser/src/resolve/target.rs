//! Target resolution.
//!
//! Priority cascade over the folded header tail (the header with the
//! dictamen's own `ARTÍCULO N-` marker removed) and the captured body:
//!
//! 1. chapter derogation ("derógase el capítulo VIII del título III")
//! 2. inciso of an article ("sustitúyese el inciso c) del artículo 92")
//! 3. article list ("derógANSE los artículos 10, 16 y 21", "incorpóranse
//!    como artículos 92 quater y 92 quinquies")
//! 4. incorporation as a numbered article ("incorpórase como artículo 92 quater")
//! 5. article named right after the verb
//! 6. any later "artículo N" in the header
//!
//! For single-article targets the article heading at the start of the body
//! overrides the header number, since the body is the statute text itself.
//! A derogation with no target at all becomes a whole-law derogation.

use std::sync::LazyLock;

use cotejo_shared::numbering::SUFFIX_PATTERN;
use cotejo_shared::{Action, ArticleRef, Target};
use regex::Regex;

use crate::normalize::fold;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DICTAMEN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*articulo\s+\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?\s*[°º]?\s*[-–—]\s*"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EMBEDDED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\sarticulo\s+\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?\s*[°º]?\s*[-–—]\s"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:sustituye|incorpora|deroga|modifica|suprime|reemplaza|crea)n?se\b")
        .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CHAPTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:deroga|suprime)n?se\s+(?:el\s+|en\s+su\s+totalidad\s+el\s+)?capitulo\s+([ivxlcdm]+|\d+)\b(?:\s*,?\s*del\s+titulo\s+([ivxlcdm]+|\d+)\b)?",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INCISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:sustituye|incorpora|deroga|modifica|suprime|reemplaza)n?se\b(.{{0,60}}?)\binciso\s+([a-z])\s*\)?\s*,?\s*(?:del|al)\s+articulo\s+(\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?)"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_LIST: LazyLock<Regex> = LazyLock::new(|| {
    let num = format!(r"\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?\s*[°º]?");
    Regex::new(&format!(
        r"\b(?:sustituye|incorpora|deroga|modifica|suprime|reemplaza)n?se\s+(?:como\s+(?:nuevos\s+)?|los\s+)articulos\s+({num}(?:\s*(?:,|\by\b|\be\b)\s*{num})+)"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?")).expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INCORPORATED_AS: LazyLock<Regex> = LazyLock::new(|| {
    let num = format!(r"\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?\s*[°º]?");
    Regex::new(&format!(
        r"\bincorporan?se\b(.{{0,120}}?)\bcomo\s+(?:nuevos?\s+)?articulos?\s+({num}(?:\s*(?:,|\by\b|\be\b)\s*{num})*)"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static AFTER_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:sustituye|incorpora|deroga|modifica|suprime|reemplaza|crea)n?se\s+(?:el\s+)?(?:(?:texto|primer|segundo|tercer|ultimo)\s+(?:parrafo\s+)?del\s+)?(?:nuevo\s+)?articulo\s+(\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?)"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ANY_ARTICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\barticulo\s+(\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?)"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BODY_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"^\s*["“«]?\s*articulo\s+(\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?)\s*[°º]?\s*[.\-–—]"#
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EXPLICIT_WHOLE_LAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:deroga|suprime)n?se\s+(?:en\s+todos\s+sus\s+terminos\s+)?(?:la\s+ley|el\s+decreto\s*-?\s*ley|el\s+decreto)\b",
    )
    .expect("valid regex")
});

/// Folded header with the dictamen's own article marker removed, cut
/// before any later dictamen marker run into it.
pub(crate) fn header_tail(header: &str) -> String {
    let folded = fold(header);
    let tail = DICTAMEN_MARKER.replace(&folded, "");
    match EMBEDDED_MARKER.find(&tail) {
        Some(m) => tail[..m.start()].to_string(),
        None => tail.into_owned(),
    }
}

/// Byte range of the first operative verb in a folded tail.
pub(crate) fn verb_span(tail: &str) -> Option<(usize, usize)> {
    VERB.find(tail).map(|m| (m.start(), m.end()))
}

/// Resolve the target of an operation from its header and captured body.
///
/// # Examples
/// ```
/// use cotejo_parser::resolve::resolve_target;
/// use cotejo_shared::{Action, ArticleRef, Target};
///
/// let target = resolve_target(
///     "ARTÍCULO 5- Sustitúyese el artículo 30 de la Ley N° 20.744 por el siguiente:",
///     Action::Substitutes,
///     Some("ARTÍCULO 30.- Texto nuevo."),
/// );
/// assert_eq!(target, Some(Target::article(ArticleRef::new(30, None))));
/// ```
pub fn resolve_target(header: &str, action: Action, body: Option<&str>) -> Option<Target> {
    let tail = header_tail(header);

    if action.is_derogation() {
        if let Some(chapter) = chapter_target(&tail) {
            return Some(chapter);
        }
    }
    if let Some(inciso) = inciso_target(&tail) {
        return Some(inciso);
    }
    if let Some(list) = article_list_target(&tail) {
        return Some(list);
    }
    let incorporated = incorporated_as(&tail);
    if incorporated.len() > 1 {
        return Some(Target::ArticleList { articles: incorporated });
    }

    let header_article = incorporated
        .into_iter()
        .next()
        .or_else(|| after_verb(&tail))
        .or_else(|| later_mention(&tail));
    let body_article = body.and_then(body_head_article);

    match (body_article, header_article) {
        (Some(from_body), Some(from_header)) => {
            if from_body != from_header {
                tracing::debug!(
                    header = %from_header,
                    body = %from_body,
                    "header and body disagree on the article; using the body"
                );
            }
            Some(Target::article(from_body))
        }
        (Some(article), None) | (None, Some(article)) => Some(Target::article(article)),
        (None, None) if action.is_derogation() => Some(Target::WholeLaw {
            confirmed: EXPLICIT_WHOLE_LAW.is_match(&tail),
        }),
        (None, None) => None,
    }
}

fn chapter_target(tail: &str) -> Option<Target> {
    let caps = CHAPTER.captures(tail)?;
    Some(Target::Chapter {
        number: caps[1].to_uppercase(),
        title: caps.get(2).map(|m| m.as_str().to_uppercase()),
    })
}

fn inciso_target(tail: &str) -> Option<Target> {
    let caps = INCISO.captures(tail)?;
    // "sustitúyese el artículo 30 ... inciso a) del artículo 5" is a
    // cross-reference, not an inciso edit.
    if caps[1].contains("articulo") {
        return None;
    }
    let letter = caps[2].chars().next()?;
    let parent = ArticleRef::parse(&caps[3])?;
    Some(Target::Inciso { letter, parent })
}

fn article_list_target(tail: &str) -> Option<Target> {
    let caps = ARTICLE_LIST.captures(tail)?;
    let mut articles = article_numbers(&caps[1]);
    match articles.len() {
        0 => None,
        1 => articles.pop().map(Target::article),
        _ => Some(Target::ArticleList { articles }),
    }
}

/// Distinct article numbers of a "10, 16 bis y 21" enumeration, in order.
fn article_numbers(list: &str) -> Vec<ArticleRef> {
    let mut articles: Vec<ArticleRef> = Vec::new();
    for m in ARTICLE_NUMBER.find_iter(list) {
        if let Some(article) = ArticleRef::parse(m.as_str()) {
            if !articles.contains(&article) {
                articles.push(article);
            }
        }
    }
    articles
}

fn incorporated_as(tail: &str) -> Vec<ArticleRef> {
    match INCORPORATED_AS.captures(tail) {
        Some(caps) if !caps[1].contains("articulo") => article_numbers(&caps[2]),
        _ => Vec::new(),
    }
}

fn after_verb(tail: &str) -> Option<ArticleRef> {
    AFTER_VERB
        .captures(tail)
        .and_then(|caps| ArticleRef::parse(&caps[1]))
}

fn later_mention(tail: &str) -> Option<ArticleRef> {
    let start = verb_span(tail).map_or(0, |(_, end)| end);
    ANY_ARTICLE
        .captures(&tail[start..])
        .and_then(|caps| ArticleRef::parse(&caps[1]))
}

/// Article number declared at the head of a replacement text
/// (`ARTÍCULO 30.- ...`).
pub fn body_head_article(body: &str) -> Option<ArticleRef> {
    let folded = fold(body);
    BODY_HEAD
        .captures(&folded)
        .and_then(|caps| ArticleRef::parse(&caps[1]))
}
