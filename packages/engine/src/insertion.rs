//! Where an incorporated article goes.
//!
//! The Título is chosen by article-number range (suffixes ignored): the one
//! whose range contains the new number, else the one whose range ends
//! closest below it, else the last Título with articles. Inside the Título
//! the article joins the list that already holds its base number (so
//! `29 bis` lands next to `29`), else the Título's direct articles.

use cotejo_shared::numbering::{sort_key, ArticleRef};

use crate::comparison::{ComparedArticle, ComparedTitle};

/// Destination list of an incorporated article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    pub title: usize,
    /// `None` for the Título's direct article list.
    pub chapter: Option<usize>,
}

pub fn locate(titles: &[ComparedTitle], article: ArticleRef) -> Option<InsertionPoint> {
    let title = choose_title(titles, article.base)?;
    let chapter = choose_list(&titles[title], article.base);
    Some(InsertionPoint { title, chapter })
}

/// Insert and restore legal reading order in the destination list.
pub fn insert(titles: &mut [ComparedTitle], point: InsertionPoint, article: ComparedArticle) {
    let Some(title) = titles.get_mut(point.title) else {
        return;
    };
    let list = match point.chapter.and_then(|i| title.capitulos.get_mut(i)) {
        Some(chapter) => &mut chapter.articulos,
        None => &mut title.articulos,
    };
    list.push(article);
    sort_articles(list);
}

/// Stable sort by (base, suffix rank); unnumbered articles go last.
pub fn sort_articles(articles: &mut [ComparedArticle]) {
    articles.sort_by_key(|a| sort_key(&a.numero));
}

fn base_range<'a>(articles: impl Iterator<Item = &'a ComparedArticle>) -> Option<(u32, u32)> {
    articles
        .filter_map(|a| ArticleRef::parse(&a.numero))
        .fold(None, |range, r| match range {
            None => Some((r.base, r.base)),
            Some((lo, hi)) => Some((lo.min(r.base), hi.max(r.base))),
        })
}

fn choose_title(titles: &[ComparedTitle], base: u32) -> Option<usize> {
    let ranges: Vec<(usize, (u32, u32))> = titles
        .iter()
        .enumerate()
        .filter_map(|(i, t)| base_range(t.all_articles()).map(|r| (i, r)))
        .collect();

    if let Some((i, _)) = ranges.iter().find(|(_, (lo, hi))| (*lo..=*hi).contains(&base)) {
        return Some(*i);
    }

    let mut below: Option<(usize, u32)> = None;
    for (i, (_, hi)) in &ranges {
        if *hi < base && below.is_none_or(|(_, best)| *hi > best) {
            below = Some((*i, *hi));
        }
    }
    if let Some((i, _)) = below {
        return Some(i);
    }

    ranges
        .last()
        .map(|(i, _)| *i)
        .or_else(|| titles.len().checked_sub(1))
}

fn choose_list(title: &ComparedTitle, base: u32) -> Option<usize> {
    let has_base = |articles: &[ComparedArticle]| {
        articles
            .iter()
            .any(|a| ArticleRef::parse(&a.numero).is_some_and(|r| r.base == base))
    };
    if has_base(title.articulos.as_slice()) {
        return None;
    }
    title.capitulos.iter().position(|c| has_base(c.articulos.as_slice()))
}
