//! Law-number resolution for dictámenes that amend several statutes.
//!
//! Every law mention in the header is collected (named aliases and numeric
//! "Ley N° …" forms) and classified as direct or cross-reference. Ranking:
//!
//! 1. direct mentions proximate to the operative verb, aliases first
//! 2. direct mentions anywhere in the header, aliases first
//! 3. the statute the dictamen Título amends, when the header says
//!    "de la ley" / "esta ley"
//! 4. cross-reference mentions
//! 5. `UNKNOWN`

use std::sync::LazyLock;

use cotejo_shared::LawNumber;
use regex::Regex;

use crate::config::{ResolverConfig, CROSS_REFERENCE_WINDOW, LAW_PROXIMITY_WINDOW, MIN_LAW_NUMBER_DIGITS};
use crate::normalize::fold;
use crate::resolve::target::{header_tail, verb_span};

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMERIC_LAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bley(?:es)?\s+(?:nacional\s+)?(?:(?:n[°º]|nro\.?|numero)\s*)?(\d{1,3}(?:\.\d{3})+|\d{4,6})\b",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NAMED_NUMERIC_LAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bley\b[^;:()]{1,80}?\b(?:n[°º]|nro\.?|numero)\s*(\d{1,3}(?:\.\d{3})+|\d{4,6})\b")
        .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DECREE_LAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bdecreto\s*-?\s*ley\s+(?:(?:n[°º]|nro\.?)\s*)?(\d+(?:[./]\d+)*)").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MentionKind {
    Alias,
    Numeric,
}

#[derive(Debug, Clone)]
struct Mention {
    start: usize,
    law: String,
    kind: MentionKind,
    cross_reference: bool,
}

/// Resolves the affected statute of an operation.
#[derive(Debug, Clone)]
pub struct LawResolver {
    aliases: Vec<(String, String)>,
    title_laws: Vec<(String, String)>,
    cross_reference_markers: Vec<String>,
    contextual_cues: Vec<String>,
}

impl LawResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        let fold_all = |items: &[String]| items.iter().map(|s| fold(s)).collect::<Vec<_>>();
        Self {
            aliases: config
                .law_aliases
                .iter()
                .map(|a| (fold(&a.pattern), LawNumber::normalize(&a.law)))
                .collect(),
            title_laws: config
                .title_laws
                .iter()
                .map(|(title, law)| (title.clone(), LawNumber::normalize(law)))
                .collect(),
            cross_reference_markers: fold_all(&config.cross_reference_markers),
            contextual_cues: fold_all(&config.contextual_cues),
        }
    }

    /// Resolve the statute an operation header amends.
    ///
    /// # Examples
    /// ```
    /// use cotejo_parser::config::ResolverConfig;
    /// use cotejo_parser::resolve::LawResolver;
    /// use cotejo_shared::LawNumber;
    ///
    /// let resolver = LawResolver::new(&ResolverConfig::default());
    /// let law = resolver.resolve("ARTÍCULO 5- Sustitúyese el artículo 30 de la Ley N° 20.744", "I");
    /// assert_eq!(law, LawNumber::Known("20744".to_string()));
    /// ```
    pub fn resolve(&self, header: &str, title_context: &str) -> LawNumber {
        let tail = header_tail(header);
        let mentions = self.mentions(&tail);
        let (verb_start, verb_end) = verb_span(&tail).unwrap_or((0, 0));
        let proximate = |m: &&Mention| {
            let distance = if m.start >= verb_end {
                m.start - verb_end
            } else {
                verb_start.saturating_sub(m.start)
            };
            distance <= LAW_PROXIMITY_WINDOW
        };

        let direct: Vec<&Mention> = mentions.iter().filter(|m| !m.cross_reference).collect();
        let crossed: Vec<&Mention> = mentions.iter().filter(|m| m.cross_reference).collect();
        let near: Vec<&Mention> = direct.iter().copied().filter(proximate).collect();

        if let Some(law) = pick(&near).or_else(|| pick(&direct)) {
            return LawNumber::Known(law);
        }
        if let Some(law) = self.contextual_law(&tail, title_context) {
            tracing::debug!(title = title_context, law = %law, "law inferred from title context");
            return LawNumber::Known(law);
        }
        if let Some(law) = pick(&crossed) {
            tracing::debug!(law = %law, "law taken from a cross-reference mention");
            return LawNumber::Known(law);
        }
        LawNumber::Unknown
    }

    fn mentions(&self, tail: &str) -> Vec<Mention> {
        let mut mentions = Vec::new();
        for (pattern, law) in &self.aliases {
            for (start, _) in tail.match_indices(pattern.as_str()) {
                mentions.push(self.mention(tail, start, law.clone(), MentionKind::Alias));
            }
        }
        for (start, law) in numeric_mentions(tail) {
            mentions.push(self.mention(tail, start, law, MentionKind::Numeric));
        }
        mentions.sort_by_key(|m| m.start);
        mentions
    }

    fn mention(&self, tail: &str, start: usize, law: String, kind: MentionKind) -> Mention {
        let window = &tail[window_start(tail, start, CROSS_REFERENCE_WINDOW)..start];
        let cross_reference = self
            .cross_reference_markers
            .iter()
            .any(|marker| window.contains(marker.as_str()));
        Mention {
            start,
            law,
            kind,
            cross_reference,
        }
    }

    fn contextual_law(&self, tail: &str, title_context: &str) -> Option<String> {
        if !self.contextual_cues.iter().any(|cue| tail.contains(cue.as_str())) {
            return None;
        }
        self.title_laws
            .iter()
            .find(|(title, _)| title.eq_ignore_ascii_case(title_context))
            .map(|(_, law)| law.clone())
    }
}

/// Numbered law mentions ("Ley N° 20.744", "ley de empleo N° 24.013",
/// "Decreto-Ley 1285/58") in folded text, as (byte offset, normalized number).
fn numeric_mentions(folded: &str) -> Vec<(usize, String)> {
    let mut mentions = Vec::new();
    for regex in [&*NUMERIC_LAW, &*NAMED_NUMERIC_LAW, &*DECREE_LAW] {
        for caps in regex.captures_iter(folded) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let law = LawNumber::normalize(number.as_str());
            if law.chars().filter(char::is_ascii_digit).count() >= MIN_LAW_NUMBER_DIGITS {
                mentions.push((whole.start(), law));
            }
        }
    }
    mentions
}

/// Distinct law numbers mentioned anywhere in a text, sorted.
///
/// Only numbered mentions count; name aliases depend on the corpus
/// configuration.
///
/// # Examples
/// ```
/// use cotejo_parser::resolve::mentioned_laws;
///
/// let laws = mentioned_laws("Sustitúyese, conforme la Ley N° 26.727, el artículo 2 de la Ley 20744");
/// assert_eq!(laws, vec!["20744".to_string(), "26727".to_string()]);
/// ```
pub fn mentioned_laws(text: &str) -> Vec<String> {
    let mut laws: Vec<String> = numeric_mentions(&fold(text)).into_iter().map(|(_, law)| law).collect();
    laws.sort();
    laws.dedup();
    laws
}

/// Alias mentions outrank numeric ones; within a kind the earliest wins.
fn pick(mentions: &[&Mention]) -> Option<String> {
    mentions
        .iter()
        .find(|m| m.kind == MentionKind::Alias)
        .or_else(|| mentions.first())
        .map(|m| m.law.clone())
}

/// Byte offset at most `width` characters before `pos`, on a char boundary.
fn window_start(text: &str, pos: usize, width: usize) -> usize {
    text[..pos]
        .char_indices()
        .rev()
        .nth(width.saturating_sub(1))
        .map_or(0, |(i, _)| i)
}
