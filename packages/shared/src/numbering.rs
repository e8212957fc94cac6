//! Article and division numbering.
//!
//! Statute article numbers are not a dense integer sequence: article
//! "29 bis" sits between "29" and "30". The law tree keeps numbers as the
//! strings found in the source document and parses them into an
//! [`ArticleRef`] whenever they have to be compared or ordered.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Regex alternation matching every ordinal suffix, for use inside patterns.
pub const SUFFIX_PATTERN: &str = "bis|ter|quater|quinquies|sexies|septies|octies|nonies|decies";

/// Latin ordinal suffix of an article number, declared in legal reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrdinalSuffix {
    Bis,
    Ter,
    Quater,
    Quinquies,
    Sexies,
    Septies,
    Octies,
    Nonies,
    Decies,
}

impl OrdinalSuffix {
    /// All suffixes in reading order.
    pub const ALL: [OrdinalSuffix; 9] = [
        OrdinalSuffix::Bis,
        OrdinalSuffix::Ter,
        OrdinalSuffix::Quater,
        OrdinalSuffix::Quinquies,
        OrdinalSuffix::Sexies,
        OrdinalSuffix::Septies,
        OrdinalSuffix::Octies,
        OrdinalSuffix::Nonies,
        OrdinalSuffix::Decies,
    ];

    /// Lowercase Latin spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            OrdinalSuffix::Bis => "bis",
            OrdinalSuffix::Ter => "ter",
            OrdinalSuffix::Quater => "quater",
            OrdinalSuffix::Quinquies => "quinquies",
            OrdinalSuffix::Sexies => "sexies",
            OrdinalSuffix::Septies => "septies",
            OrdinalSuffix::Octies => "octies",
            OrdinalSuffix::Nonies => "nonies",
            OrdinalSuffix::Decies => "decies",
        }
    }

    /// Sort rank of the suffix. A number without suffix ranks 0.
    pub fn rank(self) -> u8 {
        match self {
            OrdinalSuffix::Bis => 1,
            OrdinalSuffix::Ter => 2,
            OrdinalSuffix::Quater => 3,
            OrdinalSuffix::Quinquies => 4,
            OrdinalSuffix::Sexies => 5,
            OrdinalSuffix::Septies => 6,
            OrdinalSuffix::Octies => 7,
            OrdinalSuffix::Nonies => 8,
            OrdinalSuffix::Decies => 9,
        }
    }

    /// Parse a suffix word, ignoring case and surrounding whitespace.
    pub fn parse(word: &str) -> Option<Self> {
        let word = word.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == word)
    }
}

impl fmt::Display for OrdinalSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a valid article number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidArticleNumber(pub String);

impl fmt::Display for InvalidArticleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid article number: '{}'", self.0)
    }
}

impl std::error::Error for InvalidArticleNumber {}

/// A parsed article number: numeric base plus optional ordinal suffix.
///
/// The derived ordering is legal reading order: by base, then no suffix
/// before `bis` before `ter` and so on. Serialized as its display form
/// (`"29 bis"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArticleRef {
    pub base: u32,
    pub suffix: Option<OrdinalSuffix>,
}

impl ArticleRef {
    pub fn new(base: u32, suffix: Option<OrdinalSuffix>) -> Self {
        Self { base, suffix }
    }

    /// Parse an article number as written in statutes or amendment headers.
    ///
    /// Accepts degree marks, a trailing `.`/`-`, and a suffix either
    /// separated or glued to the digits (`"29bis"`).
    ///
    /// # Examples
    /// ```
    /// use cotejo_shared::numbering::{ArticleRef, OrdinalSuffix};
    ///
    /// let r = ArticleRef::parse("29 BIS").unwrap();
    /// assert_eq!(r, ArticleRef::new(29, Some(OrdinalSuffix::Bis)));
    /// assert_eq!(ArticleRef::parse("245°").unwrap().to_string(), "245");
    /// assert!(ArticleRef::parse("S/N").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw.chars().filter(|c| !matches!(c, '°' | 'º')).collect();
        let cleaned = cleaned.trim().trim_end_matches(['.', '-']).trim();
        let digits_end = cleaned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(cleaned.len());
        if digits_end == 0 {
            return None;
        }
        let base = cleaned[..digits_end].parse().ok()?;
        let rest = cleaned[digits_end..].trim();
        if rest.is_empty() {
            return Some(Self::new(base, None));
        }
        OrdinalSuffix::parse(rest).map(|suffix| Self::new(base, Some(suffix)))
    }

    /// Sort key `(base, suffix rank)`.
    pub fn sort_key(&self) -> (u32, u8) {
        (self.base, self.suffix.map_or(0, OrdinalSuffix::rank))
    }
}

impl fmt::Display for ArticleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suffix {
            Some(suffix) => write!(f, "{} {}", self.base, suffix),
            None => write!(f, "{}", self.base),
        }
    }
}

impl TryFrom<String> for ArticleRef {
    type Error = InvalidArticleNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ArticleRef::parse(&value).ok_or(InvalidArticleNumber(value))
    }
}

impl From<ArticleRef> for String {
    fn from(value: ArticleRef) -> Self {
        value.to_string()
    }
}

/// Sort key for a raw article number string.
///
/// Unparseable numbers (placeholders such as `"S/N"`) sort after every
/// numbered article.
pub fn sort_key(raw: &str) -> (u32, u8) {
    ArticleRef::parse(raw).map_or((u32::MAX, 0), |r| r.sort_key())
}

/// Canonical display form of an article number, or the trimmed input when
/// it cannot be parsed.
pub fn normalize_article_number(raw: &str) -> String {
    ArticleRef::parse(raw).map_or_else(|| raw.trim().to_string(), |r| r.to_string())
}

/// Value of a Roman numeral (`"VIII"` → 8). Returns `None` for anything
/// that is not a well-formed numeral made of I, V, X, L, C, D and M.
pub fn roman_value(numeral: &str) -> Option<u32> {
    let numeral = numeral.trim();
    if numeral.is_empty() {
        return None;
    }
    let digit = |c: char| match c.to_ascii_uppercase() {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    };
    let values: Vec<u32> = numeral.chars().map(digit).collect::<Option<_>>()?;
    let mut total = 0;
    for (i, value) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if next > value => total -= *value as i64,
            _ => total += *value as i64,
        }
    }
    u32::try_from(total).ok().filter(|v| *v > 0)
}

/// Numeric value of a Título/Capítulo number written in Roman or Arabic digits.
pub fn division_value(number: &str) -> Option<u32> {
    let number = number.trim();
    number.parse().ok().or_else(|| roman_value(number))
}

/// Whether two Título/Capítulo numbers designate the same division.
///
/// `"VIII"`, `"viii"` and `"8"` are all the same chapter.
pub fn same_division(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if a.eq_ignore_ascii_case(b) {
        return !a.is_empty();
    }
    matches!((division_value(a), division_value(b)), (Some(x), Some(y)) if x == y)
}
