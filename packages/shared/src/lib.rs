//! Cotejo shared types
//!
//! Canonical domain types used by both the dictamen parser and the
//! reconciliation engine:
//!
//! - [`law`]: the statute tree (Título → Capítulo → Artículo → Inciso)
//! - [`numbering`]: article numbers with Latin ordinal suffixes, Roman numerals
//! - [`operation`]: amendment operations, their actions and targets

pub mod law;
pub mod numbering;
pub mod operation;

pub use law::{Article, ArticleLocation, Chapter, DuplicateArticle, Inciso, Law, LawDocument, Title};
pub use numbering::{ArticleRef, OrdinalSuffix};
pub use operation::{Action, LawNumber, Operation, Target, NO_TITLE, UNKNOWN_LAW};
