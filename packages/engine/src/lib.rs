//! Cotejo reconciliation engine
//!
//! Projects the amendment operations of a dictamen onto the tree of each
//! affected statute and produces a comparison tree: every article of the
//! original law with its disposition (`sin_cambios`, `sustituido`,
//! `derogado`, `incorporado`), the original and new texts side by side, and
//! the operation responsible for each change.
//!
//! - [`index`]: fold a law's operations into a last-writer-wins change set
//! - [`reconcile`]: walk the tree applying whole-law, chapter and article changes
//! - [`insertion`]: place incorporated articles in legal reading order
//! - [`service`]: hold many law trees and reconcile a whole dictamen
//! - [`audit`]: list operations that did not surface in any tree
//!
//! # Example
//!
//! ```
//! use cotejo_engine::{reconcile, Disposition, ReconcileConfig};
//! use cotejo_shared::{Action, ArticleRef, Law, LawDocument, LawNumber, Operation, Target, NO_TITLE};
//!
//! let law: Law = serde_json::from_str::<LawDocument>(r#"{"numero": "20744", "nombre": "LCT", "titulos": [
//!     {"numero": "I", "nombre": "General", "articulos": [{"numero": "2", "titulo": "", "texto": "Viejo."}]}
//! ]}"#).unwrap().into_law();
//!
//! let op = Operation {
//!     dictamen_article: "1".to_string(),
//!     title_context: NO_TITLE.to_string(),
//!     header: "ARTÍCULO 1- Sustitúyese el artículo 2 de la Ley N° 20.744".to_string(),
//!     action: Action::Substitutes,
//!     target: Some(Target::article(ArticleRef::new(2, None))),
//!     affected_law: LawNumber::parse("20744"),
//!     replacement_text: Some("ARTÍCULO 2.- Nuevo.".to_string()),
//! };
//!
//! let outcome = reconcile(&law, &[op], &ReconcileConfig::empty());
//! let article = outcome.comparison.find_article("2").unwrap();
//! assert_eq!(article.estado, Disposition::Substituted);
//! assert_eq!(article.texto_original.as_deref(), Some("Viejo."));
//! ```

pub mod article_text;
pub mod audit;
pub mod comparison;
pub mod config;
pub mod error;
pub mod index;
pub mod insertion;
pub mod reconcile;
pub mod service;
pub mod warning;

pub use audit::{audit, Mismatch, MismatchKind};
pub use comparison::{
    ComparedArticle, ComparedChapter, ComparedLaw, ComparedTitle, Comparison, Disposition, Metadata,
};
pub use config::ReconcileConfig;
pub use error::{EngineError, Result};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use service::{comparison_file_name, BatchReport, ReconciliationService};
pub use warning::ReconcileWarning;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
