//! Cotejo dictamen parser
//!
//! Turns the text lines of a dictamen (a legislative committee report that
//! amends existing statutes) into an ordered list of structured amendment
//! operations.
//!
//! Pipeline:
//!
//! 1. [`normalize`]: drop page furniture, collapse whitespace, rejoin
//!    hyphenated words
//! 2. [`lexer`] + [`header`]: classify lines into a typed token stream
//! 3. [`machine`]: capture headers and replacement texts per operation
//! 4. [`resolve`]: determine target and affected law of each operation
//!
//! A manual [`overlay`] can correct resolved operations afterwards.
//!
//! # Example
//!
//! ```
//! use cotejo_parser::{parse_dictamen, config::ResolverConfig};
//! use cotejo_shared::{Action, ArticleRef, LawNumber, Target};
//!
//! let lines = [
//!     "ARTÍCULO 5- Sustitúyese el artículo 30 de la Ley N° 20.744 por el siguiente: ARTÍCULO 30.- Texto nuevo.",
//! ];
//! let ops = parse_dictamen(&lines, &ResolverConfig::default());
//! assert_eq!(ops[0].action, Action::Substitutes);
//! assert_eq!(ops[0].target, Some(Target::article(ArticleRef::new(30, None))));
//! assert_eq!(ops[0].affected_law, LawNumber::Known("20744".to_string()));
//! assert!(ops[0].replacement_text.as_deref().unwrap().starts_with("ARTÍCULO 30.- Texto nuevo."));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod header;
pub mod lexer;
pub mod machine;
pub mod normalize;
pub mod overlay;
pub mod resolve;

pub use config::ResolverConfig;
pub use error::{ParserError, Result};
pub use machine::{OperationMachine, SealedOperation};
pub use overlay::Overlay;
pub use resolve::Resolver;

use cotejo_shared::Operation;

/// Parse raw dictamen lines into resolved operations, in document order.
pub fn parse_dictamen<S: AsRef<str>>(lines: &[S], config: &ResolverConfig) -> Vec<Operation> {
    let normalized = normalize::normalize_lines(lines);
    parse_normalized(&normalized, config)
}

/// Parse already-normalized lines.
pub fn parse_normalized(lines: &[String], config: &ResolverConfig) -> Vec<Operation> {
    let tokens = header::tokenize(lines);
    let resolver = Resolver::new(config);
    let operations: Vec<Operation> = OperationMachine::run(tokens)
        .into_iter()
        .map(|sealed| resolver.resolve(sealed))
        .collect();
    tracing::info!(operations = operations.len(), "dictamen parsed");
    operations
}

/// Parse a whole extracted text.
pub fn parse_dictamen_text(text: &str, config: &ResolverConfig) -> Vec<Operation> {
    parse_normalized(&normalize::normalize_text(text), config)
}
