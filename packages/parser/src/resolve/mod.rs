//! Target and law resolution for sealed operations.

pub mod law;
pub mod target;

pub use law::{mentioned_laws, LawResolver};
pub use target::{body_head_article, resolve_target};

use cotejo_shared::Operation;

use crate::config::ResolverConfig;
use crate::machine::SealedOperation;

/// Turns sealed operations into fully resolved [`Operation`]s.
#[derive(Debug, Clone)]
pub struct Resolver {
    laws: LawResolver,
}

impl Resolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            laws: LawResolver::new(config),
        }
    }

    /// Resolve target and affected law of one sealed operation.
    pub fn resolve(&self, sealed: SealedOperation) -> Operation {
        let target = resolve_target(&sealed.header, sealed.action, sealed.body.as_deref());
        let affected_law = self.laws.resolve(&sealed.header, &sealed.title_context);
        if target.is_none() {
            tracing::debug!(dictamen_article = %sealed.dictamen_article, "no target resolved");
        }
        Operation {
            dictamen_article: sealed.dictamen_article,
            title_context: sealed.title_context,
            header: sealed.header,
            action: sealed.action,
            target,
            affected_law,
            replacement_text: sealed.body,
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}
