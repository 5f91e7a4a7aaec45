use rand::Rng;

use crate::{
    cards::{Card, CardDatabase},
    error::{BoosterError, Res},
    sets::SetDatabase,
};

use self::{
    compose::{compose_default, compose_from_rules, Composition},
    ingest::{build_rule_book, FeedDocument},
    rules::{RuleBook, RuleStore},
};

mod compose;
pub mod handlers;
pub mod ingest;
pub mod rules;
mod sheets;
mod weighted;

#[derive(Clone, Debug, serde::Serialize)]
pub struct BoosterCard {
    #[serde(flatten)]
    pub card: Card,
    pub foil: bool,
}

impl BoosterCard {
    pub fn new(card: Card, foil: bool) -> Self {
        Self { card, foil }
    }
}

pub type Pack = Vec<BoosterCard>;

/// Everything needed to open boosters. The catalog and sets are fixed for the
/// life of the process; the rules can be rebuilt at any time.
pub struct BoosterGenerator {
    catalog: CardDatabase,
    sets: SetDatabase,
    rules: RuleStore,
}

impl BoosterGenerator {
    pub fn new(catalog: CardDatabase, sets: SetDatabase) -> Self {
        Self {
            catalog,
            sets,
            rules: RuleStore::new(RuleBook::default()),
        }
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Ingest a feed if its version differs from the current rules. Returns
    /// whether the rules were replaced.
    pub fn refresh_rules(&self, document: &FeedDocument) -> bool {
        if !self.rules.needs_refresh(&document.sha) {
            return false;
        }

        let book = build_rule_book(document, &self.sets, &self.catalog);
        tracing::info!("Built booster rules for {} sets.", book.size());
        self.rules.replace(book);
        true
    }

    /// Open a booster of the given set. Sets with booster rules follow them,
    /// and fall back to the default booster if the rules can't produce a pack.
    /// Only fails if the set doesn't exist.
    pub fn generate_booster<R: Rng + ?Sized>(&self, code: &str, rng: &mut R) -> Res<Pack> {
        let Some(set) = self.sets.get(code) else {
            return Err(BoosterError::UnknownSet(code.to_string()));
        };

        let book = self.rules.snapshot();
        let Some(rules) = book.get(&set.code) else {
            return Ok(compose_default(rng, set, &self.catalog));
        };

        match compose_from_rules(rng, rules, &self.catalog) {
            Composition::Pack(pack) => Ok(pack),
            Composition::NeedsFallback(e) => {
                tracing::warn!(
                    "Could not produce a booster of {}. Falling back to default booster. {e}",
                    set.code
                );
                Ok(compose_default(rng, set, &self.catalog))
            }
        }
    }
}
