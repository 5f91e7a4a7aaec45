use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, PoisonError, RwLock},
};

use crate::cards::{Card, CardId, Colour};

/// Colour bucket of a sheet. Lands and colourless cards share one bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Colour(Colour),
    Colourless,
}

/// A named, weighted pool of cards that pack slots draw from.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    pub balance_colours: bool,

    /// Sum of all weights in `cards`.
    pub total_weight: u64,
    pub cards: BTreeMap<CardId, u64>,

    /// The same weight mass as `cards`, split by colour. A multicoloured
    /// card's weight is divided evenly between its colours.
    pub cards_by_colour: BTreeMap<Bucket, BTreeMap<CardId, f64>>,
}

impl Sheet {
    pub fn new(balance_colours: bool) -> Self {
        Self {
            balance_colours,
            ..Default::default()
        }
    }

    pub fn add(&mut self, card: &Card, weight: u32) {
        *self.cards.entry(card.id).or_default() += u64::from(weight);
        self.total_weight += u64::from(weight);

        if card.is_land() || card.colours.is_empty() {
            self.add_to_bucket(Bucket::Colourless, card.id, f64::from(weight));
        } else {
            let share = f64::from(weight) / card.colours.len() as f64;
            for &colour in &card.colours {
                self.add_to_bucket(Bucket::Colour(colour), card.id, share);
            }
        }
    }

    fn add_to_bucket(&mut self, bucket: Bucket, card: CardId, weight: f64) {
        *self
            .cards_by_colour
            .entry(bucket)
            .or_default()
            .entry(card)
            .or_default() += weight;
    }

    pub fn bucket(&self, bucket: Bucket) -> Option<&BTreeMap<CardId, f64>> {
        self.cards_by_colour.get(&bucket)
    }

    pub fn bucket_weight(&self, bucket: Bucket) -> f64 {
        self.bucket(bucket)
            .map(|cards| cards.values().sum())
            .unwrap_or(0.0)
    }
}

/// One weighted way of filling a pack: how many cards to draw from each sheet.
#[derive(Clone, Debug)]
pub struct BoosterConfig {
    pub weight: u32,
    pub sheets: BTreeMap<String, usize>,
}

#[derive(Clone, Debug, Default)]
pub struct SetRules {
    /// Sum of the weights of all configurations.
    pub total_weight: u64,
    pub boosters: Vec<BoosterConfig>,
    pub sheets: HashMap<String, Sheet>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RulesVersion {
    /// Content hash of the feed the rules were built from.
    pub sha: String,

    /// Older rule books stored unweighted commons sheets and must be rebuilt
    /// regardless of hash.
    pub commons_have_weights: bool,
}

#[derive(Debug, Default)]
pub struct RuleBook {
    pub version: RulesVersion,

    /// Map from uppercased set code to rules.
    sets: HashMap<String, SetRules>,
}

impl RuleBook {
    pub fn new(version: RulesVersion, sets: HashMap<String, SetRules>) -> Self {
        Self { version, sets }
    }

    pub fn get(&self, code: &str) -> Option<&SetRules> {
        self.sets.get(&code.to_uppercase())
    }

    pub fn size(&self) -> usize {
        self.sets.len()
    }
}

/// Holds the current rule book. Readers take an `Arc` snapshot and work on
/// that; a rebuild swaps in a complete new book so no reader can see a half
/// built one.
pub struct RuleStore {
    current: RwLock<Arc<RuleBook>>,
}

impl RuleStore {
    pub fn new(book: RuleBook) -> Self {
        Self {
            current: RwLock::new(Arc::new(book)),
        }
    }

    pub fn snapshot(&self) -> Arc<RuleBook> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace(&self, book: RuleBook) {
        let book = Arc::new(book);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = book;
    }

    pub fn version(&self) -> RulesVersion {
        self.snapshot().version.clone()
    }

    /// Whether a feed with the given hash should be ingested.
    pub fn needs_refresh(&self, sha: &str) -> bool {
        let current = self.version();
        if current.sha == sha && current.commons_have_weights {
            tracing::info!("Found same booster rules version ({sha}). Skipping ingestion.");
            return false;
        }
        if current.sha != sha {
            tracing::info!(
                "Found different booster rules version (current: {} new: {sha}).",
                current.sha
            );
        }
        if !current.commons_have_weights {
            tracing::info!("Current booster rules are incompatible with weighted commons.");
        }
        true
    }
}
