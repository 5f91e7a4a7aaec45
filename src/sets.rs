use std::{collections::HashMap, fmt::Debug, path::Path};

use crate::cards::{mtgjson::read_json, Card, CardDatabase, CardId, Rarity};

/// Commons in a default booster unless the set says otherwise.
const DEFAULT_PACK_SIZE: usize = 10;

fn default_pack_size() -> usize {
    DEFAULT_PACK_SIZE
}

/// Set metadata as stored on disk. The card pools themselves are derived from
/// the catalog.
#[derive(serde::Deserialize, Debug)]
pub struct SetInfo {
    code: String,

    #[serde(default)]
    name: String,

    /// Number of commons in a default booster.
    #[serde(default = "default_pack_size")]
    size: usize,
}

#[derive(Clone)]
pub struct Set {
    pub code: String,
    pub name: String,
    pub size: usize,
    pub basics: Vec<CardId>,
    pub commons: Vec<CardId>,
    pub uncommons: Vec<CardId>,
    pub rares: Vec<CardId>,
    pub mythics: Vec<CardId>,

    /// Map from collector number to card.
    cards_by_number: HashMap<String, CardId>,
}

impl Set {
    pub fn new(code: &str, name: &str, size: usize) -> Self {
        Self {
            code: code.to_uppercase(),
            name: name.to_string(),
            size,
            basics: Vec::new(),
            commons: Vec::new(),
            uncommons: Vec::new(),
            rares: Vec::new(),
            mythics: Vec::new(),
            cards_by_number: HashMap::new(),
        }
    }

    pub fn add(&mut self, card: &Card) {
        self.cards_by_number.insert(card.number.clone(), card.id);

        if card.is_basic_land() {
            self.basics.push(card.id);
            return;
        }

        match card.rarity {
            Rarity::Mythic => self.mythics.push(card.id),
            Rarity::Rare => self.rares.push(card.id),
            Rarity::Uncommon => self.uncommons.push(card.id),
            Rarity::Common => self.commons.push(card.id),
            Rarity::Bonus | Rarity::Special => {} // Special and bonus not part of pool.
        }
    }

    /// Look up a card by collector number. Feeds are inconsistent about
    /// leading zeros and letter case, so the integer and lowercase forms of
    /// the number are tried after the literal one.
    pub fn card_by_number(&self, number: &str) -> Option<CardId> {
        self.cards_by_number
            .get(number)
            .or_else(|| {
                number
                    .parse::<u32>()
                    .ok()
                    .and_then(|n| self.cards_by_number.get(&n.to_string()))
            })
            .or_else(|| self.cards_by_number.get(&number.to_lowercase()))
            .copied()
    }
}

impl Debug for Set {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Set {{ code: {}, name: {}, basics: {}, mythics: {}, rares: {}, uncommons: {}, commons: {} }}",
            self.code,
            self.name,
            self.basics.len(),
            self.mythics.len(),
            self.rares.len(),
            self.uncommons.len(),
            self.commons.len()
        )
    }
}

pub struct SetDatabase {
    /// Map from uppercased set code to set.
    sets: HashMap<String, Set>,
}

impl SetDatabase {
    pub fn new() -> Self {
        Self {
            sets: HashMap::new(),
        }
    }

    /// Build the registry from set metadata, sorting every catalog card into
    /// the pools of its set. Cards of sets without metadata are ignored.
    pub fn build(infos: Vec<SetInfo>, catalog: &CardDatabase) -> Self {
        let mut database = Self::new();
        for info in infos {
            database.insert(Set::new(&info.code, &info.name, info.size));
        }
        for card in catalog.cards() {
            if let Some(set) = database.sets.get_mut(&card.set) {
                set.add(card);
            }
        }
        database
    }

    pub fn insert(&mut self, set: Set) {
        self.sets.insert(set.code.clone(), set);
    }

    pub fn get(&self, code: &str) -> Option<&Set> {
        self.sets.get(&code.to_uppercase())
    }

    pub fn size(&self) -> usize {
        self.sets.len()
    }
}

pub async fn load_sets(file: &Path, catalog: &CardDatabase) -> Result<SetDatabase, String> {
    tracing::debug!("Reading set data from {}.", file.display());
    let infos: Vec<SetInfo> = read_json(file).await?;
    Ok(SetDatabase::build(infos, catalog))
}
