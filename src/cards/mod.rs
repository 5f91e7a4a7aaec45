use std::collections::HashMap;

use uuid::Uuid;

pub mod mtgjson;

/// Cards are referred to by their catalog UUID everywhere outside the catalog.
pub type CardId = Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Rarity {
    Mythic,
    Rare,
    Uncommon,
    Common,
    Special,
    Bonus,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Colour {
    W,
    U,
    B,
    R,
    G,
}

impl Colour {
    /// Order in which colour balanced sheets seed one card of each colour.
    pub const BALANCE_ORDER: [Colour; 5] = [Colour::G, Colour::U, Colour::W, Colour::B, Colour::R];
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct Card {
    #[serde(rename = "uuid")]
    pub id: CardId,
    name: String,
    pub set: String,
    pub number: String,
    pub rarity: Rarity,

    #[serde(rename = "colors")]
    pub colours: Vec<Colour>,
    types: Vec<String>,
    supertypes: Vec<String>,
}

impl Card {
    #[cfg(test)]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_land(&self) -> bool {
        self.types.iter().any(|t| t == "Land")
    }

    pub fn is_basic_land(&self) -> bool {
        self.is_land() && self.supertypes.iter().any(|t| t == "Basic")
    }

    #[cfg(test)]
    pub fn sample(set: &str, rarity: Rarity, colours: &[Colour]) -> Self {
        static ID: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(1);

        let id = ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Self {
            id: Uuid::new_v4(),
            name: format!("Card {id}"),
            set: set.to_string(),
            number: id.to_string(),
            rarity,
            colours: colours.to_vec(),
            types: vec!["Creature".to_string()],
            supertypes: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn sample_basic(set: &str) -> Self {
        let mut card = Self::sample(set, Rarity::Common, &[]);
        card.types = vec!["Land".to_string()];
        card.supertypes = vec!["Basic".to_string()];
        card
    }
}

pub struct CardDatabase {
    cards: HashMap<CardId, Card>,
}

impl CardDatabase {
    pub fn new() -> Self {
        Self {
            cards: HashMap::new(),
        }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.insert(card.id, card);
    }

    pub fn get(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }
}
