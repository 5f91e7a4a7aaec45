use std::path::Path;

use bytes::Buf;
use serde::de::DeserializeOwned;

use crate::cards::{Card, CardId, Colour, Rarity};

pub fn decode_json<T: DeserializeOwned>(bytes: bytes::Bytes) -> Result<T, String> {
    serde_json::de::from_reader(bytes.reader()).map_err(|e| e.to_string())
}

/// Read a file and decode it as JSON, naming the file in any error.
pub async fn read_json<T: DeserializeOwned>(file: &Path) -> Result<T, String> {
    let raw = tokio::fs::read(file)
        .await
        .map_err(|e| format!("{}: {e}", file.display()))?;
    decode_json(bytes::Bytes::from(raw)).map_err(|e| format!("{}: {e}", file.display()))
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct MtgJsonCard {
    uuid: CardId,

    /// Card name. Includes both faces (!).
    name: String,

    set_code: String,

    /// Collector number, not always numeric ("12a", "★").
    number: String,

    /// Rarity string, mythic, rare, uncommon, common, special, bonus.
    rarity: String,

    #[serde(default)]
    colors: Vec<Colour>,

    #[serde(default)]
    types: Vec<String>,

    #[serde(default)]
    supertypes: Vec<String>,
}

impl MtgJsonCard {
    fn to_card(self) -> Option<Card> {
        let name = match self.name.split_once("//") {
            Some((front, _)) => front.trim().to_string(),
            None => self.name,
        };

        let rarity = match self.rarity.as_str() {
            "mythic" => Rarity::Mythic,
            "rare" => Rarity::Rare,
            "uncommon" => Rarity::Uncommon,
            "common" => Rarity::Common,
            "special" => Rarity::Special,
            "bonus" => Rarity::Bonus,
            _ => return None,
        };

        Some(Card {
            id: self.uuid,
            name,
            set: self.set_code.to_uppercase(),
            number: self.number,
            rarity,
            colours: self.colors,
            types: self.types,
            supertypes: self.supertypes,
        })
    }
}

pub async fn load_cards(file: &Path) -> Result<Vec<Card>, String> {
    tracing::debug!("Reading card data from {}.", file.display());
    let cards: Vec<MtgJsonCard> = read_json(file).await?;
    tracing::debug!("Converting parsed JSON into card structs.");
    Ok(cards
        .into_iter()
        .filter_map(MtgJsonCard::to_card)
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;

    const DATA: &str = r#"[
        {
            "uuid": "5f8287b1-5bb6-5f4c-ad17-316a40d5bb0c",
            "name": "Nibbles, Corpse Companion",
            "setCode": "kr2",
            "number": "007",
            "rarity": "uncommon",
            "colors": ["B", "G"],
            "types": ["Creature"],
            "supertypes": ["Legendary"]
        },
        {
            "uuid": "b0f1f3b4-6a1e-5b0b-9f2e-0c8e2f0d7d11",
            "name": "Forest",
            "setCode": "KR2",
            "number": "250",
            "rarity": "common",
            "types": ["Land"],
            "supertypes": ["Basic"]
        },
        {
            "uuid": "0b5a3c1e-2f7d-5e9a-8c4b-1d2e3f4a5b6c",
            "name": "Token Thing",
            "setCode": "KR2",
            "number": "T1",
            "rarity": "token"
        }
    ]"#;

    #[test]
    fn test_decode() {
        let cards: Vec<MtgJsonCard> = decode_json(bytes::Bytes::from_static(DATA.as_bytes())).unwrap();
        let cards: Vec<Card> = cards.into_iter().filter_map(MtgJsonCard::to_card).collect();

        // Unknown rarities are dropped.
        assert_eq!(cards.len(), 2);

        let nibbles = &cards[0];
        assert_eq!(nibbles.name(), "Nibbles, Corpse Companion");
        assert_eq!(nibbles.set, "KR2");
        assert_eq!(nibbles.number, "007");
        assert_eq!(nibbles.rarity, Rarity::Uncommon);
        assert_eq!(nibbles.colours, vec![Colour::B, Colour::G]);
        assert!(!nibbles.is_land());

        let forest = &cards[1];
        assert!(forest.colours.is_empty());
        assert!(forest.is_basic_land());
    }

    #[test]
    fn test_split_card_name() {
        let card = MtgJsonCard {
            uuid: CardId::new_v4(),
            name: "Fire // Ice".to_string(),
            set_code: "apc".to_string(),
            number: "128".to_string(),
            rarity: "uncommon".to_string(),
            colors: vec![Colour::R, Colour::U],
            types: vec!["Instant".to_string()],
            supertypes: Vec::new(),
        };
        assert_eq!(card.to_card().unwrap().name(), "Fire");
    }

    #[test]
    fn test_reject() {
        assert!(decode_json::<Vec<MtgJsonCard>>(bytes::Bytes::from_static(b"{}")).is_err());
    }

    #[tokio::test]
    async fn test_load_cards() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cards.json");
        tokio::fs::write(&file, DATA).await.unwrap();

        assert_eq!(load_cards(&file).await.unwrap().len(), 2);
        assert!(load_cards(&dir.path().join("missing.json")).await.is_err());
    }
}
