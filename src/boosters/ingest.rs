use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use crate::{
    cards::{mtgjson::read_json, Card, CardDatabase},
    error::{BoosterError, Res},
    sets::SetDatabase,
};

use super::rules::{BoosterConfig, RuleBook, RulesVersion, SetRules, Sheet};

/// One set's entry in the sealed rules feed.
#[derive(serde::Deserialize, Debug)]
pub struct FeedSet {
    pub code: String,
    pub boosters: Vec<FeedBooster>,
    pub sheets: HashMap<String, FeedSheet>,
}

#[derive(serde::Deserialize, Debug)]
pub struct FeedBooster {
    pub weight: u32,

    /// Map from sheet name to number of cards drawn from it.
    pub sheets: BTreeMap<String, usize>,
}

#[derive(serde::Deserialize, Debug)]
pub struct FeedSheet {
    #[serde(default)]
    pub balance_colors: bool,

    /// Map from "set:number" card code to weight.
    pub cards: BTreeMap<String, u32>,
}

/// A complete feed: every set's rules plus the hash identifying the version.
#[derive(Debug)]
pub struct FeedDocument {
    pub sha: String,
    pub sets: Vec<FeedSet>,
}

const FEED_FILE: &str = "sealed_basic_data.json";
const FEED_SHA_FILE: &str = "sealed_basic_data.sha";

/// Read the rules feed from a data directory. A missing feed is not an error,
/// sets then only get default boosters.
pub async fn load_feed(data: &Path) -> Result<Option<FeedDocument>, String> {
    let file = data.join(FEED_FILE);
    if !file.exists() {
        tracing::debug!("No booster rules at {}.", file.display());
        return Ok(None);
    }

    let sha = match tokio::fs::read_to_string(data.join(FEED_SHA_FILE)).await {
        Ok(sha) => sha.trim().to_string(),
        Err(e) => {
            tracing::warn!("Booster rules have no readable version ({e}).");
            String::new()
        }
    };

    tracing::debug!("Reading booster rules from {}.", file.display());
    let sets: Vec<FeedSet> = read_json(&file).await?;
    Ok(Some(FeedDocument { sha, sets }))
}

/// Resolve a "set:number" card code to a catalog card.
fn resolve_code<'a>(code: &str, sets: &SetDatabase, catalog: &'a CardDatabase) -> Res<&'a Card> {
    let unresolvable = || BoosterError::UnresolvableCardCode(code.to_string());

    let (set_code, number) = code.split_once(':').ok_or_else(unresolvable)?;
    let id = sets
        .get(set_code)
        .and_then(|set| set.card_by_number(number))
        .ok_or_else(unresolvable)?;
    catalog.get(&id).ok_or_else(unresolvable)
}

fn build_sheet(raw: &FeedSheet, sets: &SetDatabase, catalog: &CardDatabase) -> Sheet {
    let mut sheet = Sheet::new(raw.balance_colors);
    for (code, &weight) in &raw.cards {
        match resolve_code(code, sets, catalog) {
            Ok(card) => sheet.add(card, weight),
            Err(e) => tracing::warn!("{e}"),
        }
    }
    sheet
}

/// Build the rules of a single set from its feed entry.
pub fn build_set_rules(entry: &FeedSet, sets: &SetDatabase, catalog: &CardDatabase) -> SetRules {
    let boosters: Vec<BoosterConfig> = entry
        .boosters
        .iter()
        .map(|booster| BoosterConfig {
            weight: booster.weight,
            sheets: booster.sheets.clone(),
        })
        .collect();

    for sheet in boosters.iter().flat_map(|b| b.sheets.keys()) {
        if !entry.sheets.contains_key(sheet) {
            tracing::warn!("{}: booster refers to missing sheet {sheet}.", entry.code);
        }
    }

    SetRules {
        total_weight: boosters.iter().map(|b| u64::from(b.weight)).sum(),
        boosters,
        sheets: entry
            .sheets
            .iter()
            .map(|(name, raw)| (name.clone(), build_sheet(raw, sets, catalog)))
            .collect(),
    }
}

/// Build a complete rule book from a feed. The result is meant to be swapped
/// into a `RuleStore` in one piece.
pub fn build_rule_book(document: &FeedDocument, sets: &SetDatabase, catalog: &CardDatabase) -> RuleBook {
    let rules = document
        .sets
        .iter()
        .map(|entry| {
            (
                entry.code.to_uppercase(),
                build_set_rules(entry, sets, catalog),
            )
        })
        .collect();

    RuleBook::new(
        RulesVersion {
            sha: document.sha.clone(),
            commons_have_weights: true,
        },
        rules,
    )
}

#[cfg(test)]
mod test {
    use crate::{
        boosters::rules::Bucket,
        cards::{Colour, Rarity},
        sets::Set,
    };

    use super::*;

    const FEED: &str = r#"{
        "code": "tst",
        "boosters": [
            {"weight": 3, "sheets": {"common": 2, "rare": 1}},
            {"weight": 1, "sheets": {"common": 2, "foil": 1}}
        ],
        "sheets": {
            "common": {
                "balance_colors": true,
                "cards": {"tst:1": 10, "tst:2": 6, "tst:3": 3, "tst:004": 2, "tst:99": 7}
            },
            "rare": {"cards": {"TST:5": 1, "nope:1": 1, "garbage": 1}}
        }
    }"#;

    fn fixture() -> (SetDatabase, CardDatabase) {
        let colours: [&[Colour]; 5] = [
            &[Colour::W],
            &[Colour::U, Colour::B, Colour::G],
            &[],
            &[Colour::R],
            &[Colour::G],
        ];

        let mut set = Set::new("TST", "Test", 10);
        let mut catalog = CardDatabase::new();
        for (i, colours) in colours.into_iter().enumerate() {
            let mut card = Card::sample("TST", Rarity::Common, colours);
            card.number = (i + 1).to_string();
            set.add(&card);
            catalog.add(card);
        }

        let mut sets = SetDatabase::new();
        sets.insert(set);
        (sets, catalog)
    }

    #[test]
    fn test_build_set_rules() {
        let (sets, catalog) = fixture();
        let entry: FeedSet = serde_json::from_str(FEED).unwrap();
        let rules = build_set_rules(&entry, &sets, &catalog);

        assert_eq!(rules.total_weight, 4);
        assert_eq!(rules.boosters.len(), 2);
        assert_eq!(rules.boosters[0].sheets["common"], 2);

        // tst:99 does not exist and is skipped.
        let common = &rules.sheets["common"];
        assert!(common.balance_colours);
        assert_eq!(common.cards.len(), 4);
        assert_eq!(common.total_weight, 21);
        assert_eq!(common.bucket_weight(Bucket::Colour(Colour::W)), 10.0);
        assert_eq!(common.bucket_weight(Bucket::Colour(Colour::U)), 2.0);
        assert_eq!(common.bucket_weight(Bucket::Colour(Colour::G)), 2.0);
        assert_eq!(common.bucket_weight(Bucket::Colourless), 3.0);

        let rare = &rules.sheets["rare"];
        assert!(!rare.balance_colours);
        assert_eq!(rare.cards.len(), 1);
        assert_eq!(rare.total_weight, 1);
    }

    #[test]
    fn test_duplicate_codes_accumulate() {
        let (sets, catalog) = fixture();
        let entry: FeedSet = serde_json::from_str(
            r#"{
                "code": "tst",
                "boosters": [{"weight": 1, "sheets": {"common": 1}}],
                "sheets": {"common": {"cards": {"tst:1": 4000000000, "tst:01": 4000000000}}}
            }"#,
        )
        .unwrap();
        let rules = build_set_rules(&entry, &sets, &catalog);

        // Both codes name the same card, so their weights add up on one entry.
        let common = &rules.sheets["common"];
        assert_eq!(common.cards.len(), 1);
        assert_eq!(common.cards.values().next(), Some(&8_000_000_000));
        assert_eq!(common.total_weight, 8_000_000_000);
        assert_eq!(
            common.bucket_weight(Bucket::Colour(Colour::W)),
            8_000_000_000.0
        );
    }

    #[test]
    fn test_bucket_mass_matches_sheet() {
        let (sets, catalog) = fixture();
        let entry: FeedSet = serde_json::from_str(FEED).unwrap();
        let rules = build_set_rules(&entry, &sets, &catalog);

        for sheet in rules.sheets.values() {
            let mass: f64 = sheet
                .cards_by_colour
                .values()
                .flat_map(|bucket| bucket.values())
                .sum();
            assert!((mass - sheet.total_weight as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_build_rule_book() {
        let (sets, catalog) = fixture();
        let document = FeedDocument {
            sha: "abc123".to_string(),
            sets: vec![serde_json::from_str(FEED).unwrap()],
        };
        let book = build_rule_book(&document, &sets, &catalog);

        assert_eq!(book.version.sha, "abc123");
        assert!(book.version.commons_have_weights);
        assert_eq!(book.size(), 1);
        assert!(book.get("TST").is_some());
    }

    #[tokio::test]
    async fn test_load_feed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_feed(dir.path()).await.unwrap().is_none());

        tokio::fs::write(dir.path().join(FEED_FILE), format!("[{FEED}]"))
            .await
            .unwrap();
        tokio::fs::write(dir.path().join(FEED_SHA_FILE), "abc123\n")
            .await
            .unwrap();

        let document = load_feed(dir.path()).await.unwrap().unwrap();
        assert_eq!(document.sha, "abc123");
        assert_eq!(document.sets.len(), 1);
        assert_eq!(document.sets[0].code, "tst");

        tokio::fs::write(dir.path().join(FEED_FILE), "{").await.unwrap();
        assert!(load_feed(dir.path()).await.is_err());
    }

    #[test]
    fn test_resolve_code() {
        let (sets, catalog) = fixture();
        assert!(resolve_code("tst:1", &sets, &catalog).is_ok());
        assert!(resolve_code("tst:01", &sets, &catalog).is_ok());
        assert!(matches!(
            resolve_code("tst", &sets, &catalog),
            Err(BoosterError::UnresolvableCardCode(_))
        ));
        assert!(resolve_code("xyz:1", &sets, &catalog).is_err());
    }
}
