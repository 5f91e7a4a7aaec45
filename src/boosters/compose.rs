use rand::{seq::SliceRandom, Rng};

use crate::{
    cards::{CardDatabase, CardId},
    error::{BoosterError, Res},
    sets::Set,
};

use super::{
    rules::SetRules,
    sheets::{sample_colour_balanced, sample_sheet},
    weighted::select,
    BoosterCard, Pack,
};

/// Packs with fewer commons than this are padded to stay draftable.
const MIN_COMMONS: usize = 10;
const UNCOMMONS: usize = 3;
const RARES: usize = 1;

/// One in this many default boosters opens a mythic instead of a rare.
const MYTHIC_ODDS: u32 = 7;

/// Result of composing from booster rules. A rule that cannot produce a pack
/// asks the caller to fall back instead of failing the request.
#[derive(Debug)]
pub enum Composition {
    Pack(Pack),
    NeedsFallback(BoosterError),
}

fn is_foil_sheet(name: &str) -> bool {
    name.to_ascii_lowercase().contains("foil")
}

fn resolve(catalog: &CardDatabase, id: CardId, foil: bool) -> Res<BoosterCard> {
    catalog
        .get(&id)
        .map(|card| BoosterCard::new(card.clone(), foil))
        .ok_or(BoosterError::UnknownCard(id))
}

fn try_compose<R: Rng + ?Sized>(rng: &mut R, rules: &SetRules, catalog: &CardDatabase) -> Res<Pack> {
    let booster = select(
        rng,
        rules.boosters.iter().map(|b| (b, b.weight)),
        Some(rules.total_weight as f64),
    )?;

    let mut pack = Vec::new();
    for (name, &count) in &booster.sheets {
        let sheet = rules
            .sheets
            .get(name)
            .ok_or_else(|| BoosterError::MalformedRule(format!("missing sheet {name}")))?;

        let ids = if sheet.balance_colours {
            sample_colour_balanced(rng, sheet, count)?
        } else {
            sample_sheet(rng, sheet, count)?
        };

        let foil = is_foil_sheet(name);
        for id in ids {
            pack.push(resolve(catalog, id, foil)?);
        }
    }

    Ok(pack)
}

/// Compose a booster from a set's rules: pick a pack configuration by weight,
/// then draw each of its slots from the named sheet.
pub fn compose_from_rules<R: Rng + ?Sized>(
    rng: &mut R,
    rules: &SetRules,
    catalog: &CardDatabase,
) -> Composition {
    match try_compose(rng, rules, catalog) {
        Ok(pack) => Composition::Pack(pack),
        Err(e) => Composition::NeedsFallback(e),
    }
}

/// Compose a booster from a set's rarity pools alone: commons, three
/// uncommons, a rare (sometimes mythic) and a basic land when the set has them.
pub fn compose_default<R: Rng + ?Sized>(rng: &mut R, set: &Set, catalog: &CardDatabase) -> Pack {
    let mut rares = &set.rares;
    if !set.mythics.is_empty() && rng.gen_range(0..MYTHIC_ODDS) == 0 {
        rares = &set.mythics;
    }

    // Some old sets have no rares, uncommons take their slot.
    if rares.is_empty() {
        rares = &set.uncommons;
    }

    let commons = set.size.max(MIN_COMMONS);

    let mut ids: Vec<CardId> = Vec::new();
    ids.extend(set.commons.choose_multiple(rng, commons));
    ids.extend(set.uncommons.choose_multiple(rng, UNCOMMONS));
    ids.extend(rares.choose_multiple(rng, RARES));
    if let Some(basic) = set.basics.choose(rng) {
        ids.push(*basic);
    }

    ids.into_iter()
        .filter_map(|id| match resolve(catalog, id, false) {
            Ok(card) => Some(card),
            Err(e) => {
                tracing::warn!("{}: {e}", set.code);
                None
            }
        })
        .collect()
}
