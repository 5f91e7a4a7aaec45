use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::{
    cards::{CardId, Colour},
    error::{BoosterError, Res},
};

use super::{
    rules::{Bucket, Sheet},
    weighted::select,
};

/// Duplicate draws are rejected and redrawn. Each card requested grants this
/// many draws so that a sheet with a few overwhelming weights fails instead
/// of spinning.
const DRAWS_PER_CARD: usize = 1_000;

/// Draw `count` distinct cards from a sheet, weighted by `sheet.cards`.
pub fn sample_sheet<R: Rng + ?Sized>(rng: &mut R, sheet: &Sheet, count: usize) -> Res<Vec<CardId>> {
    let exhausted = BoosterError::SheetExhausted {
        wanted: count,
        available: sheet.cards.len(),
    };
    if count > sheet.cards.len() {
        return Err(exhausted);
    }

    let total = sheet.total_weight as f64;
    let mut picked = BTreeSet::new();
    let mut draws = 0;
    while picked.len() < count {
        if draws == count * DRAWS_PER_CARD {
            return Err(exhausted);
        }
        draws += 1;
        picked.insert(select(
            rng,
            sheet.cards.iter().map(|(id, w)| (*id, *w as f64)),
            Some(total),
        )?);
    }

    Ok(picked.into_iter().collect())
}

fn chromatic(colour: Colour) -> Bucket {
    Bucket::Colour(colour)
}

/// Clamp degenerate colour weights to zero so they are never chosen.
fn usable(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Selection weight of each bucket when filling the slots left after one card
/// of each colour has been taken. Colours that already dominate the sheet are
/// damped and colourless cards slightly favoured.
fn colour_weights(sheet: &Sheet, to_pick: usize) -> BTreeMap<Bucket, f64> {
    let to_pick = to_pick as f64;
    let n = sheet.cards.len() as f64;
    let colours = Colour::BALANCE_ORDER.len() as f64;

    let mut weights: BTreeMap<Bucket, f64> = Colour::BALANCE_ORDER
        .iter()
        .map(|&colour| {
            let sum = sheet.bucket_weight(chromatic(colour));
            let weight = (1.0 + colours / to_pick - n / (to_pick * sum)) * sum / n;
            (chromatic(colour), usable(weight))
        })
        .collect();

    let colourless = sheet.bucket_weight(Bucket::Colourless);
    weights.insert(
        Bucket::Colourless,
        usable((to_pick + colours) / to_pick * colourless / n),
    );
    weights
}

fn draw_from_bucket<R: Rng + ?Sized>(rng: &mut R, sheet: &Sheet, bucket: Bucket) -> Res<CardId> {
    let cards = sheet
        .bucket(bucket)
        .filter(|cards| !cards.is_empty())
        .ok_or_else(|| BoosterError::MalformedRule(format!("no cards in {bucket:?} bucket")))?;
    select(rng, cards.iter().map(|(id, w)| (*id, *w)), None)
}

/// Draw `count` distinct cards from a sheet while making sure every colour is
/// represented. One card of each colour is drawn first, then the remainder is
/// filled by choosing a colour and then a card of that colour.
pub fn sample_colour_balanced<R: Rng + ?Sized>(
    rng: &mut R,
    sheet: &Sheet,
    count: usize,
) -> Res<Vec<CardId>> {
    if count < Colour::BALANCE_ORDER.len() {
        return Err(BoosterError::InvalidCount(count));
    }
    let exhausted = BoosterError::SheetExhausted {
        wanted: count,
        available: sheet.cards.len(),
    };
    if count > sheet.cards.len() {
        return Err(exhausted);
    }

    let mut picked = BTreeSet::new();
    for colour in Colour::BALANCE_ORDER {
        picked.insert(draw_from_bucket(rng, sheet, chromatic(colour))?);
    }

    let to_pick = count - picked.len();
    if to_pick == 0 {
        return Ok(picked.into_iter().collect());
    }

    let weights = colour_weights(sheet, to_pick);
    let mut draws = 0;
    while picked.len() < count {
        if draws == to_pick * DRAWS_PER_CARD {
            return Err(exhausted);
        }
        draws += 1;
        let bucket = select(rng, weights.iter().map(|(b, w)| (*b, *w)), None)?;
        picked.insert(draw_from_bucket(rng, sheet, bucket)?);
    }

    Ok(picked.into_iter().collect())
}
