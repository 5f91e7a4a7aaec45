use rand::Rng;

use crate::error::{BoosterError, Res};

/// Choose one item with probability proportional to its weight. When `total`
/// is given it is trusted as the sum of the weights, otherwise the weights are
/// summed first. Negative weights count as zero and zero weights are never
/// chosen.
pub fn select<T, W, I, R>(rng: &mut R, entries: I, total: Option<f64>) -> Res<T>
where
    I: IntoIterator<Item = (T, W)>,
    I::IntoIter: Clone,
    W: Into<f64>,
    R: Rng + ?Sized,
{
    let entries = entries.into_iter();
    let total = match total {
        Some(total) => total,
        None => entries
            .clone()
            .map(|(_, w)| Into::<f64>::into(w).max(0.0))
            .sum(),
    };
    if !total.is_finite() || total <= 0.0 {
        return Err(BoosterError::NoWeight);
    }

    let mut target = rng.gen_range(0.0..total);
    let mut last = None;
    for (item, weight) in entries {
        let weight: f64 = weight.into();
        if weight.is_nan() || weight <= 0.0 {
            continue;
        }
        if target < weight {
            return Ok(item);
        }
        target -= weight;
        last = Some(item);
    }

    // Rounding, or a supplied total larger than the real one, can leave the
    // target past the final interval.
    last.ok_or(BoosterError::NoWeight)
}
