//! Square-root weighted selection shared by live exchanges and direct bracket
//! resolution.
//!
//! Weighting by `sqrt(power)` flattens the odds: four times the power buys
//! roughly twice the chance, not four times.

use crate::error::{ArenaError, Result};
use crate::Dice;

/// Anything that can be weighed by the resolver.
pub trait Weighted {
    fn power(&self) -> f64;
}

impl Weighted for f64 {
    fn power(&self) -> f64 {
        *self
    }
}

impl Weighted for u32 {
    fn power(&self) -> f64 {
        f64::from(*self)
    }
}

/// Selection weight for a power value. Negative or NaN power weighs nothing.
pub fn weight_of(power: f64) -> f64 {
    if power > 0.0 { power.sqrt() } else { 0.0 }
}

/// Draw an index with probability proportional to its weight.
///
/// Zero-weight entries are never picked unless every weight is zero, in which
/// case the pick is uniform. `weights` must be non-empty.
pub(crate) fn draw_index(weights: &[f64], dice: &mut Dice) -> usize {
    debug_assert!(!weights.is_empty());
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if !(total > 0.0) || !total.is_finite() {
        return dice.int_inclusive(0, weights.len() as i32 - 1) as usize;
    }

    let mut remaining = dice.uniform(total);
    let mut last_weighted = 0;
    for (idx, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        last_weighted = idx;
        remaining -= w;
        if remaining <= 0.0 {
            return idx;
        }
    }
    // rounding left a sliver of the draw unclaimed
    last_weighted
}

/// `powers` must be non-empty.
pub(crate) fn pick_by_power(powers: &[f64], dice: &mut Dice) -> usize {
    let weights: Vec<f64> = powers.iter().map(|p| weight_of(*p)).collect();
    draw_index(&weights, dice)
}

/// Index of the winning power among `powers`.
pub fn resolve_index(powers: &[f64], dice: &mut Dice) -> Result<usize> {
    if powers.is_empty() {
        return Err(ArenaError::NoCandidates);
    }
    Ok(pick_by_power(powers, dice))
}

pub fn resolve_weighted<'a, T: Weighted>(candidates: &'a [T], dice: &mut Dice) -> Result<&'a T> {
    let powers: Vec<f64> = candidates.iter().map(Weighted::power).collect();
    let idx = resolve_index(&powers, dice)?;
    Ok(&candidates[idx])
}

/// Chance that a candidate with `power` wins a single draw against `against`.
pub fn win_probability(power: f64, against: f64) -> f64 {
    let (mine, theirs) = (weight_of(power), weight_of(against));
    if mine + theirs > 0.0 { mine / (mine + theirs) } else { 0.5 }
}
