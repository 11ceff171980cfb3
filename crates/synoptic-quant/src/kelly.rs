// Kelly criterion stake sizing.
//
//     f* = (b*p - q) / b
//
// where b = decimal odds - 1 (net odds), p = win probability, q = 1 - p.
// Stakes are fractional Kelly and never exceed MAX_STAKE_FRACTION of bankroll.

use crate::ev::is_probability;
use crate::odds::valid_decimal;

/// Default fraction of full Kelly (quarter Kelly).
pub const DEFAULT_FRACTIONAL_KELLY: f64 = 0.25;

/// Hard cap on any single stake, as a fraction of bankroll.
pub const MAX_STAKE_FRACTION: f64 = 0.05;

/// Base fraction applied to parlays before the per-leg risk reduction.
pub const PARLAY_BASE_FRACTION: f64 = 0.1;

/// Full Kelly fraction for a bet at `decimal` odds. Can be negative when the
/// bet has no edge; 0.0 when the odds pay nothing.
pub fn kelly_fraction(probability: f64, decimal: f64) -> f64 {
    let b = decimal - 1.0;
    if !(b > 0.0) {
        return 0.0;
    }
    let q = 1.0 - probability;
    (b * probability - q) / b
}

/// Recommended stake for a bet at American `odds` with win probability
/// `win_prob`.
///
/// The full Kelly fraction is scaled by `fractional_kelly` and capped at 5%
/// of `bankroll`. Degenerate inputs (invalid odds, probability outside
/// [0, 1], non-positive bankroll or fraction) and bets without an edge all
/// return 0.0.
pub fn kelly_calculator(win_prob: f64, odds: f64, bankroll: f64, fractional_kelly: f64) -> f64 {
    if !is_probability(win_prob) || !(bankroll > 0.0) || !(fractional_kelly > 0.0) {
        return 0.0;
    }
    let Some(decimal) = valid_decimal(odds) else {
        return 0.0;
    };

    let fraction = kelly_fraction(win_prob, decimal) * fractional_kelly;
    if !(fraction > 0.0) {
        return 0.0;
    }

    let stake = bankroll * fraction;
    let cap = bankroll * MAX_STAKE_FRACTION;
    stake.min(cap)
}

/// Kelly stake for a parlay of `num_legs` legs.
///
/// The base parlay fraction is reduced by `1 / sqrt(num_legs)`: every extra
/// leg adds variance, so equal nominal edge earns a smaller stake. A parlay
/// without legs is never staked.
pub fn kelly_for_parlay(combined_prob: f64, parlay_odds: f64, bankroll: f64, num_legs: usize) -> f64 {
    if num_legs == 0 {
        return 0.0;
    }
    let risk_factor = 1.0 / (num_legs as f64).sqrt();
    kelly_calculator(
        combined_prob,
        parlay_odds,
        bankroll,
        PARLAY_BASE_FRACTION * risk_factor,
    )
}
