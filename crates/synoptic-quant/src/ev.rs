// Expected value of a single wager.
//
// EV is always reported as a percentage of stake. Inputs that cannot describe
// a real wager resolve to `TOTAL_LOSS_EV` instead of an error so a single bad
// leg never breaks an aggregate calculation.

use crate::odds::valid_decimal;

/// Sentinel EV for impossible or invalid inputs: the whole stake is lost.
pub const TOTAL_LOSS_EV: f64 = -100.0;

/// EV as a percentage of stake for a bet that wins with `probability` and
/// pays `decimal` odds. Assumes both inputs were already validated.
pub(crate) fn ev_percent(probability: f64, decimal: f64) -> f64 {
    let profit = probability * (decimal - 1.0);
    let loss = 1.0 - probability;
    (profit - loss) * 100.0
}

pub(crate) fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

/// Expected value (percent of stake) of a single leg priced at `market_odds`
/// (American) when it truly wins with `true_probability`.
///
/// Returns [`TOTAL_LOSS_EV`] when the probability lies outside [0, 1] or the
/// odds are not a payable price.
pub fn calculate_single_leg_ev(true_probability: f64, market_odds: f64) -> f64 {
    if !is_probability(true_probability) {
        return TOTAL_LOSS_EV;
    }
    match valid_decimal(market_odds) {
        Some(decimal) => ev_percent(true_probability, decimal),
        None => TOTAL_LOSS_EV,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odds::{american_to_decimal, implied_probability};

    #[test]
    fn fair_price_has_zero_ev() {
        let ev = calculate_single_leg_ev(0.5238, -110.0);
        assert!(ev.abs() < 0.01, "ev was {ev}");

        for odds in [-250.0, -110.0, 120.0, 400.0] {
            let p = implied_probability(odds);
            assert!(calculate_single_leg_ev(p, odds).abs() < 1e-9);
        }
    }

    #[test]
    fn edge_over_the_market_is_positive() {
        // 55% on a -110 line: 0.55 * 0.909 - 0.45 = 0.05
        let ev = calculate_single_leg_ev(0.55, -110.0);
        assert!((ev - 5.0).abs() < 0.01, "ev was {ev}");
    }

    #[test]
    fn certain_loss_is_minus_one_hundred() {
        assert_eq!(calculate_single_leg_ev(0.0, 150.0), -100.0);
    }

    #[test]
    fn certain_win_returns_full_profit() {
        let ev = calculate_single_leg_ev(1.0, 150.0);
        assert!((ev - (american_to_decimal(150.0) - 1.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_probability_is_total_loss() {
        assert_eq!(calculate_single_leg_ev(-0.1, -110.0), TOTAL_LOSS_EV);
        assert_eq!(calculate_single_leg_ev(1.2, -110.0), TOTAL_LOSS_EV);
        assert_eq!(calculate_single_leg_ev(f64::NAN, -110.0), TOTAL_LOSS_EV);
    }

    #[test]
    fn zero_odds_is_total_loss() {
        assert_eq!(calculate_single_leg_ev(0.6, 0.0), TOTAL_LOSS_EV);
    }
}
