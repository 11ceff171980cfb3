// Odds representations: American <-> decimal conversion, implied probability,
// and vig removal for two-way prop markets.

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Convert American odds to decimal odds.
///
/// `+150` becomes `2.5`, `-110` becomes `1.909...`. Zero is not a valid
/// American price and yields `NaN`; callers that aggregate odds treat a
/// non-finite decimal as an invalid leg.
pub fn american_to_decimal(odds: f64) -> f64 {
    if odds > 0.0 {
        odds / 100.0 + 1.0
    } else if odds < 0.0 {
        100.0 / odds.abs() + 1.0
    } else {
        f64::NAN
    }
}

/// Convert decimal odds back to American odds.
///
/// Prices of 2.0 and above map to positive American odds, shorter prices to
/// negative ones. Decimal odds at or below 1.0 have no American equivalent
/// and yield `NaN`.
pub fn decimal_to_american(decimal: f64) -> f64 {
    if !decimal.is_finite() || decimal <= 1.0 {
        return f64::NAN;
    }
    if decimal >= 2.0 {
        (decimal - 1.0) * 100.0
    } else {
        -100.0 / (decimal - 1.0)
    }
}

/// Returns the decimal odds for `odds` if they describe a payable price
/// (finite and strictly greater than 1.0).
pub(crate) fn valid_decimal(odds: f64) -> Option<f64> {
    let decimal = american_to_decimal(odds);
    (decimal.is_finite() && decimal > 1.0).then_some(decimal)
}

// ---------------------------------------------------------------------------
// Probabilities
// ---------------------------------------------------------------------------

/// Market-implied win probability (`1 / decimal`), vig included.
///
/// Returns 0.0 for invalid odds.
pub fn implied_probability(odds: f64) -> f64 {
    match valid_decimal(odds) {
        Some(decimal) => 1.0 / decimal,
        None => 0.0,
    }
}

/// Strip the bookmaker margin from a two-way market.
///
/// Both implied probabilities are scaled by their sum so the pair adds up to
/// exactly 1. Returns `None` when either side is not a valid price.
pub fn remove_vig(over_odds: f64, under_odds: f64) -> Option<(f64, f64)> {
    let over = 1.0 / valid_decimal(over_odds)?;
    let under = 1.0 / valid_decimal(under_odds)?;
    let book = over + under;
    Some((over / book, under / book))
}

/// American odds that exactly price a (vig-free) probability.
///
/// Only defined on the open interval (0, 1); anything else yields `NaN`.
pub fn fair_american_odds(probability: f64) -> f64 {
    if !(probability > 0.0 && probability < 1.0) {
        return f64::NAN;
    }
    decimal_to_american(1.0 / probability)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn favourite_converts_to_short_decimal() {
        assert!((american_to_decimal(-110.0) - 1.909_090_909).abs() < 1e-6);
        assert!((american_to_decimal(-200.0) - 1.5).abs() < EPS);
    }

    #[test]
    fn underdog_converts_to_long_decimal() {
        assert!((american_to_decimal(150.0) - 2.5).abs() < EPS);
        assert!((american_to_decimal(100.0) - 2.0).abs() < EPS);
    }

    #[test]
    fn zero_american_odds_are_undefined() {
        assert!(american_to_decimal(0.0).is_nan());
    }

    #[test]
    fn decimal_to_american_picks_sign_at_even_money() {
        assert!((decimal_to_american(2.0) - 100.0).abs() < EPS);
        assert!((decimal_to_american(3.5) - 250.0).abs() < EPS);
        assert!((decimal_to_american(1.5) + 200.0).abs() < EPS);
    }

    #[test]
    fn decimal_at_or_below_one_has_no_american_price() {
        assert!(decimal_to_american(1.0).is_nan());
        assert!(decimal_to_american(0.5).is_nan());
        assert!(decimal_to_american(f64::NAN).is_nan());
    }

    #[test]
    fn american_round_trip_is_stable() {
        // -100 and +100 are the same price; the inverse normalises to +100.
        for odds in [-1000.0, -350.0, -110.0, -101.0, 100.0, 105.0, 264.0, 900.0, 2500.0] {
            let back = decimal_to_american(american_to_decimal(odds));
            assert!(
                (back - odds).abs() < 1e-6,
                "round trip of {odds} returned {back}"
            );
        }
    }

    #[test]
    fn implied_probability_of_standard_line() {
        assert!((implied_probability(-110.0) - 0.523_809_5).abs() < 1e-6);
        assert!((implied_probability(100.0) - 0.5).abs() < EPS);
        assert_eq!(implied_probability(0.0), 0.0);
    }

    #[test]
    fn remove_vig_normalises_to_one() {
        let (over, under) = remove_vig(-110.0, -110.0).unwrap();
        assert!((over - 0.5).abs() < EPS);
        assert!((under - 0.5).abs() < EPS);

        let (over, under) = remove_vig(-150.0, 130.0).unwrap();
        assert!((over + under - 1.0).abs() < EPS);
        assert!(over > under);
    }

    #[test]
    fn remove_vig_rejects_invalid_side() {
        assert!(remove_vig(0.0, -110.0).is_none());
        assert!(remove_vig(-110.0, 0.0).is_none());
    }

    #[test]
    fn fair_odds_price_the_probability() {
        assert!((fair_american_odds(0.5) - 100.0).abs() < EPS);
        assert!((fair_american_odds(0.6) + 150.0).abs() < 1e-6);
        assert!((fair_american_odds(0.25) - 300.0).abs() < 1e-6);
        assert!(fair_american_odds(0.0).is_nan());
        assert!(fair_american_odds(1.0).is_nan());
    }
}
