// Parlay aggregation: combined odds, combined probability, parlay EV,
// confidence, and the overall value assessment.
//
// Legs are combined multiplicatively and treated as independent events.
// Same-game correlation is not modelled.

use serde::{Deserialize, Serialize};

use crate::ev::{ev_percent, is_probability, TOTAL_LOSS_EV};
use crate::odds::{american_to_decimal, decimal_to_american, valid_decimal};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Combined probability a recommended parlay should still clear.
pub const MIN_COMBINED_PROBABILITY: f64 = 0.20;

/// Combined probability at or below which a parlay is never worth betting.
pub const BET_PROBABILITY_FLOOR: f64 = 0.15;

/// Floor for the recommended number of legs.
pub const MIN_RECOMMENDED_LEGS: usize = 3;

/// Upper bound on legs in a single parlay.
pub const MAX_PARLAY_LEGS: usize = 12;

// ---------------------------------------------------------------------------
// Leg
// ---------------------------------------------------------------------------

/// One prop bet inside a parlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    /// Posted American odds.
    pub market_odds: f64,
    /// Model-estimated probability that the leg wins.
    pub true_probability: f64,
    /// Vig-removed American odds, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_odds: Option<f64>,
    /// Confidence score (0-100) attached to the leg's projection.
    pub confidence: f64,
}

impl Leg {
    /// A leg whose confidence defaults to its win probability expressed as a
    /// percentage.
    pub fn new(market_odds: f64, true_probability: f64) -> Self {
        Self {
            market_odds,
            true_probability,
            true_odds: None,
            confidence: true_probability * 100.0,
        }
    }

    pub fn with_true_odds(mut self, true_odds: f64) -> Self {
        self.true_odds = Some(true_odds);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Decimal odds of the posted price.
    pub fn decimal_odds(&self) -> f64 {
        american_to_decimal(self.market_odds)
    }
}

// ---------------------------------------------------------------------------
// Aggregate functions
// ---------------------------------------------------------------------------

/// Product of the legs' decimal odds, or `None` if the parlay is empty or any
/// leg carries an invalid price.
pub fn combined_decimal_odds(legs: &[Leg]) -> Option<f64> {
    if legs.is_empty() {
        return None;
    }
    legs.iter()
        .map(|leg| valid_decimal(leg.market_odds))
        .product::<Option<f64>>()
}

/// Combined American odds of a parlay. An empty parlay, or one containing an
/// unpriceable leg, yields 0.0.
pub fn calculate_parlay_odds(legs: &[Leg]) -> f64 {
    combined_decimal_odds(legs)
        .map(decimal_to_american)
        .unwrap_or(0.0)
}

/// Parlay EV (percent of stake) using vig-removed odds as the truth.
///
/// The market price comes from each leg's `market_odds`; the true win
/// probability is the product of `1 / decimal(true_odds)`. Legs without
/// `true_odds` fall back to their market price, vig included. A leg whose
/// true decimal odds are at or below 1.0 is impossible, which forces the
/// whole parlay to a total loss. An empty parlay has zero EV.
pub fn calculate_parlay_ev(legs: &[Leg]) -> f64 {
    if legs.is_empty() {
        return 0.0;
    }
    let Some(market_decimal) = combined_decimal_odds(legs) else {
        return TOTAL_LOSS_EV;
    };

    let mut true_probability = 1.0;
    for leg in legs {
        let true_decimal = american_to_decimal(leg.true_odds.unwrap_or(leg.market_odds));
        if !(true_decimal > 1.0) {
            return TOTAL_LOSS_EV;
        }
        true_probability *= 1.0 / true_decimal;
    }

    ev_percent(true_probability, market_decimal)
}

/// Parlay EV (percent of stake) using the legs' model probabilities directly.
///
/// Any probability outside [0, 1] or unpriceable leg makes the parlay a
/// total loss. An empty parlay has zero EV.
pub fn calculate_parlay_ev_from_true_probs(legs: &[Leg]) -> f64 {
    if legs.is_empty() {
        return 0.0;
    }
    if legs.iter().any(|leg| !is_probability(leg.true_probability)) {
        return TOTAL_LOSS_EV;
    }
    match combined_decimal_odds(legs) {
        Some(decimal) => ev_percent(combined_probability(legs), decimal),
        None => TOTAL_LOSS_EV,
    }
}

/// Product of the legs' true probabilities as a fraction. Probabilities
/// outside [0, 1] count as 0; an empty parlay has probability 0.
pub fn combined_probability(legs: &[Leg]) -> f64 {
    if legs.is_empty() {
        return 0.0;
    }
    legs.iter()
        .map(|leg| {
            if is_probability(leg.true_probability) {
                leg.true_probability
            } else {
                0.0
            }
        })
        .product()
}

/// Combined win probability as a percentage.
pub fn calculate_compounded_win_probability(legs: &[Leg]) -> f64 {
    combined_probability(legs) * 100.0
}

/// Geometric mean of the legs' confidence scores.
///
/// One leg with confidence at or below zero invalidates the whole parlay and
/// the result is 0.0. An empty parlay also has zero confidence.
pub fn calculate_parlay_confidence(legs: &[Leg]) -> f64 {
    if legs.is_empty() || legs.iter().any(|leg| !(leg.confidence > 0.0)) {
        return 0.0;
    }
    let log_sum: f64 = legs.iter().map(|leg| leg.confidence.ln()).sum();
    (log_sum / legs.len() as f64).exp()
}

// ---------------------------------------------------------------------------
// Value analysis
// ---------------------------------------------------------------------------

/// Risk bucket derived from a parlay's combined win probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.5 {
            RiskLevel::Low
        } else if probability > 0.3 {
            RiskLevel::Medium
        } else if probability > BET_PROBABILITY_FLOOR {
            RiskLevel::High
        } else {
            RiskLevel::Extreme
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Extreme => "extreme",
        };
        f.write_str(label)
    }
}

/// Summary of whether a parlay is worth playing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParlayAnalysis {
    /// Product of leg probabilities, as a fraction.
    pub combined_probability: f64,
    /// Combined American odds.
    pub parlay_odds: f64,
    /// EV as a percentage of stake.
    pub expected_value: f64,
    pub risk_level: RiskLevel,
    /// How many legs of this average quality still clear a 20% hit rate.
    pub recommended_max_legs: usize,
    pub should_bet: bool,
}

/// Number of legs with average win probability `avg_probability` that keeps
/// the combined probability at or above [`MIN_COMBINED_PROBABILITY`].
///
/// Never recommends fewer than [`MIN_RECOMMENDED_LEGS`] or more than
/// [`MAX_PARLAY_LEGS`].
pub fn recommended_max_legs(avg_probability: f64) -> usize {
    if !(avg_probability > 0.0) {
        return MIN_RECOMMENDED_LEGS;
    }
    if avg_probability >= 1.0 {
        return MAX_PARLAY_LEGS;
    }
    let legs = (MIN_COMBINED_PROBABILITY.ln() / avg_probability.ln()).floor();
    (legs as usize).clamp(MIN_RECOMMENDED_LEGS, MAX_PARLAY_LEGS)
}

/// Aggregate value assessment of a parlay built from legs' market odds and
/// estimated win probabilities.
pub fn analyze_parlay_value(legs: &[Leg]) -> ParlayAnalysis {
    let combined = combined_probability(legs);
    let parlay_odds = calculate_parlay_odds(legs);
    let expected_value = calculate_parlay_ev_from_true_probs(legs);

    let avg_probability = if legs.is_empty() {
        0.0
    } else {
        legs.iter().map(|leg| leg.true_probability).sum::<f64>() / legs.len() as f64
    };

    ParlayAnalysis {
        combined_probability: combined,
        parlay_odds,
        expected_value,
        risk_level: RiskLevel::from_probability(combined),
        recommended_max_legs: recommended_max_legs(avg_probability),
        should_bet: expected_value > 0.0 && combined > BET_PROBABILITY_FLOOR,
    }
}

// ---------------------------------------------------------------------------
// Parlay
// ---------------------------------------------------------------------------

/// An ordered, non-empty sequence of legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parlay {
    legs: Vec<Leg>,
}

impl Parlay {
    /// Returns `None` for an empty leg list.
    pub fn new(legs: Vec<Leg>) -> Option<Self> {
        (!legs.is_empty()).then_some(Self { legs })
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn american_odds(&self) -> f64 {
        calculate_parlay_odds(&self.legs)
    }

    pub fn combined_probability(&self) -> f64 {
        combined_probability(&self.legs)
    }

    pub fn expected_value(&self) -> f64 {
        calculate_parlay_ev_from_true_probs(&self.legs)
    }

    pub fn vig_adjusted_expected_value(&self) -> f64 {
        calculate_parlay_ev(&self.legs)
    }

    pub fn confidence(&self) -> f64 {
        calculate_parlay_confidence(&self.legs)
    }

    pub fn analyze(&self) -> ParlayAnalysis {
        analyze_parlay_value(&self.legs)
    }
}
