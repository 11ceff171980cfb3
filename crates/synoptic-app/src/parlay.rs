// Parlay builder: the ordered slip behind the drag-and-drop canvas.
//
// Legs are validated on the way in; every summary is recomputed from the
// current leg order, so reordering never changes the numbers, only the slip.

use serde::Serialize;
use synoptic_quant::error::{
    validate_american_odds, validate_bankroll, validate_probability, QuantError,
};
use synoptic_quant::parlay::MAX_PARLAY_LEGS;
use synoptic_quant::{
    analyze_parlay_value, calculate_parlay_confidence, calculate_parlay_ev, kelly_for_parlay, Leg,
    ParlayAnalysis, Side,
};
use thiserror::Error;
use tracing::debug;

use crate::edge::PropEdge;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParlayError {
    #[error("prop `{0}` is already on the slip")]
    DuplicateLeg(String),

    #[error("slip is full ({max} legs)")]
    TooManyLegs { max: usize },

    #[error("no leg at position {index} (slip has {len})")]
    OutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Invalid(#[from] QuantError),
}

/// A leg on the slip, tagged with the prop it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipLeg {
    pub prop_id: String,
    pub label: String,
    pub side: Side,
    pub leg: Leg,
}

impl SlipLeg {
    pub fn from_edge(edge: &PropEdge) -> Self {
        let prop = &edge.prop;
        Self {
            prop_id: prop.id.clone(),
            label: format!("{} {} {} {}", prop.player, edge.best_side, prop.line, prop.market),
            side: edge.best_side,
            leg: edge.to_leg(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParlaySummary {
    pub legs: usize,
    pub analysis: ParlayAnalysis,
    /// EV against the vig-free market prices, as a percentage of stake.
    pub vig_expected_value: f64,
    pub confidence: f64,
    pub kelly_stake: f64,
}

pub struct ParlayBuilder {
    legs: Vec<SlipLeg>,
    max_legs: usize,
    bankroll: f64,
}

impl ParlayBuilder {
    /// `max_legs` is capped at the engine's hard limit. The bankroll must be
    /// finite and positive.
    pub fn new(max_legs: usize, bankroll: f64) -> Result<Self, ParlayError> {
        validate_bankroll(bankroll)?;
        Ok(Self {
            legs: Vec::new(),
            max_legs: max_legs.min(MAX_PARLAY_LEGS),
            bankroll,
        })
    }

    pub fn legs(&self) -> &[SlipLeg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn max_legs(&self) -> usize {
        self.max_legs
    }

    pub fn add_leg(&mut self, leg: SlipLeg) -> Result<(), ParlayError> {
        validate_american_odds(leg.leg.market_odds)?;
        validate_probability(leg.leg.true_probability)?;
        if self.legs.iter().any(|l| l.prop_id == leg.prop_id) {
            return Err(ParlayError::DuplicateLeg(leg.prop_id));
        }
        if self.legs.len() >= self.max_legs {
            return Err(ParlayError::TooManyLegs { max: self.max_legs });
        }
        debug!(prop_id = %leg.prop_id, position = self.legs.len(), "leg added");
        self.legs.push(leg);
        Ok(())
    }

    pub fn remove_leg(&mut self, index: usize) -> Result<SlipLeg, ParlayError> {
        self.check_index(index)?;
        Ok(self.legs.remove(index))
    }

    /// Move the leg at `from` so it ends up at position `to`.
    pub fn move_leg(&mut self, from: usize, to: usize) -> Result<(), ParlayError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let leg = self.legs.remove(from);
        self.legs.insert(to, leg);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.legs.clear();
    }

    /// Add the positive-EV edges in order until `limit` legs are on the slip
    /// or the slip is full. Returns how many were added.
    pub fn fill_from_edges(&mut self, edges: &[PropEdge], limit: usize) -> usize {
        let mut added = 0;
        for edge in edges.iter().filter(|e| e.best_ev() > 0.0) {
            if self.legs.len() >= limit.min(self.max_legs) {
                break;
            }
            match self.add_leg(SlipLeg::from_edge(edge)) {
                Ok(()) => added += 1,
                Err(e) => debug!(prop_id = %edge.prop.id, error = %e, "edge skipped"),
            }
        }
        added
    }

    fn check_index(&self, index: usize) -> Result<(), ParlayError> {
        if index >= self.legs.len() {
            return Err(ParlayError::OutOfRange {
                index,
                len: self.legs.len(),
            });
        }
        Ok(())
    }

    pub fn summary(&self) -> ParlaySummary {
        let legs: Vec<Leg> = self.legs.iter().map(|l| l.leg.clone()).collect();
        let analysis = analyze_parlay_value(&legs);
        let kelly_stake = kelly_for_parlay(
            analysis.combined_probability,
            analysis.parlay_odds,
            self.bankroll,
            legs.len(),
        );
        ParlaySummary {
            legs: legs.len(),
            vig_expected_value: calculate_parlay_ev(&legs),
            confidence: calculate_parlay_confidence(&legs),
            kelly_stake,
            analysis,
        }
    }
}
