// Prop edge evaluation: model probabilities against the posted prices.
//
// For each prop both sides are priced. The model probability comes from the
// projection's normal distribution; the market's vig-free probability is kept
// alongside it for display and for building parlay legs.

use serde::Serialize;
use synoptic_core::config::BankrollConfig;
use synoptic_quant::odds::fair_american_odds;
use synoptic_quant::{
    calculate_single_leg_ev, kelly_calculator, prop_hit_probability, remove_vig, Leg, Side,
};

use crate::services::PlayerProp;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideEdge {
    pub side: Side,
    pub market_odds: f64,
    pub model_probability: f64,
    /// Market probability with the bookmaker margin removed.
    pub fair_probability: Option<f64>,
    /// EV as a percentage of stake.
    pub ev: f64,
}

impl SideEdge {
    fn price(prop: &PlayerProp, side: Side, fair_probability: Option<f64>) -> Self {
        let market_odds = match side {
            Side::Over => prop.over_odds,
            Side::Under => prop.under_odds,
        };
        let model_probability = prop_hit_probability(prop.projection, prop.line, prop.std_dev, side);
        Self {
            side,
            market_odds,
            model_probability,
            fair_probability,
            ev: calculate_single_leg_ev(model_probability, market_odds),
        }
    }

    /// Model edge over the vig-free market, in probability points.
    pub fn edge(&self) -> Option<f64> {
        self.fair_probability.map(|p| self.model_probability - p)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropEdge {
    pub prop: PlayerProp,
    pub over: SideEdge,
    pub under: SideEdge,
    pub best_side: Side,
    /// Recommended stake on the best side, in bankroll currency.
    pub kelly_stake: f64,
}

impl PropEdge {
    pub fn best(&self) -> &SideEdge {
        match self.best_side {
            Side::Over => &self.over,
            Side::Under => &self.under,
        }
    }

    pub fn best_ev(&self) -> f64 {
        self.best().ev
    }

    /// Parlay leg for the best side. The vig-free market price becomes the
    /// leg's true odds, so vig-based parlay EV reflects what the juice costs.
    pub fn to_leg(&self) -> Leg {
        let best = self.best();
        let leg = Leg::new(best.market_odds, best.model_probability);
        match best.fair_probability.map(fair_american_odds) {
            Some(odds) if odds.is_finite() => leg.with_true_odds(odds),
            _ => leg,
        }
    }
}

pub fn evaluate_prop(prop: &PlayerProp, bankroll: &BankrollConfig) -> PropEdge {
    let fair = remove_vig(prop.over_odds, prop.under_odds);
    let over = SideEdge::price(prop, Side::Over, fair.map(|(o, _)| o));
    let under = SideEdge::price(prop, Side::Under, fair.map(|(_, u)| u));

    let best_side = if under.ev > over.ev { Side::Under } else { Side::Over };
    let best = match best_side {
        Side::Over => &over,
        Side::Under => &under,
    };
    let kelly_stake = kelly_calculator(
        best.model_probability,
        best.market_odds,
        bankroll.amount,
        bankroll.fractional_kelly,
    );

    PropEdge {
        prop: prop.clone(),
        over,
        under,
        best_side,
        kelly_stake,
    }
}

/// Evaluate every prop, best EV first.
pub fn evaluate_board(props: &[PlayerProp], bankroll: &BankrollConfig) -> Vec<PropEdge> {
    let mut edges: Vec<PropEdge> = props.iter().map(|p| evaluate_prop(p, bankroll)).collect();
    edges.sort_by(|a, b| b.best_ev().total_cmp(&a.best_ev()));
    edges
}
