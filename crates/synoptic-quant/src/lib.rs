// Quant engine: pure betting math for props and parlays.
//
// No I/O and no state. Invalid inputs resolve to conservative sentinel values
// (total-loss EV, zero stake, zero odds) instead of errors; `error` holds the
// validation helpers used at the boundary.

pub mod distribution;
pub mod error;
pub mod ev;
pub mod kelly;
pub mod odds;
pub mod parlay;

pub use distribution::{normal_cdf, prop_hit_probability, Side};
pub use error::QuantError;
pub use ev::{calculate_single_leg_ev, TOTAL_LOSS_EV};
pub use kelly::{kelly_calculator, kelly_for_parlay};
pub use odds::{american_to_decimal, decimal_to_american, implied_probability, remove_vig};
pub use parlay::{
    analyze_parlay_value, calculate_compounded_win_probability, calculate_parlay_confidence,
    calculate_parlay_ev, calculate_parlay_ev_from_true_probs, calculate_parlay_odds, Leg, Parlay,
    ParlayAnalysis, RiskLevel,
};
