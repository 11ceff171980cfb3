// Input validation for values entering the quant engine from outside.
//
// The math itself never fails; these checks guard the boundary where user- or
// feed-supplied numbers are accepted into a parlay.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantError {
    #[error("invalid American odds {0}: must be finite with magnitude of at least 100")]
    InvalidOdds(f64),

    #[error("invalid probability {0}: must be between 0 and 1")]
    InvalidProbability(f64),

    #[error("invalid bankroll {0}: must be greater than 0")]
    InvalidBankroll(f64),
}

pub fn validate_american_odds(odds: f64) -> Result<(), QuantError> {
    if !odds.is_finite() || odds.abs() < 100.0 {
        return Err(QuantError::InvalidOdds(odds));
    }
    Ok(())
}

pub fn validate_probability(probability: f64) -> Result<(), QuantError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(QuantError::InvalidProbability(probability));
    }
    Ok(())
}

pub fn validate_bankroll(bankroll: f64) -> Result<(), QuantError> {
    if !(bankroll.is_finite() && bankroll > 0.0) {
        return Err(QuantError::InvalidBankroll(bankroll));
    }
    Ok(())
}
