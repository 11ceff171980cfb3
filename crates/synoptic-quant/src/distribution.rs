// Normal-distribution win-probability modelling for over/under props.

use serde::{Deserialize, Serialize};

// Abramowitz & Stegun 7.1.26 coefficients (max absolute error ~1.5e-7).
const A1: f64 = 0.254_829_592;
const A2: f64 = -0.284_496_736;
const A3: f64 = 1.421_413_741;
const A4: f64 = -1.453_152_027;
const A5: f64 = 1.061_405_429;
const P: f64 = 0.327_591_1;

/// Which side of a prop line a bet takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Over,
    Under,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Over => Side::Under,
            Side::Under => Side::Over,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Over => write!(f, "OVER"),
            Side::Under => write!(f, "UNDER"),
        }
    }
}

/// Error function approximation.
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Cumulative probability that a normal variable with the given mean and
/// standard deviation falls at or below `x`.
///
/// With a non-positive (or NaN) `std_dev` the distribution collapses onto the
/// mean and the CDF becomes a step: 0 below the mean, 1 at or above it.
pub fn normal_cdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if !(std_dev > 0.0) {
        return if x >= mean { 1.0 } else { 0.0 };
    }
    let z = (x - mean) / (std_dev * std::f64::consts::SQRT_2);
    (0.5 * (1.0 + erf(z))).clamp(0.0, 1.0)
}

/// Probability that a prop with a projected mean of `projection` clears
/// `line` on the requested side.
pub fn prop_hit_probability(projection: f64, line: f64, std_dev: f64, side: Side) -> f64 {
    let below = normal_cdf(line, projection, std_dev);
    match side {
        Side::Over => 1.0 - below,
        Side::Under => below,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erf_is_odd_and_bounded() {
        assert!(erf(0.0).abs() < 1e-9);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
        assert!(erf(6.0) <= 1.0);
    }

    #[test]
    fn cdf_at_mean_is_half() {
        assert!((normal_cdf(250.0, 250.0, 30.0) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn cdf_one_sigma_above_mean() {
        assert!((normal_cdf(1.0, 0.0, 1.0) - 0.841_344_7).abs() < 1e-6);
        assert!((normal_cdf(-1.0, 0.0, 1.0) - 0.158_655_3).abs() < 1e-6);
    }

    #[test]
    fn cdf_stays_in_unit_interval_far_in_tails() {
        assert_eq!(normal_cdf(1e6, 0.0, 1.0), 1.0);
        let low = normal_cdf(-1e6, 0.0, 1.0);
        assert!((0.0..1e-9).contains(&low));
    }

    #[test]
    fn zero_std_dev_is_a_step_at_the_mean() {
        assert_eq!(normal_cdf(9.9, 10.0, 0.0), 0.0);
        assert_eq!(normal_cdf(10.0, 10.0, 0.0), 1.0);
        assert_eq!(normal_cdf(10.1, 10.0, -3.0), 1.0);
    }

    #[test]
    fn nan_std_dev_stays_a_probability() {
        assert_eq!(normal_cdf(9.9, 10.0, f64::NAN), 0.0);
        assert_eq!(normal_cdf(10.0, 10.0, f64::NAN), 1.0);
        let p = prop_hit_probability(60.0, 55.5, f64::NAN, Side::Over);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn projection_above_line_favours_over() {
        let over = prop_hit_probability(275.0, 249.5, 40.0, Side::Over);
        let under = prop_hit_probability(275.0, 249.5, 40.0, Side::Under);
        assert!(over > 0.5);
        assert!((over + under - 1.0).abs() < 1e-12);
    }

    #[test]
    fn side_opposite_flips() {
        assert_eq!(Side::Over.opposite(), Side::Under);
        assert_eq!(Side::Under.opposite(), Side::Over);
        assert_eq!(Side::Over.to_string(), "OVER");
    }
}
