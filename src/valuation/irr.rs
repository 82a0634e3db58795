//! Internal Rate of Return (IRR) calculation
//!
//! Bisection over the periodic rate, annualized on the way out

use crate::error::{ValuationError, ValuationResult};

/// Bracket for the periodic (monthly) rate search
pub const RATE_LOWER_BOUND: f64 = -0.99;
pub const RATE_UPPER_BOUND: f64 = 0.99;

const NPV_TOLERANCE: f64 = 1e-6;
const RATE_TOLERANCE: f64 = 1e-12;
const MAX_ITERATIONS: u32 = 1000;

/// Calculate the Internal Rate of Return (IRR) for a series of cash flows
/// using bisection.
///
/// # Arguments
/// * `cashflows` - Cash flows per period (positive = inflow, negative = outflow)
/// * `periods_per_year` - Number of periods per year (12 for monthly)
///
/// # Returns
/// * Annual IRR as a decimal (e.g., 0.05 for 5%), `DegenerateInput` when the
///   flows never change sign, `NonConvergence` when no root is bracketed
pub fn calculate_irr(cashflows: &[f64], periods_per_year: u32) -> ValuationResult<f64> {
    if cashflows.len() < 2 {
        return Err(ValuationError::DegenerateInput {
            context: "IRR requires at least 2 cash flows".into(),
        });
    }

    // At least one sign change is required for IRR to exist
    let has_positive = cashflows.iter().any(|&cf| cf > 0.0);
    let has_negative = cashflows.iter().any(|&cf| cf < 0.0);
    if !has_positive || !has_negative {
        return Err(ValuationError::DegenerateInput {
            context: "IRR requires both a negative and a positive cash flow".into(),
        });
    }

    let mut low = RATE_LOWER_BOUND;
    let mut high = RATE_UPPER_BOUND;
    let mut npv_low = bracket_npv(cashflows, low);
    let npv_high = bracket_npv(cashflows, high);

    // Check that we have a root in this interval
    if npv_low.is_nan() || npv_high.is_nan() || npv_low * npv_high > 0.0 {
        return Err(ValuationError::NonConvergence {
            function: "IRR".into(),
            iterations: 0,
            last_npv: npv_high,
        });
    }

    let mut npv_mid = npv_high;
    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        npv_mid = bracket_npv(cashflows, mid);

        if npv_mid.abs() < NPV_TOLERANCE || (high - low) / 2.0 < RATE_TOLERANCE {
            return Ok(annualize(mid, periods_per_year));
        }

        if (npv_mid < 0.0) == (npv_low < 0.0) {
            low = mid;
            npv_low = npv_mid;
        } else {
            high = mid;
        }
    }

    Err(ValuationError::NonConvergence {
        function: "IRR".into(),
        iterations: MAX_ITERATIONS,
        last_npv: npv_mid,
    })
}

/// Calculate NPV at a given periodic rate, first flow undiscounted
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// NPV at `rate`, falling back to the same sum scaled by `(1 + rate)^(n-1)`
/// when deep negative rates underflow the discount factors.
///
/// The scale is positive, so the sign (all bisection needs) is unchanged.
fn bracket_npv(cashflows: &[f64], rate: f64) -> f64 {
    let npv = npv_at_rate(cashflows, rate);
    if npv.is_finite() {
        return npv;
    }

    let last = cashflows.len().saturating_sub(1);
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf * (1.0 + rate).powi((last - t) as i32))
        .sum()
}

/// Compound a periodic rate to an annual one
pub fn annualize(periodic_rate: f64, periods_per_year: u32) -> f64 {
    (1.0 + periodic_rate).powi(periods_per_year as i32) - 1.0
}

/// Periodic rate equivalent to an annual rate
pub fn periodic_rate(annual_rate: f64, periods_per_year: u32) -> f64 {
    (1.0 + annual_rate).powf(1.0 / periods_per_year as f64) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_outlay_recovered_by_membership_fees() {
        // 1.2m fit-out paid back by 60k a month of fees over two years
        let mut cashflows = vec![-1_200_000.0];
        cashflows.extend(vec![60_000.0; 24]);

        let irr = calculate_irr(&cashflows, 12).unwrap();
        assert_relative_eq!(irr, 0.19747, epsilon = 1e-4);
    }

    #[test]
    fn test_twenty_year_horizon() {
        // 240 periods: discount factors at the lower bound underflow to zero
        let mut cashflows = vec![-40_000_000.0];
        cashflows.extend(vec![1_500_000.0; 239]);
        assert!(!npv_at_rate(&cashflows, RATE_LOWER_BOUND).is_finite());

        let annual = calculate_irr(&cashflows, 12).unwrap();
        assert_relative_eq!(annual, 0.55535, epsilon = 1e-4);

        let npv = npv_at_rate(&cashflows, periodic_rate(annual, 12));
        let scale: f64 = cashflows.iter().map(|cf| cf.abs()).sum();
        assert!(npv.abs() / scale < 1e-6, "NPV at IRR was {npv}");
    }

    #[test]
    fn test_round_trip_to_zero_npv() {
        let mut cashflows = vec![-40_000_000.0];
        cashflows.extend((1..=84).map(|t| 300_000.0 + 15_000.0 * t as f64));

        let annual = calculate_irr(&cashflows, 12).unwrap();
        let npv = npv_at_rate(&cashflows, periodic_rate(annual, 12));
        let scale: f64 = cashflows.iter().map(|cf| cf.abs()).sum();
        assert!(npv.abs() / scale < 1e-6, "NPV at IRR was {npv}");
    }

    #[test]
    fn test_no_sign_change_is_degenerate() {
        let err = calculate_irr(&[100.0, 200.0, 300.0], 12).unwrap_err();
        assert!(matches!(err, ValuationError::DegenerateInput { .. }));

        let err = calculate_irr(&[-100.0], 12).unwrap_err();
        assert!(matches!(err, ValuationError::DegenerateInput { .. }));
    }

    #[test]
    fn test_root_outside_bracket_does_not_converge() {
        // 2.5x in one month needs a 150% monthly rate
        let err = calculate_irr(&[-100.0, 250.0], 12).unwrap_err();
        assert!(matches!(err, ValuationError::NonConvergence { .. }));
    }

    #[test]
    fn test_rate_conversions_invert() {
        assert_relative_eq!(annualize(periodic_rate(0.12, 12), 12), 0.12, max_relative = 1e-12);
        assert_relative_eq!(annualize(0.01, 12), 1.01f64.powi(12) - 1.0);
    }
}
