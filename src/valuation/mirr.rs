//! Modified Internal Rate of Return

use super::irr::{annualize, periodic_rate};
use crate::error::{ValuationError, ValuationResult};

/// MIRR of a periodic cash-flow series.
///
/// Outflows are discounted to period 0 at the financing rate, inflows are
/// compounded to the last period at the reinvestment rate. Both rates are
/// annual percentages; the result is an annual decimal rate.
pub fn calculate_mirr(
    cashflows: &[f64],
    financing_rate_pct: f64,
    reinvestment_rate_pct: f64,
    periods_per_year: u32,
) -> ValuationResult<f64> {
    if cashflows.len() < 2 {
        return Err(ValuationError::DegenerateInput {
            context: "MIRR requires at least 2 cash flows".into(),
        });
    }

    let finance = periodic_rate(financing_rate_pct / 100.0, periods_per_year);
    let reinvest = periodic_rate(reinvestment_rate_pct / 100.0, periods_per_year);
    let last = cashflows.len() - 1;

    let pv_outflows: f64 = cashflows
        .iter()
        .enumerate()
        .filter(|(_, &cf)| cf < 0.0)
        .map(|(t, &cf)| -cf / (1.0 + finance).powi(t as i32))
        .sum();

    let fv_inflows: f64 = cashflows
        .iter()
        .enumerate()
        .filter(|(_, &cf)| cf > 0.0)
        .map(|(t, &cf)| cf * (1.0 + reinvest).powi((last - t) as i32))
        .sum();

    if pv_outflows == 0.0 {
        return Err(ValuationError::DegenerateInput {
            context: "MIRR undefined without outflows".into(),
        });
    }
    if fv_inflows == 0.0 {
        return Err(ValuationError::DegenerateInput {
            context: "MIRR undefined without inflows".into(),
        });
    }

    let monthly = (fv_inflows / pv_outflows).powf(1.0 / last as f64) - 1.0;
    Ok(annualize(monthly, periods_per_year))
}
