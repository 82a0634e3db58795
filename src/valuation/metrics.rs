//! Investment appraisal metrics derived from the monthly records

use serde::Serialize;

use super::irr::calculate_irr;
use super::mirr::calculate_mirr;
use crate::assumptions::Assumptions;
use crate::error::ValuationResult;
use crate::projection::MonthlyRecord;

/// Scalar appraisal of one projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationMetrics {
    /// Sum of discounted free cash flows, outlay included
    pub npv: f64,
    /// Annual IRR as a decimal
    pub irr: ValuationResult<f64>,
    /// Annual MIRR as a decimal
    pub mirr: ValuationResult<f64>,
    /// Years until cumulative FCF turns positive; `None` if never
    pub payback_period: Option<f64>,
    /// Years until cumulative DCF turns positive; `None` if never
    pub discounted_payback_period: Option<f64>,
    pub total_investment: f64,
    /// Residual asset value at the end of the project (informational, not in NPV)
    pub salvage_value: f64,
}

/// NPV of the series: the last record's running total
pub fn npv(records: &[MonthlyRecord]) -> f64 {
    records.last().map(|r| r.cumulative_npv).unwrap_or(0.0)
}

/// Years until `cumulative` first turns positive
fn first_positive(records: &[MonthlyRecord], cumulative: impl Fn(&MonthlyRecord) -> f64) -> Option<f64> {
    records
        .iter()
        .find(|r| cumulative(r) > 0.0)
        .map(|r| r.period as f64 / 12.0)
}

/// Simple payback period in years
pub fn payback_period(records: &[MonthlyRecord]) -> Option<f64> {
    first_positive(records, |r| r.cumulative_fcf)
}

/// Discounted payback period in years
pub fn discounted_payback_period(records: &[MonthlyRecord]) -> Option<f64> {
    first_positive(records, |r| r.cumulative_dcf)
}

/// Compute every appraisal metric for a projection
pub fn valuation_metrics(records: &[MonthlyRecord], assumptions: &Assumptions) -> ValuationMetrics {
    let cashflows: Vec<f64> = records.iter().map(|r| r.fcf).collect();
    let total_investment: f64 = records.iter().map(|r| r.investment).sum();

    let irr = calculate_irr(&cashflows, 12);
    if let Err(e) = &irr {
        log::warn!("IRR undefined: {e}");
    }

    let mirr = calculate_mirr(&cashflows, assumptions.financing_rate, assumptions.reinvestment_rate, 12);
    if let Err(e) = &mirr {
        log::warn!("MIRR undefined: {e}");
    }

    let payback = payback_period(records);
    let discounted_payback = discounted_payback_period(records);
    if payback.is_none() {
        log::warn!("Investment not paid back within {} years", assumptions.project_life);
    }

    ValuationMetrics {
        npv: npv(records),
        irr,
        mirr,
        payback_period: payback,
        discounted_payback_period: discounted_payback,
        total_investment,
        salvage_value: total_investment * assumptions.salvage_value / 100.0,
    }
}
