//! Valuation solvers over the monthly cash-flow series

mod irr;
mod metrics;
mod mirr;

pub use irr::{annualize, calculate_irr, npv_at_rate, periodic_rate, RATE_LOWER_BOUND, RATE_UPPER_BOUND};
pub use metrics::{discounted_payback_period, npv, payback_period, valuation_metrics, ValuationMetrics};
pub use mirr::calculate_mirr;
