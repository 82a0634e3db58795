//! Core monthly simulation engine

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::records::{percentage_of, MonthlyRecord, ProjectionResult};
use super::state::ProjectionState;
use crate::assumptions::{total_investment, total_monthly_expenses, Assumptions, ExpenseItem, InvestmentItem};
use crate::capital::{monthly_depreciation, LoanSchedule};

/// Where the time-zero capital outlay is booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonthZero {
    /// A dedicated record before the first operating month
    #[default]
    SeparateRecord,
    /// Subtracted from the first operating month's free cash flow
    FoldedIntoFirstMonth,
}

/// Treatment of acquisitions once renewals or capacity squeeze the monthly target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcquisitionPolicy {
    /// New members never drop below zero and total membership is capped
    #[default]
    ClampAtZero,
    /// Historical sheet arithmetic: acquisitions may go negative and
    /// renewals may push membership past capacity
    HistoricalParity,
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Calendar month of the first operating month
    pub start_date: NaiveDate,

    pub month_zero: MonthZero,

    pub acquisition: AcquisitionPolicy,
}

/// April 2025, the opening month of the reference plan
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 1).unwrap_or_default()
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            month_zero: MonthZero::SeparateRecord,
            acquisition: AcquisitionPolicy::ClampAtZero,
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
    config: ProjectionConfig,
}

/// Inputs fixed for the whole run
struct RunContext<'a> {
    investments: &'a [InvestmentItem],
    baseline_expenses: f64,
    total_investment: f64,
    loan: Option<LoanSchedule>,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: Assumptions, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the full monthly projection
    pub fn project(&self, expenses: &[ExpenseItem], investments: &[InvestmentItem]) -> ProjectionResult {
        let months = self.assumptions.projection_months();

        let loan = match self.assumptions.active_loan() {
            Some(terms) if terms.tenure_years == 0 => {
                log::warn!("Loan enabled with zero tenure, projecting without financing");
                None
            }
            Some(terms) => Some(LoanSchedule::from_terms(terms)),
            None => None,
        };

        let ctx = RunContext {
            investments,
            baseline_expenses: total_monthly_expenses(expenses),
            total_investment: total_investment(investments),
            loan,
        };

        log::debug!(
            "Projecting {} months: target {}/month, capacity {}, investment {:.2}, expenses {:.2}/month, loan {}",
            months,
            self.assumptions.monthly_new_members,
            self.assumptions.max_capacity,
            ctx.total_investment,
            ctx.baseline_expenses,
            if ctx.loan.is_some() { "on" } else { "off" },
        );

        let emi = ctx.loan.as_ref().map(|l| l.emi()).unwrap_or(0.0);
        let opening_balance = ctx.loan.as_ref().map(|l| l.period(0).closing_balance).unwrap_or(0.0);
        let period_offset = match self.config.month_zero {
            MonthZero::SeparateRecord => 1,
            MonthZero::FoldedIntoFirstMonth => 0,
        };

        let mut result = ProjectionResult::new(ctx.total_investment, emi);
        let mut state = ProjectionState::new(opening_balance, period_offset, months);

        if self.config.month_zero == MonthZero::SeparateRecord {
            let row = self.month_zero_record(&ctx, &mut state);
            result.add_row(row);
        }

        for _month in 1..=months {
            state.advance_month();

            let row = self.calculate_month(&ctx, &mut state);

            if state.month % 12 == 0 {
                log::debug!(
                    "Year {} closed: {} members, cumulative FCF {:.2}",
                    state.year + 1,
                    row.total_members,
                    row.cumulative_fcf
                );
            }

            result.add_row(row);
        }

        result
    }

    /// Record holding only the upfront outlay
    fn month_zero_record(&self, ctx: &RunContext, state: &mut ProjectionState) -> MonthlyRecord {
        let mut row = MonthlyRecord::new(0, 0);
        row.label = self.label_for(0);
        row.investment = ctx.total_investment;
        row.loan_balance = state.loan_balance;

        // Discount factor at period 0 is 1
        row.fcf = -ctx.total_investment;
        row.dcf = row.fcf;

        state.accumulate(row.fcf, row.dcf);
        row.cumulative_fcf = state.cumulative_fcf;
        row.cumulative_dcf = state.cumulative_dcf;
        row.cumulative_npv = state.cumulative_npv;

        row
    }

    /// Calculate a single operating month
    fn calculate_month(&self, ctx: &RunContext, state: &mut ProjectionState) -> MonthlyRecord {
        let a = &self.assumptions;
        let mut row = MonthlyRecord::new(state.period, state.month);

        // Set timing
        row.label = self.label_for(state.month);
        row.year = state.year;

        self.update_membership(state, &mut row);
        self.calculate_revenue(ctx, state, &mut row);

        // Depreciation and loan service
        row.depreciation = monthly_depreciation(ctx.investments, state.year);
        if let Some(loan) = &ctx.loan {
            let service = loan.period(state.month);
            row.loan_emi = service.emi;
            row.loan_interest = service.interest;
            row.loan_principal = service.principal;
            row.loan_balance = service.closing_balance;
            state.loan_balance = service.closing_balance;
        }

        // P&L; negative PBT yields a tax credit
        row.ebitda = row.gross_margin;
        row.ebitda_pct = percentage_of(row.ebitda, row.total_revenue);
        row.pbt = row.ebitda - row.depreciation - row.loan_interest;
        row.tax = row.pbt * a.tax_rate / 100.0;
        row.pat = row.pbt - row.tax;

        // Cash flow
        if state.month == 1 && self.config.month_zero == MonthZero::FoldedIntoFirstMonth {
            row.investment = ctx.total_investment;
        }
        row.fcf = row.pat + row.depreciation - row.investment;
        row.fcf_pct = percentage_of(row.fcf, row.total_revenue);
        row.dcf = row.fcf / self.discount_factor(state.period);

        state.accumulate(row.fcf, row.dcf);
        row.cumulative_fcf = state.cumulative_fcf;
        row.cumulative_dcf = state.cumulative_dcf;
        row.cumulative_npv = state.cumulative_npv;

        row
    }

    /// Cohort aging, capacity-limited acquisition and membership roll-forward
    fn update_membership(&self, state: &mut ProjectionState, row: &mut MonthlyRecord) {
        let a = &self.assumptions;
        let capacity = a.max_capacity as i64;
        let target = a.monthly_new_members as i64;

        let (repeat, expired) = match state.anniversary_cohort() {
            Some(cohort) => {
                let repeat = (cohort as f64 * a.retention_rate / 100.0).floor() as i64;
                (repeat, cohort - repeat)
            }
            None => (0, 0),
        };

        let room_left = capacity - state.total_members;
        let new_members = (target - repeat).min(room_left);

        // Roll-forward: previous + repeat + new - expired - turned away = total
        let (new_members, turned_away, total) = match self.config.acquisition {
            AcquisitionPolicy::ClampAtZero => {
                let new_members = new_members.max(0);
                let unclamped = state.total_members + repeat + new_members - expired;
                let turned_away = (unclamped - capacity).max(0);
                (new_members, turned_away, unclamped.clamp(0, capacity))
            }
            AcquisitionPolicy::HistoricalParity => {
                let total = (state.total_members + repeat + new_members - expired).max(0);
                (new_members, 0, total)
            }
        };

        row.target_sales = target;
        row.start_members = target;
        row.repeat_members = repeat;
        row.expired_members = expired;
        row.renewals_turned_away = turned_away;
        row.new_members = new_members;
        row.total_members = total;

        state.record_members(new_members, total);
    }

    /// Subscription and PT revenue, operating expenses and gross margin
    fn calculate_revenue(&self, ctx: &RunContext, state: &ProjectionState, row: &mut MonthlyRecord) {
        let a = &self.assumptions;
        let price_factor = escalation(a.annual_price_increase, state.year);
        let expense_factor = escalation(a.annual_expense_increase, state.year);

        // Joiners pay the price in force when they sign
        row.subscription_revenue = row.start_members as f64 * a.subscription_price * price_factor;

        row.pt_members = (row.total_members as f64 * a.pt_penetration / 100.0).floor() as i64;
        row.pt_revenue =
            row.pt_members as f64 * a.pt_subscription_price * a.pt_share_with_gym / 100.0 * price_factor;

        row.total_revenue = row.subscription_revenue + row.pt_revenue;
        row.expenses = ctx.baseline_expenses * expense_factor;

        row.gross_margin = row.total_revenue - row.expenses;
        row.gross_margin_pct = percentage_of(row.gross_margin, row.total_revenue);
        row.pt_sales_pct = percentage_of(row.pt_revenue, row.total_revenue);
    }

    /// Discount divisor for a series period, compounding annually on fractional years
    fn discount_factor(&self, period: u32) -> f64 {
        (1.0 + self.assumptions.discount_rate / 100.0).powf(period as f64 / 12.0)
    }

    /// `YY-MM` label of an operating month; month 0 is the month before start
    fn label_for(&self, month: u32) -> String {
        let start = self.config.start_date;
        let date = if month == 0 {
            start.checked_sub_months(Months::new(1))
        } else {
            start.checked_add_months(Months::new(month - 1))
        };
        date.map(|d| d.format("%y-%m").to_string()).unwrap_or_default()
    }
}

/// Step-wise yearly escalation factor
fn escalation(annual_increase: f64, year: u32) -> f64 {
    (1.0 + annual_increase / 100.0).powi(year as i32)
}

/// Run the projection with the default configuration
pub fn simulate(assumptions: &Assumptions, expenses: &[ExpenseItem], investments: &[InvestmentItem]) -> Vec<MonthlyRecord> {
    ProjectionEngine::new(assumptions.clone(), ProjectionConfig::default())
        .project(expenses, investments)
        .records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{default_expenses, default_investments};
    use approx::assert_relative_eq;

    fn run(assumptions: Assumptions, config: ProjectionConfig) -> ProjectionResult {
        ProjectionEngine::new(assumptions, config).project(&default_expenses(), &default_investments())
    }

    #[test]
    fn test_projection_runs() {
        let result = run(Assumptions::default(), ProjectionConfig::default());

        // Month zero plus 7 years
        assert_eq!(result.records.len(), 85);
        assert!(result.records[0].is_month_zero());
        assert_relative_eq!(result.records[0].fcf, -40_000_000.0);
        assert_eq!(result.records[1].total_members, 80);
        assert_eq!(result.records[13].repeat_members, 32);
        assert_eq!(result.records[13].expired_members, 48);
    }

    #[test]
    fn test_calendar_labels() {
        let result = run(Assumptions::default(), ProjectionConfig::default());
        assert_eq!(result.records[0].label, "25-03");
        assert_eq!(result.records[1].label, "25-04");
        assert_eq!(result.records[10].label, "26-01");
    }

    #[test]
    fn test_first_month_figures() {
        let result = run(Assumptions::default(), ProjectionConfig::default());
        let row = &result.records[1];

        assert_relative_eq!(row.subscription_revenue, 80.0 * 30_000.0);
        // floor(80 * 7%) = 5 PT members at 25000 with a 60% share
        assert_eq!(row.pt_members, 5);
        assert_relative_eq!(row.pt_revenue, 75_000.0);
        assert_relative_eq!(row.expenses, 1_645_196.4, epsilon = 1e-6);
        assert_relative_eq!(row.depreciation, 5_100_000.0 / 12.0, epsilon = 1e-6);
        assert_relative_eq!(row.pat, row.pbt * 0.7, epsilon = 1e-6);
        assert_relative_eq!(row.fcf, row.pat + row.depreciation, epsilon = 1e-6);
        // Period 1 is discounted by one twelfth of a year
        assert_relative_eq!(row.dcf, row.fcf / 1.07f64.powf(1.0 / 12.0), max_relative = 1e-12);
    }

    #[test]
    fn test_folded_month_zero() {
        let config = ProjectionConfig {
            month_zero: MonthZero::FoldedIntoFirstMonth,
            ..Default::default()
        };
        let result = run(Assumptions::default(), config);

        assert_eq!(result.records.len(), 84);
        let first = &result.records[0];
        assert_eq!(first.period, 0);
        assert_eq!(first.month, 1);
        assert_relative_eq!(first.investment, 40_000_000.0);
        assert_relative_eq!(first.fcf, first.pat + first.depreciation - 40_000_000.0, epsilon = 1e-6);
        assert_relative_eq!(first.dcf, first.fcf);
    }

    #[test]
    fn test_price_escalates_yearly_in_steps() {
        let result = run(Assumptions::default(), ProjectionConfig::default());

        assert_relative_eq!(result.records[1].subscription_revenue, result.records[12].subscription_revenue);
        assert_relative_eq!(
            result.records[13].subscription_revenue,
            result.records[12].subscription_revenue * 1.1,
            max_relative = 1e-12
        );
        assert_relative_eq!(result.records[25].expenses, 1_645_196.4 * 1.21, max_relative = 1e-12);
    }

    #[test]
    fn test_members_stay_within_capacity() {
        let assumptions = Assumptions {
            monthly_new_members: 400,
            max_capacity: 1500,
            retention_rate: 90.0,
            ..Default::default()
        };
        let result = run(assumptions, ProjectionConfig::default());

        for row in &result.records {
            assert!(row.total_members >= 0 && row.total_members <= 1500, "month {}", row.month);
            assert!(row.new_members >= 0);
        }
        assert_eq!(result.summary().peak_members, 1500);
    }

    #[test]
    fn test_full_gym_turns_renewals_away() {
        let assumptions = Assumptions {
            monthly_new_members: 400,
            max_capacity: 1500,
            retention_rate: 90.0,
            ..Default::default()
        };
        let result = run(assumptions, ProjectionConfig::default());

        // Month 13: 1500 on the books, 360 of 400 renew, 40 lapse, no room for any
        let row = &result.records[13];
        assert_eq!(row.repeat_members, 360);
        assert_eq!(row.expired_members, 40);
        assert_eq!(row.new_members, 0);
        assert_eq!(row.renewals_turned_away, 320);
        assert_eq!(row.total_members, 1500);

        for pair in result.records[1..].windows(2) {
            let (prev, row) = (&pair[0], &pair[1]);
            assert_eq!(
                prev.total_members + row.repeat_members + row.new_members
                    - row.expired_members
                    - row.renewals_turned_away,
                row.total_members,
                "month {}",
                row.month
            );
        }
    }

    #[test]
    fn test_negative_acquisition_under_parity_policy() {
        // High retention: renewals outgrow expiries and fill the gym
        let assumptions = Assumptions {
            monthly_new_members: 400,
            max_capacity: 1500,
            retention_rate: 90.0,
            ..Default::default()
        };

        let clamped = run(assumptions.clone(), ProjectionConfig::default());
        let parity = run(
            assumptions,
            ProjectionConfig {
                acquisition: AcquisitionPolicy::HistoricalParity,
                ..Default::default()
            },
        );

        assert!(clamped.records.iter().all(|r| r.new_members >= 0));
        assert!(clamped.records.iter().all(|r| r.total_members <= 1500));

        // The historical arithmetic books negative acquisitions and overshoots capacity
        assert!(parity.records.iter().any(|r| r.new_members < 0));
        assert!(parity.records.iter().any(|r| r.total_members > 1500));

        // Both agree until capacity binds
        assert_eq!(clamped.records[1..5], parity.records[1..5]);
    }

    #[test]
    fn test_loan_service_flows_into_pbt() {
        let mut assumptions = Assumptions::default();
        assumptions.loan.enabled = true;

        let result = run(assumptions, ProjectionConfig::default());
        assert_relative_eq!(result.records[0].loan_balance, 20_000_000.0);

        let first = &result.records[1];
        assert_relative_eq!(first.loan_interest, 200_000.0, epsilon = 1e-6);
        assert_relative_eq!(
            first.pbt,
            first.ebitda - first.depreciation - first.loan_interest,
            epsilon = 1e-6
        );
        assert_eq!(result.records[60].loan_balance, 0.0);
        assert_eq!(result.records[61].loan_emi, 0.0);
        assert!(result.loan_emi > 0.0);
    }

    #[test]
    fn test_zero_tenure_loan_is_ignored() {
        let mut assumptions = Assumptions::default();
        assumptions.loan.enabled = true;
        assumptions.loan.tenure_years = 0;

        let result = run(assumptions, ProjectionConfig::default());
        assert!(result.records.iter().all(|r| r.loan_balance == 0.0 && r.loan_interest == 0.0));
    }

    #[test]
    fn test_simulate_matches_engine() {
        let assumptions = Assumptions::default();
        let records = simulate(&assumptions, &default_expenses(), &default_investments());
        let result = run(assumptions, ProjectionConfig::default());
        assert_eq!(records, result.records);
    }
}
