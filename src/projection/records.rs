//! Monthly output records and run-level aggregates

use serde::{Deserialize, Serialize};

/// A single month of projection output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    // Timing
    /// Position in the cash-flow series; discounting uses `period / 12` years
    pub period: u32,
    /// Operating month (1-indexed, 0 = month-zero outlay record)
    pub month: u32,
    /// Calendar label, `YY-MM`
    pub label: String,
    /// Elapsed project year (0-indexed)
    pub year: u32,

    // Membership
    pub target_sales: i64,
    pub new_members: i64,
    pub repeat_members: i64,
    pub expired_members: i64,
    /// Renewals refused because the gym was full
    pub renewals_turned_away: i64,
    pub total_members: i64,
    pub start_members: i64,
    pub pt_members: i64,

    // Revenue and operating cost
    pub subscription_revenue: f64,
    pub pt_revenue: f64,
    pub total_revenue: f64,
    pub expenses: f64,
    pub gross_margin: f64,
    pub gross_margin_pct: Option<f64>,
    pub pt_sales_pct: Option<f64>,

    // P&L
    pub depreciation: f64,
    pub loan_interest: f64,
    pub ebitda: f64,
    pub ebitda_pct: Option<f64>,
    pub pbt: f64,
    pub tax: f64,
    pub pat: f64,

    // Loan service
    pub loan_emi: f64,
    pub loan_principal: f64,
    pub loan_balance: f64,

    // Cash flow
    /// Capital outlay booked in this record
    pub investment: f64,
    pub fcf: f64,
    pub fcf_pct: Option<f64>,
    pub dcf: f64,
    pub cumulative_fcf: f64,
    pub cumulative_dcf: f64,
    pub cumulative_npv: f64,
}

impl MonthlyRecord {
    /// Create an empty record for the given period
    pub fn new(period: u32, month: u32) -> Self {
        Self {
            period,
            month,
            label: String::new(),
            year: 0,
            target_sales: 0,
            new_members: 0,
            repeat_members: 0,
            expired_members: 0,
            renewals_turned_away: 0,
            total_members: 0,
            start_members: 0,
            pt_members: 0,
            subscription_revenue: 0.0,
            pt_revenue: 0.0,
            total_revenue: 0.0,
            expenses: 0.0,
            gross_margin: 0.0,
            gross_margin_pct: None,
            pt_sales_pct: None,
            depreciation: 0.0,
            loan_interest: 0.0,
            ebitda: 0.0,
            ebitda_pct: None,
            pbt: 0.0,
            tax: 0.0,
            pat: 0.0,
            loan_emi: 0.0,
            loan_principal: 0.0,
            loan_balance: 0.0,
            investment: 0.0,
            fcf: 0.0,
            fcf_pct: None,
            dcf: 0.0,
            cumulative_fcf: 0.0,
            cumulative_dcf: 0.0,
            cumulative_npv: 0.0,
        }
    }

    /// True for the dedicated month-zero outlay record
    pub fn is_month_zero(&self) -> bool {
        self.month == 0
    }
}

/// Share of `part` in `whole` as a percentage; undefined for a zero whole
pub fn percentage_of(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 || !whole.is_finite() {
        return None;
    }
    Some(part / whole * 100.0)
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Monthly records in chronological order
    pub records: Vec<MonthlyRecord>,

    /// Upfront capital outlay
    pub total_investment: f64,

    /// Level loan installment (0 without a loan)
    pub loan_emi: f64,
}

impl ProjectionResult {
    pub fn new(total_investment: f64, loan_emi: f64) -> Self {
        Self {
            records: Vec::new(),
            total_investment,
            loan_emi,
        }
    }

    /// Add a monthly record
    pub fn add_row(&mut self, row: MonthlyRecord) {
        self.records.push(row);
    }

    /// Free cash flows in series order
    pub fn cash_flows(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.fcf).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let operating = || self.records.iter().filter(|r| !r.is_month_zero());

        let last = self.records.last();

        ProjectionSummary {
            total_months: operating().count() as u32,
            total_revenue: operating().map(|r| r.total_revenue).sum(),
            total_expenses: operating().map(|r| r.expenses).sum(),
            total_pat: operating().map(|r| r.pat).sum(),
            total_loan_interest: operating().map(|r| r.loan_interest).sum(),
            final_members: last.map(|r| r.total_members).unwrap_or(0),
            peak_members: operating().map(|r| r.total_members).max().unwrap_or(0),
            final_cumulative_fcf: last.map(|r| r.cumulative_fcf).unwrap_or(0.0),
            final_cumulative_dcf: last.map(|r| r.cumulative_dcf).unwrap_or(0.0),
        }
    }

    /// Totals per project year; a month-zero record counts toward year 0
    pub fn yearly_summary(&self) -> Vec<YearSummary> {
        let mut years: Vec<YearSummary> = Vec::new();

        for row in &self.records {
            if years.last().map(|y| y.year) != Some(row.year) {
                years.push(YearSummary {
                    year: row.year,
                    ..Default::default()
                });
            }
            // Records are chronological, so the current year is always last
            if let Some(summary) = years.last_mut() {
                summary.revenue += row.total_revenue;
                summary.expenses += row.expenses;
                summary.ebitda += row.ebitda;
                summary.depreciation += row.depreciation;
                summary.loan_interest += row.loan_interest;
                summary.tax += row.tax;
                summary.pat += row.pat;
                summary.fcf += row.fcf;
                summary.dcf += row.dcf;
                summary.closing_members = row.total_members;
            }
        }

        years
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_months: u32,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_pat: f64,
    pub total_loan_interest: f64,
    pub final_members: i64,
    pub peak_members: i64,
    pub final_cumulative_fcf: f64,
    pub final_cumulative_dcf: f64,
}

/// Annual roll-up of the monthly records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub revenue: f64,
    pub expenses: f64,
    pub ebitda: f64,
    pub depreciation: f64,
    pub loan_interest: f64,
    pub tax: f64,
    pub pat: f64,
    pub fcf: f64,
    pub dcf: f64,
    pub closing_members: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_of_zero_is_undefined() {
        assert_eq!(percentage_of(10.0, 0.0), None);
        assert_eq!(percentage_of(25.0, 100.0), Some(25.0));
        assert_eq!(percentage_of(-50.0, 200.0), Some(-25.0));
    }

    #[test]
    fn test_yearly_summary_groups_by_year() {
        let mut result = ProjectionResult::new(100.0, 0.0);

        let mut zero = MonthlyRecord::new(0, 0);
        zero.fcf = -100.0;
        result.add_row(zero);

        for month in 1..=24u32 {
            let mut row = MonthlyRecord::new(month, month);
            row.year = (month - 1) / 12;
            row.total_revenue = 10.0;
            row.fcf = 5.0;
            row.total_members = month as i64;
            result.add_row(row);
        }

        let years = result.yearly_summary();
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].revenue, 120.0);
        assert_eq!(years[0].fcf, -100.0 + 60.0);
        assert_eq!(years[1].fcf, 60.0);
        assert_eq!(years[1].closing_members, 24);

        let summary = result.summary();
        assert_eq!(summary.total_months, 24);
        assert_eq!(summary.peak_members, 24);
    }
}
