//! Running state carried from month to month

/// State of the business at a point in the projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current operating month (1-indexed, 0 before the first month)
    pub month: u32,

    /// Current position in the cash-flow series
    pub period: u32,

    /// Elapsed project year (0-indexed)
    pub year: u32,

    /// Members on the books at end of the previous month
    pub total_members: i64,

    /// New members signed in each operating month so far
    pub new_member_history: Vec<i64>,

    /// Outstanding loan principal
    pub loan_balance: f64,

    pub cumulative_fcf: f64,
    pub cumulative_dcf: f64,
    pub cumulative_npv: f64,

    /// Offset between operating month and series period
    /// (0 when the outlay is folded into month 1, 1 with a month-zero record)
    period_offset: u32,
}

impl ProjectionState {
    /// Initialize state at projection start
    pub fn new(opening_loan_balance: f64, period_offset: u32, months: u32) -> Self {
        Self {
            month: 0,
            period: 0,
            year: 0,
            total_members: 0,
            new_member_history: Vec::with_capacity(months as usize),
            loan_balance: opening_loan_balance,
            cumulative_fcf: 0.0,
            cumulative_dcf: 0.0,
            cumulative_npv: 0.0,
            period_offset,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.month += 1;
        self.period = self.month - 1 + self.period_offset;
        self.year = (self.month - 1) / 12;
    }

    /// New members of the cohort now reaching its anniversary, if any
    pub fn anniversary_cohort(&self) -> Option<i64> {
        let index = (self.month as usize).checked_sub(13)?;
        self.new_member_history.get(index).copied()
    }

    /// Record this month's acquisitions and membership
    pub fn record_members(&mut self, new_members: i64, total_members: i64) {
        self.new_member_history.push(new_members);
        self.total_members = total_members;
    }

    /// Fold a month's cash flows into the running totals
    pub fn accumulate(&mut self, fcf: f64, dcf: f64) {
        self.cumulative_fcf += fcf;
        self.cumulative_dcf += dcf;
        self.cumulative_npv += dcf;
    }
}
