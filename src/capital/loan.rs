//! Equated monthly installment (EMI) loan amortization

use serde::{Deserialize, Serialize};

use crate::assumptions::LoanTerms;

/// One month of loan service
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoanPeriod {
    /// Month of loan life (1-indexed, 0 = disbursement)
    pub month: u32,
    pub opening_balance: f64,
    pub emi: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

/// Full amortization table for a fixed-rate loan
#[derive(Debug, Clone, PartialEq)]
pub struct LoanSchedule {
    principal: f64,
    monthly_rate: f64,
    emi: f64,
    rows: Vec<LoanPeriod>,
}

/// Level payment for `principal` over `months` at `monthly_rate`
pub fn emi(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    if monthly_rate.abs() < 1e-12 {
        return principal / months as f64;
    }

    let growth = (1.0 + monthly_rate).powi(months as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}

impl LoanSchedule {
    /// Build the schedule for `principal` at `annual_rate_percent` over
    /// `tenure_years`.
    ///
    /// A zero tenure yields an empty schedule: nothing is drawn and every
    /// month reports a zero balance.
    pub fn new(principal: f64, annual_rate_percent: f64, tenure_years: u32) -> Self {
        let monthly_rate = annual_rate_percent / 12.0 / 100.0;
        let months = tenure_years * 12;
        let emi = emi(principal, monthly_rate, months);

        let mut rows = Vec::with_capacity(months as usize);
        let mut balance = principal;

        for month in 1..=months {
            let interest = balance * monthly_rate;
            // Last installment settles whatever rounding left behind
            let principal_part = if month == months {
                balance
            } else {
                (emi - interest).min(balance)
            };
            let closing = (balance - principal_part).max(0.0);

            rows.push(LoanPeriod {
                month,
                opening_balance: balance,
                emi,
                interest,
                principal: principal_part,
                closing_balance: closing,
            });

            balance = closing;
        }

        Self {
            principal,
            monthly_rate,
            emi,
            rows,
        }
    }

    /// Schedule for the assumptions' loan terms
    pub fn from_terms(terms: &LoanTerms) -> Self {
        Self::new(terms.principal, terms.annual_rate, terms.tenure_years)
    }

    pub fn emi(&self) -> f64 {
        self.emi
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn monthly_rate(&self) -> f64 {
        self.monthly_rate
    }

    /// Loan life in months
    pub fn tenure_months(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn rows(&self) -> &[LoanPeriod] {
        &self.rows
    }

    /// Loan service for `month` (1-indexed).
    ///
    /// Month 0 is the disbursement; months past tenure carry no payment and
    /// a zero balance.
    pub fn period(&self, month: u32) -> LoanPeriod {
        if month == 0 {
            let outstanding = if self.rows.is_empty() { 0.0 } else { self.principal };
            return LoanPeriod {
                month,
                closing_balance: outstanding,
                ..Default::default()
            };
        }

        self.rows
            .get(month as usize - 1)
            .copied()
            .unwrap_or(LoanPeriod {
                month,
                ..Default::default()
            })
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_paid(&self) -> f64 {
        self.rows.iter().map(|r| r.interest + r.principal).sum()
    }
}
