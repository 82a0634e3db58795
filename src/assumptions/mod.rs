//! Business assumptions, expense list and capital investment list

mod items;
pub mod loader;

pub use items::{
    default_expenses, default_investments, total_investment, total_monthly_expenses, ExpenseItem,
    InvestmentItem,
};
pub use loader::PlanInputs;

use crate::error::{AppraisalError, AppraisalResult};
use serde::{Deserialize, Serialize};

/// Longest project life the validator accepts, in years
pub const MAX_PROJECT_LIFE: u32 = 100;

/// Optional term loan financing part of the capital outlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanTerms {
    pub enabled: bool,
    pub principal: f64,
    pub tenure_years: u32,
    /// Annual interest rate, percent
    pub annual_rate: f64,
}

impl Default for LoanTerms {
    fn default() -> Self {
        Self {
            enabled: false,
            principal: 20_000_000.0,
            tenure_years: 5,
            annual_rate: 12.0,
        }
    }
}

/// Scalar assumptions for one simulation run.
///
/// All rates are percentages in `[0, 100]`. Missing keys in a JSON document
/// take the values of [`Assumptions::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Assumptions {
    /// Target number of new members signed each month
    pub monthly_new_members: u32,
    /// Annual subscription price paid by a joining member
    pub subscription_price: f64,
    pub annual_price_increase: f64,
    pub annual_expense_increase: f64,
    pub tax_rate: f64,
    /// Project life in years
    pub project_life: u32,
    pub discount_rate: f64,
    pub reinvestment_rate: f64,
    pub financing_rate: f64,
    pub max_capacity: u32,
    /// Share of a monthly cohort that renews twelve months later
    pub retention_rate: f64,
    /// Terminal salvage value as a percentage of total investment
    pub salvage_value: f64,
    /// Share of members buying personal training
    pub pt_penetration: f64,
    pub pt_subscription_price: f64,
    /// Share of PT fees kept by the gym (the rest goes to trainers)
    pub pt_share_with_gym: f64,
    pub loan: LoanTerms,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            monthly_new_members: 80,
            subscription_price: 30_000.0,
            annual_price_increase: 10.0,
            annual_expense_increase: 10.0,
            tax_rate: 30.0,
            project_life: 7,
            discount_rate: 7.0,
            reinvestment_rate: 8.0,
            financing_rate: 12.0,
            max_capacity: 1000,
            retention_rate: 40.0,
            salvage_value: 10.0,
            pt_penetration: 7.0,
            pt_subscription_price: 25_000.0,
            pt_share_with_gym: 60.0,
            loan: LoanTerms::default(),
        }
    }
}

impl Assumptions {
    /// Number of simulated operating months
    pub fn projection_months(&self) -> u32 {
        self.project_life.saturating_mul(12)
    }

    /// Loan terms if financing is switched on
    pub fn active_loan(&self) -> Option<&LoanTerms> {
        self.loan.enabled.then_some(&self.loan)
    }

    /// Reject non-finite numbers, out-of-range rates and negative amounts.
    ///
    /// The engine itself never validates; front ends call this before
    /// handing assumptions over.
    pub fn validate(&self) -> AppraisalResult<()> {
        let rates = [
            ("annualPriceIncrease", self.annual_price_increase),
            ("annualExpenseIncrease", self.annual_expense_increase),
            ("taxRate", self.tax_rate),
            ("discountRate", self.discount_rate),
            ("reinvestmentRate", self.reinvestment_rate),
            ("financingRate", self.financing_rate),
            ("retentionRate", self.retention_rate),
            ("salvageValue", self.salvage_value),
            ("ptPenetration", self.pt_penetration),
            ("ptShareWithGym", self.pt_share_with_gym),
        ];
        for (field, value) in rates {
            check_rate(field, value)?;
        }

        check_amount("subscriptionPrice", self.subscription_price)?;
        check_amount("ptSubscriptionPrice", self.pt_subscription_price)?;

        if self.project_life == 0 {
            return Err(AppraisalError::invalid("projectLife", "must be at least one year"));
        }
        if self.project_life > MAX_PROJECT_LIFE {
            return Err(AppraisalError::invalid(
                "projectLife",
                format!("must be at most {MAX_PROJECT_LIFE} years, got {}", self.project_life),
            ));
        }
        if self.max_capacity == 0 {
            return Err(AppraisalError::invalid("maxCapacity", "must be at least one member"));
        }

        if self.loan.enabled {
            check_amount("loan.principal", self.loan.principal)?;
            check_rate("loan.annualRate", self.loan.annual_rate)?;
            if self.loan.tenure_years == 0 {
                return Err(AppraisalError::invalid(
                    "loan.tenureYears",
                    "must be at least one year when the loan is enabled",
                ));
            }
            if self.loan.tenure_years > MAX_PROJECT_LIFE {
                return Err(AppraisalError::invalid(
                    "loan.tenureYears",
                    format!("must be at most {MAX_PROJECT_LIFE} years"),
                ));
            }
        }

        Ok(())
    }
}

pub(crate) fn check_rate(field: &str, value: f64) -> AppraisalResult<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppraisalError::invalid(
            field,
            format!("rate must be within [0, 100], got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn check_amount(field: &str, value: f64) -> AppraisalResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppraisalError::invalid(
            field,
            format!("amount must be finite and non-negative, got {value}"),
        ));
    }
    Ok(())
}
