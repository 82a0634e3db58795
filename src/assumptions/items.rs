//! Operating expense and capital investment line items

use serde::{Deserialize, Serialize};

use super::{check_amount, check_rate};
use crate::error::AppraisalResult;

/// Recurring monthly operating expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub id: u32,
    pub name: String,
    /// Baseline monthly amount before annual escalation
    pub monthly_amount: f64,
}

impl ExpenseItem {
    pub fn new(id: u32, name: impl Into<String>, monthly_amount: f64) -> Self {
        Self {
            id,
            name: name.into(),
            monthly_amount,
        }
    }

    pub fn validate(&self) -> AppraisalResult<()> {
        check_amount(&format!("expenses[{}].monthly_amount", self.id), self.monthly_amount)
    }
}

/// Capital asset bought at time zero and depreciated on a reducing balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentItem {
    pub id: u32,
    pub name: String,
    pub cost: f64,
    /// Annual reducing-balance rate, percent
    pub depreciation_rate: f64,
}

impl InvestmentItem {
    pub fn new(id: u32, name: impl Into<String>, cost: f64, depreciation_rate: f64) -> Self {
        Self {
            id,
            name: name.into(),
            cost,
            depreciation_rate,
        }
    }

    pub fn validate(&self) -> AppraisalResult<()> {
        check_amount(&format!("investments[{}].cost", self.id), self.cost)?;
        check_rate(
            &format!("investments[{}].depreciation_rate", self.id),
            self.depreciation_rate,
        )
    }
}

/// Baseline monthly expense total
pub fn total_monthly_expenses(expenses: &[ExpenseItem]) -> f64 {
    expenses.iter().map(|e| e.monthly_amount).sum()
}

/// Upfront capital outlay
pub fn total_investment(investments: &[InvestmentItem]) -> f64 {
    investments.iter().map(|i| i.cost).sum()
}

/// Expense list of the fixed-expense planning sheet
pub fn default_expenses() -> Vec<ExpenseItem> {
    vec![
        ExpenseItem::new(1, "Salaries", 720_000.0),
        ExpenseItem::new(2, "Rent", 324_000.0),
        ExpenseItem::new(3, "Utilities", 351_600.0),
        ExpenseItem::new(4, "Marketing", 177_600.0),
        ExpenseItem::new(5, "Maintenance & supplies", 71_996.4),
    ]
}

/// Asset list of the fixed-asset planning sheet
pub fn default_investments() -> Vec<InvestmentItem> {
    vec![
        InvestmentItem::new(1, "Building (Interiors)", 10_000_000.0, 5.0),
        InvestmentItem::new(2, "Machinery/Equipment", 20_000_000.0, 15.0),
        InvestmentItem::new(3, "Franchise", 3_000_000.0, 25.0),
        InvestmentItem::new(4, "Furniture & fixtures", 5_000_000.0, 10.0),
        InvestmentItem::new(5, "Computers/Electronics", 1_500_000.0, 15.0),
        InvestmentItem::new(6, "Software", 500_000.0, 25.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_totals() {
        assert_relative_eq!(total_monthly_expenses(&default_expenses()), 1_645_196.4, epsilon = 1e-6);
        assert_relative_eq!(total_investment(&default_investments()), 40_000_000.0);
    }

    #[test]
    fn test_item_validation() {
        assert!(ExpenseItem::new(9, "Negative", -1.0).validate().is_err());
        assert!(InvestmentItem::new(9, "Odd", 100.0, 120.0).validate().is_err());
        assert!(InvestmentItem::new(9, "Land", 100.0, 0.0).validate().is_ok());
    }
}
