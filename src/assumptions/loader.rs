//! Plan loader
//!
//! Reads a business plan from a directory holding `assumptions.json`,
//! `expenses.csv` and `investments.csv`. Any missing file falls back to the
//! built-in defaults.

use std::fs::File;
use std::path::Path;

use super::{default_expenses, default_investments, Assumptions, ExpenseItem, InvestmentItem};
use crate::error::AppraisalResult;

/// Default path to the plan directory
pub const DEFAULT_PLAN_PATH: &str = "data/plan";

pub const ASSUMPTIONS_FILE: &str = "assumptions.json";
pub const EXPENSES_FILE: &str = "expenses.csv";
pub const INVESTMENTS_FILE: &str = "investments.csv";

/// Load scalar assumptions from a JSON document
pub fn load_assumptions(path: &Path) -> AppraisalResult<Assumptions> {
    let file = File::open(path)?;
    let assumptions = serde_json::from_reader(file)?;
    Ok(assumptions)
}

/// Load expense items from CSV with columns `id,name,monthly_amount`
pub fn load_expenses(path: &Path) -> AppraisalResult<Vec<ExpenseItem>> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut expenses = Vec::new();
    for result in reader.deserialize() {
        let item: ExpenseItem = result?;
        expenses.push(item);
    }

    Ok(expenses)
}

/// Load investment items from CSV with columns `id,name,cost,depreciation_rate`
pub fn load_investments(path: &Path) -> AppraisalResult<Vec<InvestmentItem>> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut investments = Vec::new();
    for result in reader.deserialize() {
        let item: InvestmentItem = result?;
        investments.push(item);
    }

    Ok(investments)
}

/// Everything a simulation run needs
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInputs {
    pub assumptions: Assumptions,
    pub expenses: Vec<ExpenseItem>,
    pub investments: Vec<InvestmentItem>,
}

impl Default for PlanInputs {
    fn default() -> Self {
        Self {
            assumptions: Assumptions::default(),
            expenses: default_expenses(),
            investments: default_investments(),
        }
    }
}

impl PlanInputs {
    /// Load the plan from the default path
    pub fn load_default() -> AppraisalResult<Self> {
        Self::load_from(Path::new(DEFAULT_PLAN_PATH))
    }

    /// Load the plan from a directory, using defaults for absent files
    pub fn load_from(dir: &Path) -> AppraisalResult<Self> {
        let mut plan = Self::default();

        let assumptions_path = dir.join(ASSUMPTIONS_FILE);
        if assumptions_path.exists() {
            plan.assumptions = load_assumptions(&assumptions_path)?;
        } else {
            log::warn!("{} not found, using default assumptions", assumptions_path.display());
        }

        let expenses_path = dir.join(EXPENSES_FILE);
        if expenses_path.exists() {
            plan.expenses = load_expenses(&expenses_path)?;
        } else {
            log::warn!("{} not found, using default expenses", expenses_path.display());
        }

        let investments_path = dir.join(INVESTMENTS_FILE);
        if investments_path.exists() {
            plan.investments = load_investments(&investments_path)?;
        } else {
            log::warn!("{} not found, using default investments", investments_path.display());
        }

        log::debug!(
            "Loaded plan from {}: {} expenses, {} investments",
            dir.display(),
            plan.expenses.len(),
            plan.investments.len()
        );

        Ok(plan)
    }

    /// Validate assumptions and every line item
    pub fn validate(&self) -> AppraisalResult<()> {
        self.assumptions.validate()?;
        for expense in &self.expenses {
            expense.validate()?;
        }
        for investment in &self.investments {
            investment.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_default_plan() {
        let result = PlanInputs::load_default();
        assert!(result.is_ok(), "Failed to load plan: {:?}", result.err());

        let plan = result.unwrap();
        assert_eq!(plan.expenses.len(), 5);
        assert_eq!(plan.investments.len(), 6);
        assert_eq!(plan.investments[1].name, "Machinery/Equipment");
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_missing_directory_falls_back_to_defaults() {
        let plan = PlanInputs::load_from(Path::new("does/not/exist")).unwrap();
        assert_eq!(plan, PlanInputs::default());
    }

    #[test]
    fn test_malformed_expense_row_is_an_error() {
        let dir = tempdir().expect("create temp dir");
        std::fs::write(dir.path().join(EXPENSES_FILE), "id,name,monthly_amount\n1,Rent,lots\n")
            .expect("write expenses");

        assert!(PlanInputs::load_from(dir.path()).is_err());
    }

    #[test]
    fn test_partial_plan_directory() {
        let dir = tempdir().expect("create temp dir");
        std::fs::write(
            dir.path().join(INVESTMENTS_FILE),
            "id,name,cost,depreciation_rate\n1,Treadmills,2500000,15\n",
        )
        .expect("write investments");

        let plan = PlanInputs::load_from(dir.path()).expect("load plan");
        assert_eq!(plan.investments, vec![InvestmentItem::new(1, "Treadmills", 2_500_000.0, 15.0)]);
        assert_eq!(plan.expenses, default_expenses());
        assert_eq!(plan.assumptions, Assumptions::default());
    }
}
