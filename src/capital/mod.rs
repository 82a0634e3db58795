//! Capital side of the plan: asset depreciation and loan amortization

mod depreciation;
mod loan;

pub use depreciation::{
    asset_depreciation_for_year, book_value, depreciation_for_year, depreciation_schedule,
    monthly_depreciation, AssetDepreciation, DepreciationYear,
};
pub use loan::{emi, LoanPeriod, LoanSchedule};
