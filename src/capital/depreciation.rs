//! Reducing-balance depreciation of the capital investment list

use serde::{Deserialize, Serialize};

use crate::assumptions::InvestmentItem;

/// Book value of one asset after `year` full years of depreciation
pub fn book_value(asset: &InvestmentItem, year: u32) -> f64 {
    asset.cost * (1.0 - asset.depreciation_rate / 100.0).powi(year as i32)
}

/// Depreciation charged on one asset during zero-indexed `year`
pub fn asset_depreciation_for_year(asset: &InvestmentItem, year: u32) -> f64 {
    book_value(asset, year) * asset.depreciation_rate / 100.0
}

/// Annual depreciation of the whole portfolio during zero-indexed `year`
pub fn depreciation_for_year(investments: &[InvestmentItem], year: u32) -> f64 {
    investments
        .iter()
        .map(|asset| asset_depreciation_for_year(asset, year))
        .sum()
}

/// Monthly charge within `year` (annual figure spread evenly)
pub fn monthly_depreciation(investments: &[InvestmentItem], year: u32) -> f64 {
    depreciation_for_year(investments, year) / 12.0
}

/// One year of an asset's depreciation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationYear {
    /// Zero-indexed project year
    pub year: u32,
    pub opening_book_value: f64,
    pub depreciation: f64,
    pub closing_book_value: f64,
}

/// Yearly depreciation table of a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDepreciation {
    pub id: u32,
    pub name: String,
    pub cost: f64,
    pub depreciation_rate: f64,
    pub years: Vec<DepreciationYear>,
}

impl AssetDepreciation {
    pub fn total_depreciation(&self) -> f64 {
        self.years.iter().map(|y| y.depreciation).sum()
    }

    pub fn final_book_value(&self) -> f64 {
        self.years.last().map(|y| y.closing_book_value).unwrap_or(self.cost)
    }
}

/// Per-asset depreciation tables over the project life
pub fn depreciation_schedule(investments: &[InvestmentItem], project_life_years: u32) -> Vec<AssetDepreciation> {
    investments
        .iter()
        .map(|asset| {
            let mut opening = asset.cost;
            let years = (0..project_life_years)
                .map(|year| {
                    let depreciation = opening * asset.depreciation_rate / 100.0;
                    let closing = opening - depreciation;
                    let row = DepreciationYear {
                        year,
                        opening_book_value: opening,
                        depreciation,
                        closing_book_value: closing,
                    };
                    opening = closing;
                    row
                })
                .collect();

            AssetDepreciation {
                id: asset.id,
                name: asset.name.clone(),
                cost: asset.cost,
                depreciation_rate: asset.depreciation_rate,
                years,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::default_investments;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_year_is_cost_times_rate() {
        let assets = vec![InvestmentItem::new(1, "Machinery", 20_000_000.0, 15.0)];
        assert_relative_eq!(depreciation_for_year(&assets, 0), 3_000_000.0);
        // Second year charges on the reduced balance
        assert_relative_eq!(depreciation_for_year(&assets, 1), 2_550_000.0, epsilon = 1e-6);
        assert_relative_eq!(monthly_depreciation(&assets, 0), 250_000.0);
    }

    #[test]
    fn test_zero_rate_never_depreciates() {
        let assets = vec![InvestmentItem::new(1, "Land", 5_000_000.0, 0.0)];
        for year in 0..10 {
            assert_eq!(depreciation_for_year(&assets, year), 0.0);
        }
    }

    #[test]
    fn test_empty_portfolio() {
        assert_eq!(depreciation_for_year(&[], 3), 0.0);
    }

    #[test]
    fn test_book_value_never_negative() {
        let mut assets = default_investments();
        assets.push(InvestmentItem::new(7, "Written off", 1_000.0, 100.0));

        for schedule in depreciation_schedule(&assets, 30) {
            for year in &schedule.years {
                assert!(year.closing_book_value >= 0.0, "{} went negative", schedule.name);
                assert!(year.depreciation >= 0.0);
            }
        }
    }

    #[test]
    fn test_schedule_matches_year_function() {
        let assets = default_investments();
        let schedule = depreciation_schedule(&assets, 7);

        assert_eq!(schedule.len(), assets.len());
        for year in 0..7u32 {
            let from_schedule: f64 = schedule.iter().map(|a| a.years[year as usize].depreciation).sum();
            assert_relative_eq!(from_schedule, depreciation_for_year(&assets, year), max_relative = 1e-12);
        }

        let software = &schedule[5];
        assert_relative_eq!(
            software.total_depreciation() + software.final_book_value(),
            software.cost,
            max_relative = 1e-12
        );
    }
}
