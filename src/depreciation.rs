//! Straight-line depreciation of the property and its furnishings
//!
//! Depreciation is a tax-only deduction: the streams feed the tax engine and
//! never reduce cashflow.

use serde::{Deserialize, Serialize};

use crate::assumptions::DepreciationAssumptions;
use crate::error::{ensure_non_negative, LmnpError, LmnpResult};

/// Depreciation split for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationYearRow {
    pub year: u32,
    pub property: f64,
    pub furnishing: f64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct DepreciationSchedule {
    property_annual: f64,
    furnishing_annual: f64,
    property_life: u32,
    furnishing_life: u32,
}

impl DepreciationSchedule {
    /// `price + renovation` is depreciated after the wear adjustment;
    /// furnishings are depreciated in full
    pub fn new(
        price: f64,
        renovation: f64,
        furnishing: f64,
        assumptions: &DepreciationAssumptions,
    ) -> LmnpResult<Self> {
        ensure_non_negative("purchase_price", price)?;
        ensure_non_negative("renovation_cost", renovation)?;
        ensure_non_negative("furnishing_cost", furnishing)?;
        assumptions.validate()?;

        Ok(Self {
            property_annual: (price + renovation) * assumptions.wear_factor
                / assumptions.property_life_years as f64,
            furnishing_annual: furnishing / assumptions.furnishing_life_years as f64,
            property_life: assumptions.property_life_years,
            furnishing_life: assumptions.furnishing_life_years,
        })
    }

    pub fn property_annual(&self) -> f64 {
        self.property_annual
    }

    pub fn furnishing_annual(&self) -> f64 {
        self.furnishing_annual
    }

    /// Property depreciation for a 1-indexed year
    pub fn property(&self, year: u32) -> f64 {
        if year >= 1 && year <= self.property_life {
            self.property_annual
        } else {
            0.0
        }
    }

    /// Furnishing depreciation for a 1-indexed year
    pub fn furnishing(&self, year: u32) -> f64 {
        if year >= 1 && year <= self.furnishing_life {
            self.furnishing_annual
        } else {
            0.0
        }
    }

    /// Combined stream over `horizon` years, zero once both lives are exhausted
    pub fn total(&self, horizon: u32) -> Vec<f64> {
        (1..=horizon)
            .map(|year| self.property(year) + self.furnishing(year))
            .collect()
    }

    /// Total depreciable amount over both lives
    pub fn depreciable_base(&self) -> f64 {
        self.property_annual * self.property_life as f64
            + self.furnishing_annual * self.furnishing_life as f64
    }

    pub fn rows(&self, horizon: u32) -> Vec<DepreciationYearRow> {
        (1..=horizon)
            .map(|year| {
                let property = self.property(year);
                let furnishing = self.furnishing(year);
                DepreciationYearRow {
                    year,
                    property,
                    furnishing,
                    total: property + furnishing,
                }
            })
            .collect()
    }
}

impl DepreciationAssumptions {
    pub fn validate(&self) -> LmnpResult<()> {
        if self.property_life_years == 0 {
            return Err(LmnpError::invalid("property_life_years", "must be at least 1"));
        }
        if self.furnishing_life_years == 0 {
            return Err(LmnpError::invalid("furnishing_life_years", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.wear_factor) {
            return Err(LmnpError::invalid(
                "wear_factor",
                format!("must be within [0, 1], got {}", self.wear_factor),
            ));
        }
        Ok(())
    }
}
