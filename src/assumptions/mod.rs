//! Simulation-wide assumptions: horizons, depreciation lives, discounting

pub mod loader;

pub use loader::{DefaultsDocument, DEFAULT_PARAMETERS_PATH};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LmnpError, LmnpResult};

/// Years covered by the rental, tax and cashflow tables
pub const DEFAULT_SIMULATION_YEARS: u32 = 30;

/// Holding period used for resale metrics
pub const DEFAULT_RESALE_YEARS: u32 = 10;

/// Discount rate applied to the resale cashflow vector
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.05;

/// Share of revenue treated as taxable under the micro regime
pub const DEFAULT_MICRO_TAXABLE_SHARE: f64 = 0.5;

/// Useful lives and wear adjustment for depreciation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationAssumptions {
    pub property_life_years: u32,
    pub furnishing_life_years: u32,
    /// Share of `price + renovation` that is depreciable (land and wear excluded)
    pub wear_factor: f64,
}

impl Default for DepreciationAssumptions {
    fn default() -> Self {
        Self {
            property_life_years: 25,
            furnishing_life_years: 8,
            wear_factor: 0.8,
        }
    }
}

/// Container for all simulation assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub simulation_years: u32,
    pub resale_years: u32,
    pub discount_rate: f64,
    pub micro_taxable_share: f64,
    pub depreciation: DepreciationAssumptions,
}

impl Assumptions {
    /// Standard LMNP assumptions
    pub fn default_lmnp() -> Self {
        Self {
            simulation_years: DEFAULT_SIMULATION_YEARS,
            resale_years: DEFAULT_RESALE_YEARS,
            discount_rate: DEFAULT_DISCOUNT_RATE,
            micro_taxable_share: DEFAULT_MICRO_TAXABLE_SHARE,
            depreciation: DepreciationAssumptions::default(),
        }
    }

    /// Standard assumptions overridden by whatever the document provides
    pub fn from_defaults(doc: &DefaultsDocument) -> LmnpResult<Self> {
        let base = Self::default_lmnp();
        let assumptions = Self {
            simulation_years: doc.get_years("simulation_years", base.simulation_years)?,
            resale_years: doc.get_years("resale_years", base.resale_years)?,
            discount_rate: doc
                .get("discount_rate_pct")
                .map(|pct| pct / 100.0)
                .unwrap_or(base.discount_rate),
            micro_taxable_share: doc
                .get("micro_allowance_pct")
                .map(|pct| 1.0 - pct / 100.0)
                .unwrap_or(base.micro_taxable_share),
            depreciation: DepreciationAssumptions {
                property_life_years: doc.get_years(
                    "property_life_years",
                    base.depreciation.property_life_years,
                )?,
                furnishing_life_years: doc.get_years(
                    "furnishing_life_years",
                    base.depreciation.furnishing_life_years,
                )?,
                wear_factor: doc.get_or("wear_factor", base.depreciation.wear_factor),
            },
        };
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Load assumptions from a defaults document on disk
    pub fn from_csv_path(path: &Path) -> LmnpResult<Self> {
        Self::from_defaults(&DefaultsDocument::load_from(path)?)
    }

    pub fn validate(&self) -> LmnpResult<()> {
        if self.simulation_years == 0 {
            return Err(LmnpError::invalid("simulation_years", "must be at least 1"));
        }
        if self.resale_years == 0 || self.resale_years > self.simulation_years {
            return Err(LmnpError::invalid(
                "resale_years",
                format!(
                    "must be between 1 and the simulation horizon ({}), got {}",
                    self.simulation_years, self.resale_years
                ),
            ));
        }
        if !self.discount_rate.is_finite() || self.discount_rate <= -1.0 {
            return Err(LmnpError::invalid(
                "discount_rate",
                format!("must be above -100%, got {}", self.discount_rate),
            ));
        }
        if !(0.0..=1.0).contains(&self.micro_taxable_share) {
            return Err(LmnpError::invalid(
                "micro_taxable_share",
                format!("must be within [0, 1], got {}", self.micro_taxable_share),
            ));
        }
        self.depreciation.validate()
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_lmnp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lmnp() {
        let a = Assumptions::default_lmnp();
        assert_eq!(a.simulation_years, 30);
        assert_eq!(a.resale_years, 10);
        assert_eq!(a.depreciation.property_life_years, 25);
        assert_eq!(a.depreciation.furnishing_life_years, 8);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_overrides_from_document() {
        let csv = "key,value\nresale_years,15\ndiscount_rate_pct,0.5\nmicro_allowance_pct,30\n";
        let doc = DefaultsDocument::from_reader(csv.as_bytes()).unwrap();
        let a = Assumptions::from_defaults(&doc).unwrap();

        assert_eq!(a.resale_years, 15);
        assert!((a.discount_rate - 0.005).abs() < 1e-12);
        assert!((a.micro_taxable_share - 0.7).abs() < 1e-12);
        assert_eq!(a.simulation_years, 30);
    }

    #[test]
    fn test_resale_beyond_horizon_rejected() {
        let mut a = Assumptions::default_lmnp();
        a.resale_years = 31;
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_load_default_file() {
        let a = Assumptions::from_csv_path(Path::new(DEFAULT_PARAMETERS_PATH)).unwrap();
        assert_eq!(a, Assumptions::default_lmnp());
    }
}
