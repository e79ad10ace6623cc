//! CSV-based defaults loader
//!
//! The defaults document is a two-column `key,value` CSV of numeric values,
//! read once at startup. It seeds both the simulation parameters and the
//! assumption constants.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use crate::error::{LmnpError, LmnpResult};

/// Default path to the defaults document
pub const DEFAULT_PARAMETERS_PATH: &str = "data/defaults.csv";

/// Every key the simulator understands
pub const KNOWN_KEYS: &[&str] = &[
    // parameters
    "purchase_price",
    "agency_fee_pct",
    "notary_fee_pct",
    "renovation_cost",
    "furnishing_cost",
    "down_payment",
    "loan_rate_pct",
    "loan_term_years",
    "monthly_rent",
    "annual_charges",
    "rent_escalation_pct",
    "resale_value",
    "surface_m2",
    // assumptions
    "simulation_years",
    "resale_years",
    "discount_rate_pct",
    "micro_allowance_pct",
    "property_life_years",
    "furnishing_life_years",
    "wear_factor",
];

/// Numeric key/value defaults
#[derive(Debug, Clone, Default)]
pub struct DefaultsDocument {
    values: HashMap<String, f64>,
}

impl DefaultsDocument {
    /// Load the document from the default location
    pub fn load_default() -> LmnpResult<Self> {
        Self::load_from(Path::new(DEFAULT_PARAMETERS_PATH))
    }

    /// Load the document from a specific file
    pub fn load_from(path: &Path) -> LmnpResult<Self> {
        let file = File::open(path)?;
        debug!("Loading defaults from {}", path.display());
        Self::from_reader(file)
    }

    /// Parse a document from any reader (file, string buffer, ...)
    pub fn from_reader<R: Read>(reader: R) -> LmnpResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut values = HashMap::new();

        for result in reader.records() {
            let record = result?;
            let key = record.get(0).unwrap_or_default().to_string();
            let raw = record.get(1).unwrap_or_default();

            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!("Ignoring unknown defaults key {:?}", key);
                continue;
            }

            let value: f64 = raw.parse().map_err(|_| LmnpError::ParseValue {
                key: key.clone(),
                value: raw.to_string(),
            })?;
            values.insert(key, value);
        }

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn get_or(&self, key: &str, fallback: f64) -> f64 {
        self.get(key).unwrap_or(fallback)
    }

    /// Integer-valued key (years); fractional or negative values are rejected
    pub fn get_years(&self, key: &str, fallback: u32) -> LmnpResult<u32> {
        match self.get(key) {
            None => Ok(fallback),
            Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(v as u32),
            Some(v) => Err(LmnpError::ParseValue {
                key: key.to_string(),
                value: v.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
