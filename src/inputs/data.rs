//! Simulation parameters and their validated, typed form

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assumptions::DefaultsDocument;
use crate::error::{ensure_non_negative, LmnpError, LmnpResult};

/// Shortest loan term offered
pub const MIN_LOAN_TERM_YEARS: u32 = 5;

/// Longest loan term offered
pub const MAX_LOAN_TERM_YEARS: u32 = 25;

/// Down payments may exceed the total cost by float noise only
const CENT_TOLERANCE: f64 = 0.005;

/// Resale inputs at or above this value are read as a target price
pub const RESALE_PRICE_THRESHOLD: f64 = 100.0;

/// Energy performance rating (DPE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyRating {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl fmt::Display for EnergyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for EnergyRating {
    type Err = LmnpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(EnergyRating::A),
            "B" => Ok(EnergyRating::B),
            "C" => Ok(EnergyRating::C),
            "D" => Ok(EnergyRating::D),
            "E" => Ok(EnergyRating::E),
            "F" => Ok(EnergyRating::F),
            "G" => Ok(EnergyRating::G),
            other => Err(LmnpError::invalid(
                "energy_rating",
                format!("expected a letter from A to G, got {:?}", other),
            )),
        }
    }
}

/// Descriptive data shown in reports, never used in calculations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub city: String,
    pub surface_m2: f64,
    pub energy_rating: EnergyRating,
}

impl Default for PropertyMetadata {
    fn default() -> Self {
        Self {
            city: "Toulouse".to_string(),
            surface_m2: 30.0,
            energy_rating: EnergyRating::D,
        }
    }
}

/// Flat parameter set as entered by the user.
///
/// Rates are percentages here (6.0 means 6 %). `resale_value` is dual
/// purpose: below 100 it is an annual inflation rate in percent, otherwise a
/// target resale price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub purchase_price: f64,
    pub agency_fee_pct: f64,
    pub notary_fee_pct: f64,
    pub renovation_cost: f64,
    pub furnishing_cost: f64,
    pub down_payment: f64,
    pub loan_rate_pct: f64,
    pub loan_term_years: u32,
    pub monthly_rent: f64,
    pub annual_charges: f64,
    pub rent_escalation_pct: f64,
    pub resale_value: f64,
    #[serde(default)]
    pub metadata: PropertyMetadata,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            purchase_price: 100_000.0,
            agency_fee_pct: 6.0,
            notary_fee_pct: 8.0,
            renovation_cost: 0.0,
            furnishing_cost: 3_000.0,
            down_payment: 10_000.0,
            loan_rate_pct: 3.0,
            loan_term_years: 20,
            monthly_rent: 600.0,
            annual_charges: 1_500.0,
            rent_escalation_pct: 3.5,
            resale_value: 1.0,
            metadata: PropertyMetadata::default(),
        }
    }
}

impl SimulationParameters {
    /// Parameters seeded from a defaults document; missing keys keep the built-in defaults
    pub fn from_defaults(doc: &DefaultsDocument) -> LmnpResult<Self> {
        let base = Self::default();
        Ok(Self {
            purchase_price: doc.get_or("purchase_price", base.purchase_price),
            agency_fee_pct: doc.get_or("agency_fee_pct", base.agency_fee_pct),
            notary_fee_pct: doc.get_or("notary_fee_pct", base.notary_fee_pct),
            renovation_cost: doc.get_or("renovation_cost", base.renovation_cost),
            furnishing_cost: doc.get_or("furnishing_cost", base.furnishing_cost),
            down_payment: doc.get_or("down_payment", base.down_payment),
            loan_rate_pct: doc.get_or("loan_rate_pct", base.loan_rate_pct),
            loan_term_years: doc.get_years("loan_term_years", base.loan_term_years)?,
            monthly_rent: doc.get_or("monthly_rent", base.monthly_rent),
            annual_charges: doc.get_or("annual_charges", base.annual_charges),
            rent_escalation_pct: doc.get_or("rent_escalation_pct", base.rent_escalation_pct),
            resale_value: doc.get_or("resale_value", base.resale_value),
            metadata: PropertyMetadata {
                surface_m2: doc.get_or("surface_m2", base.metadata.surface_m2),
                ..base.metadata
            },
        })
    }

    /// Validate and convert to fractions. Nothing is coerced: any bad field is an error.
    pub fn validate(&self) -> LmnpResult<SimulationInputs> {
        let acquisition = AcquisitionInputs::new(
            self.purchase_price,
            self.agency_fee_pct / 100.0,
            self.notary_fee_pct / 100.0,
            self.renovation_cost,
            self.furnishing_cost,
        )?;

        let financing = FinancingInputs::new(
            self.down_payment,
            self.loan_rate_pct / 100.0,
            self.loan_term_years,
        )?;

        let rental = RentalInputs::new(
            self.monthly_rent,
            self.annual_charges,
            self.rent_escalation_pct / 100.0,
        )?;

        let resale = ResaleEstimate::from_input(self.resale_value)?;

        ensure_non_negative("surface_m2", self.metadata.surface_m2)?;

        // yields are ratios over the total cost
        if acquisition.total_cost() <= 0.0 {
            return Err(LmnpError::invalid(
                "purchase_price",
                "total acquisition cost must be positive",
            ));
        }

        let borrowed = acquisition.total_cost() - financing.down_payment;
        if borrowed < -CENT_TOLERANCE {
            return Err(LmnpError::invalid(
                "down_payment",
                format!(
                    "down payment {:.2} exceeds the total acquisition cost {:.2}",
                    financing.down_payment,
                    acquisition.total_cost()
                ),
            ));
        }

        Ok(SimulationInputs {
            acquisition,
            financing,
            rental,
            resale,
            metadata: self.metadata.clone(),
        })
    }

    /// Exact-value identity of this parameter set, usable as a hash key
    pub fn cache_key(&self) -> SimulationKey {
        SimulationKey {
            amounts: [
                self.purchase_price.to_bits(),
                self.agency_fee_pct.to_bits(),
                self.notary_fee_pct.to_bits(),
                self.renovation_cost.to_bits(),
                self.furnishing_cost.to_bits(),
                self.down_payment.to_bits(),
                self.loan_rate_pct.to_bits(),
                self.monthly_rent.to_bits(),
                self.annual_charges.to_bits(),
                self.rent_escalation_pct.to_bits(),
                self.resale_value.to_bits(),
                self.metadata.surface_m2.to_bits(),
            ],
            loan_term_years: self.loan_term_years,
            city: self.metadata.city.clone(),
            energy_rating: self.metadata.energy_rating,
        }
    }
}

/// Bit-exact key of a [`SimulationParameters`] value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationKey {
    amounts: [u64; 12],
    loan_term_years: u32,
    city: String,
    energy_rating: EnergyRating,
}

/// Purchase side of the investment; fee rates are fractions of the price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionInputs {
    pub price: f64,
    pub agency_rate: f64,
    pub notary_rate: f64,
    pub renovation: f64,
    pub furnishing: f64,
}

impl AcquisitionInputs {
    pub fn new(
        price: f64,
        agency_rate: f64,
        notary_rate: f64,
        renovation: f64,
        furnishing: f64,
    ) -> LmnpResult<Self> {
        ensure_non_negative("purchase_price", price)?;
        ensure_non_negative("agency_fee", agency_rate)?;
        ensure_non_negative("notary_fee", notary_rate)?;
        ensure_non_negative("renovation_cost", renovation)?;
        ensure_non_negative("furnishing_cost", furnishing)?;
        Ok(Self {
            price,
            agency_rate,
            notary_rate,
            renovation,
            furnishing,
        })
    }

    /// Agency and notary fees, deductible once in the first tax year
    pub fn acquisition_fees(&self) -> f64 {
        self.price * (self.agency_rate + self.notary_rate)
    }

    /// Price with fees, renovation and furnishing
    pub fn total_cost(&self) -> f64 {
        self.price * (1.0 + self.agency_rate + self.notary_rate) + self.renovation + self.furnishing
    }

    /// Net seller price plus works and furniture: the base resale value grows from
    pub fn net_cost(&self) -> f64 {
        self.price + self.renovation + self.furnishing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingInputs {
    pub down_payment: f64,
    /// Annual nominal rate as a fraction
    pub annual_rate: f64,
    pub term_years: u32,
}

impl FinancingInputs {
    pub fn new(down_payment: f64, annual_rate: f64, term_years: u32) -> LmnpResult<Self> {
        ensure_non_negative("down_payment", down_payment)?;
        ensure_non_negative("loan_rate", annual_rate)?;
        if !(MIN_LOAN_TERM_YEARS..=MAX_LOAN_TERM_YEARS).contains(&term_years) {
            return Err(LmnpError::invalid(
                "loan_term_years",
                format!(
                    "must be between {} and {}, got {}",
                    MIN_LOAN_TERM_YEARS, MAX_LOAN_TERM_YEARS, term_years
                ),
            ));
        }
        Ok(Self {
            down_payment,
            annual_rate,
            term_years,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalInputs {
    pub monthly_rent: f64,
    pub annual_charges: f64,
    /// Annual rent escalation as a fraction
    pub escalation: f64,
}

impl RentalInputs {
    pub fn new(monthly_rent: f64, annual_charges: f64, escalation: f64) -> LmnpResult<Self> {
        ensure_non_negative("monthly_rent", monthly_rent)?;
        ensure_non_negative("annual_charges", annual_charges)?;
        if !escalation.is_finite() || escalation <= -1.0 {
            return Err(LmnpError::invalid(
                "rent_escalation",
                format!("must be above -100%, got {}", escalation * 100.0),
            ));
        }
        Ok(Self {
            monthly_rent,
            annual_charges,
            escalation,
        })
    }

    pub fn annual_rent(&self) -> f64 {
        self.monthly_rent * 12.0
    }
}

/// How the resale value at the end of the holding period is estimated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ResaleEstimate {
    /// Net cost compounded at this annual rate (fraction)
    InflationRate(f64),
    /// Fixed resale price
    TargetPrice(f64),
}

impl ResaleEstimate {
    /// Decode the dual-purpose input: `< 100` is a percentage, `>= 100` a price
    pub fn from_input(value: f64) -> LmnpResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(LmnpError::invalid(
                "resale_value",
                format!(
                    "expected an inflation rate in % (< {}) or a target price, got {}",
                    RESALE_PRICE_THRESHOLD, value
                ),
            ));
        }
        if value < RESALE_PRICE_THRESHOLD {
            Ok(ResaleEstimate::InflationRate(value / 100.0))
        } else {
            Ok(ResaleEstimate::TargetPrice(value))
        }
    }
}

/// Validated inputs, all rates as fractions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInputs {
    pub acquisition: AcquisitionInputs,
    pub financing: FinancingInputs,
    pub rental: RentalInputs,
    pub resale: ResaleEstimate,
    pub metadata: PropertyMetadata,
}

impl SimulationInputs {
    pub fn total_cost(&self) -> f64 {
        self.acquisition.total_cost()
    }

    /// Amount financed by the loan; a cash purchase borrows nothing
    pub fn borrowed(&self) -> f64 {
        let borrowed = self.acquisition.total_cost() - self.financing.down_payment;
        if borrowed < CENT_TOLERANCE {
            0.0
        } else {
            borrowed
        }
    }
}
