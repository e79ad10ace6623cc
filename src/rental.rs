//! Annual rental income and charges

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, LmnpError, LmnpResult};

/// Income and charges for one rental year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalYearRow {
    pub year: u32,
    pub revenue: f64,
    pub expense: f64,
}

/// Year-by-year rent projection with a fixed annual escalation.
///
/// Charges stay flat over the whole horizon.
#[derive(Debug, Clone)]
pub struct RentalLedger {
    monthly_rent: f64,
    annual_charges: f64,
    escalation: f64,
    rows: Vec<RentalYearRow>,
}

impl RentalLedger {
    pub fn new(
        monthly_rent: f64,
        annual_charges: f64,
        escalation: f64,
        horizon_years: u32,
    ) -> LmnpResult<Self> {
        ensure_non_negative("monthly_rent", monthly_rent)?;
        ensure_non_negative("annual_charges", annual_charges)?;
        if !escalation.is_finite() || escalation <= -1.0 {
            return Err(LmnpError::invalid(
                "rent_escalation",
                format!("must be a finite rate above -100%, got {}", escalation),
            ));
        }
        if horizon_years == 0 {
            return Err(LmnpError::invalid("horizon_years", "must be at least 1"));
        }

        let mut rows = Vec::with_capacity(horizon_years as usize);
        let mut revenue = monthly_rent * 12.0;
        for year in 1..=horizon_years {
            if year > 1 {
                revenue *= 1.0 + escalation;
            }
            rows.push(RentalYearRow {
                year,
                revenue,
                expense: annual_charges,
            });
        }

        Ok(Self {
            monthly_rent,
            annual_charges,
            escalation,
            rows,
        })
    }

    pub fn monthly_rent(&self) -> f64 {
        self.monthly_rent
    }

    pub fn annual_charges(&self) -> f64 {
        self.annual_charges
    }

    pub fn escalation(&self) -> f64 {
        self.escalation
    }

    pub fn horizon(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[RentalYearRow] {
        &self.rows
    }

    pub fn revenues(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.revenue).collect()
    }

    pub fn expenses(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.expense).collect()
    }

    pub fn total_revenue(&self) -> f64 {
        self.rows.iter().map(|r| r.revenue).sum()
    }
}
