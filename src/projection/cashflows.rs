//! Cashflow output structures for projections

use serde::{Deserialize, Serialize};

/// A single year of the cashflow table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowYearRow {
    pub year: u32,
    pub revenue: f64,
    pub expense: f64,
    /// Loan payments of the year (zero after the loan term)
    pub debt_service: f64,
    /// Principal part of the debt service
    pub principal_repaid: f64,
    /// Revenue - expense - debt service
    pub cashflow: f64,
    /// Principal repaid + cashflow
    pub wealth_accumulation: f64,
    pub cumulative_wealth: f64,
}

/// Complete cashflow projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowProjection {
    pub rows: Vec<CashflowYearRow>,
}

impl CashflowProjection {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Add a row, accumulating wealth onto the previous row
    pub fn add_row(&mut self, mut row: CashflowYearRow) {
        let previous = self.rows.last().map(|r| r.cumulative_wealth).unwrap_or(0.0);
        row.cumulative_wealth = previous + row.wealth_accumulation;
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cashflow column
    pub fn cashflows(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.cashflow).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> CashflowSummary {
        let total_cashflow: f64 = self.rows.iter().map(|r| r.cashflow).sum();
        let total_principal_repaid: f64 = self.rows.iter().map(|r| r.principal_repaid).sum();
        let total_debt_service: f64 = self.rows.iter().map(|r| r.debt_service).sum();
        let final_cumulative_wealth = self.rows.last().map(|r| r.cumulative_wealth).unwrap_or(0.0);

        CashflowSummary {
            years: self.rows.len() as u32,
            total_cashflow,
            total_principal_repaid,
            total_debt_service,
            final_cumulative_wealth,
            negative_cashflow_years: self.rows.iter().filter(|r| r.cashflow < 0.0).count() as u32,
            first_positive_year: self.rows.iter().find(|r| r.cashflow > 0.0).map(|r| r.year),
        }
    }
}

impl Default for CashflowProjection {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary statistics for a cashflow projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowSummary {
    pub years: u32,
    pub total_cashflow: f64,
    pub total_principal_repaid: f64,
    pub total_debt_service: f64,
    pub final_cumulative_wealth: f64,
    pub negative_cashflow_years: u32,
    /// First year the property pays for itself, if ever
    pub first_positive_year: Option<u32>,
}
