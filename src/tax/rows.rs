//! Tax table output structures

use serde::{Deserialize, Serialize};

/// One year of the tax table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxYearRow {
    pub year: u32,
    pub revenue: f64,
    /// Charges + loan interest (+ acquisition fees in year 1)
    pub deductible_expense: f64,
    /// Revenue minus deductible expense, before any carry-forward
    pub result: f64,
    /// Result after loss and depreciation carry-forwards
    pub taxable_result: f64,
    /// Loss balance after this year
    pub loss_carry_forward: f64,
    /// Depreciation allowance of the year
    pub depreciation: f64,
    /// Depreciation actually deducted this year (current + deferred)
    pub depreciation_used: f64,
    /// Deferred depreciation balance after this year
    pub depreciation_carry_forward: f64,
    /// Taxable amount under the real regime, never negative
    pub taxable_base_real: f64,
    /// Taxable amount under the flat-allowance micro regime
    pub taxable_base_micro: f64,
}

/// Totals over the whole tax table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSummary {
    pub years: u32,
    pub total_revenue: f64,
    pub total_deductible_expense: f64,
    pub total_depreciation: f64,
    pub total_depreciation_used: f64,
    pub total_taxable_real: f64,
    pub total_taxable_micro: f64,
    pub final_loss_carry_forward: f64,
    pub final_depreciation_carry_forward: f64,
    /// Years with a zero real-regime base
    pub tax_free_years: u32,
}

impl TaxSummary {
    pub fn from_rows(rows: &[TaxYearRow]) -> Self {
        let last = rows.last();
        Self {
            years: rows.len() as u32,
            total_revenue: rows.iter().map(|r| r.revenue).sum(),
            total_deductible_expense: rows.iter().map(|r| r.deductible_expense).sum(),
            total_depreciation: rows.iter().map(|r| r.depreciation).sum(),
            total_depreciation_used: rows.iter().map(|r| r.depreciation_used).sum(),
            total_taxable_real: rows.iter().map(|r| r.taxable_base_real).sum(),
            total_taxable_micro: rows.iter().map(|r| r.taxable_base_micro).sum(),
            final_loss_carry_forward: last.map(|r| r.loss_carry_forward).unwrap_or(0.0),
            final_depreciation_carry_forward: last
                .map(|r| r.depreciation_carry_forward)
                .unwrap_or(0.0),
            tax_free_years: rows.iter().filter(|r| r.taxable_base_real <= 0.0).count() as u32,
        }
    }

    /// Real-regime base minus micro-regime base; negative when the real regime is cheaper
    pub fn real_minus_micro(&self) -> f64 {
        self.total_taxable_real - self.total_taxable_micro
    }
}
