//! Carry-forward state and the single-year transition

use serde::{Deserialize, Serialize};

use super::rows::TaxYearRow;

/// Raw amounts for one tax year
#[derive(Debug, Clone, PartialEq)]
pub struct TaxYearInput {
    /// 1-indexed
    pub year: u32,
    pub revenue: f64,
    pub charges: f64,
    pub interest: f64,
    /// Depreciation allowance of the year
    pub depreciation: f64,
    /// One-time deduction (acquisition fees), non-zero in year 1 only
    pub one_time_deduction: f64,
}

impl TaxYearInput {
    pub fn deductible_expense(&self) -> f64 {
        self.charges + self.interest + self.one_time_deduction
    }
}

/// Deductions deferred to later years. Both balances stay >= 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarryForward {
    /// Unabsorbed operating losses
    pub loss: f64,
    /// Depreciation not yet used against a profit
    pub depreciation: f64,
}

impl CarryForward {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one year under the real regime.
    ///
    /// Losses are absorbed before depreciation. Depreciation may only bring
    /// the result down to zero, never create a loss; the remainder is deferred.
    pub fn apply(self, input: &TaxYearInput) -> (CarryForward, TaxYearRow) {
        let deductible = input.deductible_expense();
        let result = input.revenue - deductible;

        let mut loss = self.loss;
        let mut depreciation_cf = self.depreciation;
        let taxable_result;
        let mut depreciation_used = 0.0;
        let taxable_base;

        if result < 0.0 {
            taxable_result = result + loss;
            loss += result.abs();
            depreciation_cf += input.depreciation;
            taxable_base = 0.0;
        } else {
            let mut remaining = result;

            if loss > 0.0 {
                let compensation = remaining.min(loss);
                remaining -= compensation;
                loss -= compensation;
            }

            if remaining > 0.0 {
                let imputation = remaining.min(input.depreciation + depreciation_cf);
                remaining -= imputation;
                depreciation_used = imputation;
                depreciation_cf = (depreciation_cf + input.depreciation - imputation).max(0.0);
            } else {
                depreciation_cf += input.depreciation;
            }

            taxable_result = remaining;
            taxable_base = remaining.max(0.0);
        }

        let next = CarryForward {
            loss: loss.max(0.0),
            depreciation: depreciation_cf,
        };

        let row = TaxYearRow {
            year: input.year,
            revenue: input.revenue,
            deductible_expense: deductible,
            result,
            taxable_result,
            loss_carry_forward: next.loss,
            depreciation: input.depreciation,
            depreciation_used,
            depreciation_carry_forward: next.depreciation,
            taxable_base_real: taxable_base,
            taxable_base_micro: 0.0,
        };

        (next, row)
    }
}
