//! Amortization table rows and loan summary

use serde::{Deserialize, Serialize};

/// One period of an amortization table (a month or a year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-indexed month or year
    pub period: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    /// Outstanding principal after this period's payment
    pub remaining_principal: f64,
}

/// Headline loan figures shown alongside the tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub borrowed: f64,
    pub monthly_payment: f64,
    pub annuity: f64,
    pub total_payments: f64,
    pub total_interest: f64,
    pub term_years: u32,
    pub annual_rate: f64,
}

/// Round to a fixed number of decimals (half away from zero)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // no "-0.00" in tables
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round a monetary amount to cents
pub fn round_cents(value: f64) -> f64 {
    round_to(value, 2)
}

/// Group a monthly table into consecutive 12-month blocks.
///
/// Flows are sums of the already-rounded monthly values; the remaining
/// principal is the last month's balance of the block.
pub fn annualize(monthly: &[AmortizationRow]) -> Vec<AmortizationRow> {
    monthly
        .chunks(12)
        .enumerate()
        .map(|(idx, block)| {
            let payment: f64 = block.iter().map(|r| r.payment).sum();
            let interest: f64 = block.iter().map(|r| r.interest).sum();
            let principal: f64 = block.iter().map(|r| r.principal).sum();
            let remaining = block.last().map(|r| r.remaining_principal).unwrap_or(0.0);

            AmortizationRow {
                period: idx as u32 + 1,
                payment: round_cents(payment),
                interest: round_cents(interest),
                principal: round_cents(principal),
                remaining_principal: remaining,
            }
        })
        .collect()
}
