//! Loan amortization: monthly schedule, annual aggregation and totals

mod amortizer;
mod schedule;

pub use amortizer::{monthly_payment, LoanAmortizer};
pub use schedule::{annualize, round_cents, round_to, AmortizationRow, LoanSummary};
