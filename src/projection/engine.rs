//! Annual cashflow and equity build-up projection

use log::debug;

use super::cashflows::{CashflowProjection, CashflowYearRow};
use crate::error::{LmnpError, LmnpResult};
use crate::loan::LoanAmortizer;
use crate::rental::RentalLedger;

/// Combines rental income and loan service into yearly cashflow
pub struct CashflowProjector<'a> {
    ledger: &'a RentalLedger,
    loan: &'a LoanAmortizer,
}

impl<'a> CashflowProjector<'a> {
    pub fn new(ledger: &'a RentalLedger, loan: &'a LoanAmortizer) -> Self {
        Self { ledger, loan }
    }

    /// Project `horizon_years` years; years after the loan term carry no debt service
    pub fn project(&self, horizon_years: u32) -> LmnpResult<CashflowProjection> {
        if horizon_years == 0 {
            return Err(LmnpError::invalid("horizon_years", "must be at least 1"));
        }
        let horizon = horizon_years as usize;
        if self.ledger.horizon() < horizon {
            return Err(LmnpError::invalid(
                "horizon_years",
                format!(
                    "rental ledger covers {} years, {} requested",
                    self.ledger.horizon(),
                    horizon
                ),
            ));
        }

        let payments = self.loan.annual_payments(horizon);
        let principal = self.loan.annual_principal(horizon);

        let mut projection = CashflowProjection::new();
        for (idx, rental) in self.ledger.rows().iter().take(horizon).enumerate() {
            let cashflow = rental.revenue - rental.expense - payments[idx];
            projection.add_row(CashflowYearRow {
                year: rental.year,
                revenue: rental.revenue,
                expense: rental.expense,
                debt_service: payments[idx],
                principal_repaid: principal[idx],
                cashflow,
                wealth_accumulation: principal[idx] + cashflow,
                cumulative_wealth: 0.0,
            });
        }

        debug!(
            "Projected {} years, final cumulative wealth {:.2}",
            projection.len(),
            projection.summary().final_cumulative_wealth
        );

        Ok(projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fixtures() -> (RentalLedger, LoanAmortizer) {
        (
            RentalLedger::new(600.0, 1_500.0, 0.035, 30).unwrap(),
            LoanAmortizer::new(107_000.0, 20, 0.03).unwrap(),
        )
    }

    #[test]
    fn test_projection_runs() {
        let (ledger, loan) = fixtures();
        let projection = CashflowProjector::new(&ledger, &loan).project(30).unwrap();

        assert_eq!(projection.len(), 30);
        let first = &projection.rows[0];
        assert_relative_eq!(first.debt_service, loan.annual_table()[0].payment);
        assert_relative_eq!(first.cashflow, 7_200.0 - 1_500.0 - first.debt_service);
        assert_relative_eq!(first.wealth_accumulation, first.principal_repaid + first.cashflow);
        assert_relative_eq!(first.cumulative_wealth, first.wealth_accumulation);
    }

    #[test]
    fn test_no_debt_after_term() {
        let (ledger, loan) = fixtures();
        let projection = CashflowProjector::new(&ledger, &loan).project(30).unwrap();

        assert!(projection.rows[19].debt_service > 0.0);
        for row in &projection.rows[20..] {
            assert_eq!(row.debt_service, 0.0);
            assert_eq!(row.principal_repaid, 0.0);
            assert_relative_eq!(row.cashflow, row.revenue - row.expense);
        }
    }

    #[test]
    fn test_cumulative_wealth_is_running_sum() {
        let (ledger, loan) = fixtures();
        let projection = CashflowProjector::new(&ledger, &loan).project(30).unwrap();

        let mut running = 0.0;
        for row in &projection.rows {
            running += row.wealth_accumulation;
            assert_relative_eq!(row.cumulative_wealth, running, epsilon = 1e-6);
        }

        let summary = projection.summary();
        assert_relative_eq!(summary.final_cumulative_wealth, running, epsilon = 1e-6);
        assert_relative_eq!(summary.total_principal_repaid, 107_000.0, epsilon = 2.5);
        assert!(summary.first_positive_year.is_some());
    }

    #[test]
    fn test_shorter_horizon() {
        let (ledger, loan) = fixtures();
        let projection = CashflowProjector::new(&ledger, &loan).project(10).unwrap();
        assert_eq!(projection.len(), 10);
        assert!(CashflowProjector::new(&ledger, &loan).project(31).is_err());
        assert!(CashflowProjector::new(&ledger, &loan).project(0).is_err());
    }
}
