//! Constant-payment loan amortization

use log::debug;

use super::schedule::{annualize, round_cents, AmortizationRow, LoanSummary};
use crate::error::{ensure_non_negative, LmnpError, LmnpResult};

/// Longest term the amortizer accepts
pub const MAX_TERM_YEARS: u32 = 100;

/// Fixed-rate, fixed-term loan with its monthly and annual tables.
///
/// Built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct LoanAmortizer {
    principal: f64,
    term_years: u32,
    annual_rate: f64,
    monthly_payment: f64,
    monthly: Vec<AmortizationRow>,
    annual: Vec<AmortizationRow>,
}

impl LoanAmortizer {
    /// Build the schedule for `principal` over `term_years` at `annual_rate` (fraction)
    pub fn new(principal: f64, term_years: u32, annual_rate: f64) -> LmnpResult<Self> {
        ensure_non_negative("principal", principal)?;
        ensure_non_negative("annual_rate", annual_rate)?;
        if term_years == 0 {
            return Err(LmnpError::invalid("term_years", "loan term must be at least 1 year"));
        }
        if term_years > MAX_TERM_YEARS {
            return Err(LmnpError::invalid(
                "term_years",
                format!("loan term must not exceed {} years, got {}", MAX_TERM_YEARS, term_years),
            ));
        }

        let periods = term_years * 12;
        let monthly_rate = annual_rate / 12.0;
        let monthly_payment = monthly_payment(principal, periods, monthly_rate);
        let monthly = monthly_schedule(principal, periods, monthly_rate, monthly_payment);
        let annual = annualize(&monthly);

        debug!(
            "Loan of {:.2} over {} years at {:.4}: payment {:.2}",
            principal, term_years, annual_rate, monthly_payment
        );

        Ok(Self {
            principal,
            term_years,
            annual_rate,
            monthly_payment,
            monthly,
            annual,
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    /// Unrounded constant monthly payment
    pub fn monthly_payment(&self) -> f64 {
        self.monthly_payment
    }

    /// Number of monthly periods
    pub fn periods(&self) -> u32 {
        self.term_years * 12
    }

    /// Twelve monthly payments
    pub fn annuity(&self) -> f64 {
        self.monthly_payment * 12.0
    }

    pub fn total_payments(&self) -> f64 {
        self.monthly_payment * self.periods() as f64
    }

    pub fn total_interest(&self) -> f64 {
        self.total_payments() - self.principal
    }

    pub fn monthly_table(&self) -> &[AmortizationRow] {
        &self.monthly
    }

    pub fn annual_table(&self) -> &[AmortizationRow] {
        &self.annual
    }

    /// Outstanding principal at the end of `year` (0 once the loan is repaid)
    pub fn remaining_after_year(&self, year: u32) -> f64 {
        if year == 0 {
            return self.principal;
        }
        self.annual
            .get(year as usize - 1)
            .map(|r| r.remaining_principal)
            .unwrap_or(0.0)
    }

    /// Annual interest, padded with zeros to `horizon` years
    pub fn annual_interest(&self, horizon: usize) -> Vec<f64> {
        pad(self.annual.iter().map(|r| r.interest), horizon)
    }

    /// Annual debt service, padded with zeros to `horizon` years
    pub fn annual_payments(&self, horizon: usize) -> Vec<f64> {
        pad(self.annual.iter().map(|r| r.payment), horizon)
    }

    /// Annual principal repaid, padded with zeros to `horizon` years
    pub fn annual_principal(&self, horizon: usize) -> Vec<f64> {
        pad(self.annual.iter().map(|r| r.principal), horizon)
    }

    pub fn summary(&self) -> LoanSummary {
        LoanSummary {
            borrowed: self.principal,
            monthly_payment: self.monthly_payment,
            annuity: self.annuity(),
            total_payments: self.total_payments(),
            total_interest: self.total_interest(),
            term_years: self.term_years,
            annual_rate: self.annual_rate,
        }
    }
}

/// Constant payment of an annuity loan; straight division when the rate is zero
pub fn monthly_payment(principal: f64, periods: u32, monthly_rate: f64) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if monthly_rate > 0.0 {
        principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powi(-(periods as i32)))
    } else {
        principal / periods as f64
    }
}

fn monthly_schedule(
    principal: f64,
    periods: u32,
    monthly_rate: f64,
    payment: f64,
) -> Vec<AmortizationRow> {
    let mut remaining = principal;
    let mut rows = Vec::with_capacity(periods as usize);

    for month in 1..=periods {
        let interest = remaining * monthly_rate;
        let principal_part = payment - interest;
        // float drift on the last months must not push the balance below zero
        remaining = (remaining - principal_part).max(0.0);

        rows.push(AmortizationRow {
            period: month,
            payment: round_cents(payment),
            interest: round_cents(interest),
            principal: round_cents(principal_part),
            remaining_principal: round_cents(remaining),
        });
    }

    rows
}

fn pad(values: impl Iterator<Item = f64>, horizon: usize) -> Vec<f64> {
    let mut out: Vec<f64> = values.take(horizon).collect();
    out.resize(horizon, 0.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_payment_matches_closed_form() {
        let loan = LoanAmortizer::new(90_000.0, 20, 0.03).unwrap();
        let i: f64 = 0.03 / 12.0;
        let expected = 90_000.0 * i / (1.0 - (1.0 + i).powi(-240));

        assert_relative_eq!(loan.monthly_payment(), expected, epsilon = 1e-9);
        assert!((loan.monthly_payment() - 499.14).abs() < 0.01);
        assert_eq!(loan.monthly_table().len(), 240);
        assert_eq!(loan.annual_table().len(), 20);
    }

    #[test]
    fn test_final_balance_is_zero() {
        for &(p, years, rate) in &[
            (90_000.0, 20, 0.03),
            (250_000.0, 25, 0.045),
            (12_345.67, 5, 0.011),
            (50_000.0, 10, 0.0),
        ] {
            let loan = LoanAmortizer::new(p, years, rate).unwrap();
            let last = loan.monthly_table().last().unwrap();
            assert!(last.remaining_principal.abs() <= 0.01, "{} left", last.remaining_principal);
            assert_eq!(loan.remaining_after_year(years), last.remaining_principal);
        }
    }

    #[test]
    fn test_rows_split_payment() {
        let loan = LoanAmortizer::new(107_000.0, 20, 0.03).unwrap();

        let mut previous = loan.principal();
        for row in loan.monthly_table() {
            assert!((row.principal + row.interest - row.payment).abs() <= 0.011);
            assert!(row.remaining_principal <= previous + 1e-9);
            assert!(row.remaining_principal >= 0.0);
            previous = row.remaining_principal;
        }
    }

    #[test]
    fn test_annual_principal_sums_to_borrowed() {
        let loan = LoanAmortizer::new(90_000.0, 20, 0.03).unwrap();
        let repaid: f64 = loan.annual_table().iter().map(|r| r.principal).sum();

        // one cent of rounding per month at most
        assert!((repaid - 90_000.0).abs() < 2.4, "repaid {}", repaid);
    }

    #[test]
    fn test_zero_rate_divides_evenly() {
        let loan = LoanAmortizer::new(60_000.0, 5, 0.0).unwrap();
        assert_relative_eq!(loan.monthly_payment(), 1_000.0);
        assert_relative_eq!(loan.total_interest(), 0.0);
        assert!(loan.monthly_table().iter().all(|r| r.interest == 0.0));
    }

    #[test]
    fn test_zero_principal() {
        let loan = LoanAmortizer::new(0.0, 15, 0.04).unwrap();
        assert_eq!(loan.monthly_payment(), 0.0);
        assert!(loan.annual_table().iter().all(|r| r.payment == 0.0));
        assert_eq!(loan.remaining_after_year(3), 0.0);
    }

    #[test]
    fn test_totals() {
        let loan = LoanAmortizer::new(90_000.0, 20, 0.03).unwrap();
        assert_relative_eq!(loan.total_payments(), loan.monthly_payment() * 240.0);
        assert_relative_eq!(loan.total_interest(), loan.total_payments() - 90_000.0);
        assert_relative_eq!(loan.annuity(), loan.monthly_payment() * 12.0);
        assert!((loan.total_interest() - 29_793.08).abs() < 0.5);
    }

    #[test]
    fn test_padding_beyond_term() {
        let loan = LoanAmortizer::new(90_000.0, 20, 0.03).unwrap();
        let payments = loan.annual_payments(30);
        assert_eq!(payments.len(), 30);
        assert!(payments[19] > 0.0);
        assert_eq!(payments[20], 0.0);
        assert_eq!(loan.remaining_after_year(25), 0.0);
        assert_eq!(loan.remaining_after_year(0), 90_000.0);
        assert_eq!(loan.annual_interest(10).len(), 10);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(LoanAmortizer::new(-1.0, 20, 0.03).is_err());
        assert!(LoanAmortizer::new(1_000.0, 0, 0.03).is_err());
        assert!(LoanAmortizer::new(1_000.0, 10, -0.01).is_err());
        assert!(LoanAmortizer::new(f64::NAN, 10, 0.01).is_err());
    }

    #[test]
    fn test_rejects_term_beyond_maximum() {
        assert!(LoanAmortizer::new(1_000.0, MAX_TERM_YEARS, 0.01).is_ok());

        let err = LoanAmortizer::new(1_000.0, MAX_TERM_YEARS + 1, 0.01).unwrap_err();
        assert!(matches!(err, LmnpError::InvalidInput { .. }));
        assert!(LoanAmortizer::new(1_000.0, 400_000_000, 0.01).is_err());
        assert!(LoanAmortizer::new(1_000.0, u32::MAX, 0.01).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_loan_is_fully_repaid(
            principal in 0.0f64..500_000.0,
            term_years in 1u32..=30,
            annual_rate in 0.0f64..0.1
        ) {
            let loan = LoanAmortizer::new(principal, term_years, annual_rate).unwrap();
            let last = loan.monthly_table().last().unwrap();

            prop_assert_eq!(loan.monthly_table().len(), term_years as usize * 12);
            prop_assert!(
                last.remaining_principal.abs() <= 0.01,
                "{} left",
                last.remaining_principal
            );
        }

        #[test]
        fn prop_principal_and_interest_make_the_payment(
            principal in 0.0f64..500_000.0,
            term_years in 1u32..=30,
            annual_rate in 0.0f64..0.1
        ) {
            let loan = LoanAmortizer::new(principal, term_years, annual_rate).unwrap();

            for row in loan.monthly_table() {
                prop_assert!((row.principal + row.interest - row.payment).abs() <= 0.011);
                prop_assert!(row.remaining_principal >= 0.0);
            }
        }
    }
}
