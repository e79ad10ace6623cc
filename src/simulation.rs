//! One complete LMNP simulation: validated inputs through to return metrics
//!
//! Components are built in dependency order (loan, rental, depreciation,
//! tax, cashflow, returns). Construction is all-or-nothing: the first failing
//! component aborts it and no partial simulation is returned.

use log::info;
use serde::Serialize;

use crate::assumptions::Assumptions;
use crate::depreciation::DepreciationSchedule;
use crate::error::LmnpResult;
use crate::inputs::{SimulationInputs, SimulationParameters};
use crate::loan::{AmortizationRow, LoanAmortizer, LoanSummary};
use crate::projection::{CashflowProjection, CashflowProjector, CashflowYearRow, ReturnMetrics};
use crate::rental::RentalLedger;
use crate::tax::{TaxEngine, TaxStreams, TaxSummary, TaxYearRow};

/// Immutable result of one submitted parameter set
#[derive(Debug)]
pub struct Simulation {
    parameters: SimulationParameters,
    inputs: SimulationInputs,
    assumptions: Assumptions,
    loan: LoanAmortizer,
    ledger: RentalLedger,
    depreciation: DepreciationSchedule,
    tax: TaxEngine,
    cashflow: CashflowProjection,
    returns: ReturnMetrics,
}

impl Simulation {
    pub fn new(parameters: &SimulationParameters, assumptions: &Assumptions) -> LmnpResult<Self> {
        assumptions.validate()?;
        let inputs = parameters.validate()?;
        let horizon = assumptions.simulation_years;

        let loan = LoanAmortizer::new(
            inputs.borrowed(),
            inputs.financing.term_years,
            inputs.financing.annual_rate,
        )?;

        let ledger = RentalLedger::new(
            inputs.rental.monthly_rent,
            inputs.rental.annual_charges,
            inputs.rental.escalation,
            horizon,
        )?;

        let depreciation = DepreciationSchedule::new(
            inputs.acquisition.price,
            inputs.acquisition.renovation,
            inputs.acquisition.furnishing,
            &assumptions.depreciation,
        )?;

        let streams = TaxStreams {
            revenues: ledger.revenues(),
            charges: ledger.expenses(),
            interest: loan.annual_interest(horizon as usize),
            depreciation: depreciation.total(horizon),
        };
        let tax = TaxEngine::new(
            &inputs.acquisition,
            &streams,
            horizon,
            assumptions.micro_taxable_share,
        )?;

        let cashflow = CashflowProjector::new(&ledger, &loan).project(horizon)?;

        let returns = ReturnMetrics::compute(
            &inputs,
            &loan,
            &cashflow,
            assumptions.resale_years,
            assumptions.discount_rate,
        )?;

        info!(
            "Simulation built: total cost {:.2}, borrowed {:.2}, payment {:.2}/month, NPV {:.2}, IRR {}",
            inputs.total_cost(),
            inputs.borrowed(),
            loan.monthly_payment(),
            returns.npv,
            returns
                .irr
                .map(|r| format!("{:.2}%", r * 100.0))
                .unwrap_or_else(|| "n/a".to_string()),
        );

        Ok(Self {
            parameters: parameters.clone(),
            inputs,
            assumptions: assumptions.clone(),
            loan,
            ledger,
            depreciation,
            tax,
            cashflow,
            returns,
        })
    }

    /// Parameters as submitted, in user units
    pub fn parameters(&self) -> &SimulationParameters {
        &self.parameters
    }

    pub fn inputs(&self) -> &SimulationInputs {
        &self.inputs
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn total_cost(&self) -> f64 {
        self.inputs.total_cost()
    }

    pub fn borrowed(&self) -> f64 {
        self.inputs.borrowed()
    }

    pub fn loan(&self) -> &LoanAmortizer {
        &self.loan
    }

    pub fn loan_summary(&self) -> LoanSummary {
        self.loan.summary()
    }

    pub fn monthly_table(&self) -> &[AmortizationRow] {
        self.loan.monthly_table()
    }

    pub fn annual_table(&self) -> &[AmortizationRow] {
        self.loan.annual_table()
    }

    pub fn ledger(&self) -> &RentalLedger {
        &self.ledger
    }

    pub fn depreciation(&self) -> &DepreciationSchedule {
        &self.depreciation
    }

    pub fn tax(&self) -> &TaxEngine {
        &self.tax
    }

    pub fn tax_table(&self) -> &[TaxYearRow] {
        self.tax.rows()
    }

    pub fn tax_summary(&self) -> TaxSummary {
        self.tax.summary()
    }

    pub fn cashflow(&self) -> &CashflowProjection {
        &self.cashflow
    }

    pub fn cashflow_table(&self) -> &[CashflowYearRow] {
        &self.cashflow.rows
    }

    pub fn returns(&self) -> &ReturnMetrics {
        &self.returns
    }

    /// In percent
    pub fn gross_yield(&self) -> f64 {
        self.returns.gross_yield_pct
    }

    /// In percent
    pub fn net_yield(&self) -> f64 {
        self.returns.net_yield_pct
    }

    pub fn npv(&self) -> f64 {
        self.returns.npv
    }

    /// Annual IRR as a fraction, None when the resale flows have no root
    pub fn irr(&self) -> Option<f64> {
        self.returns.irr
    }

    pub fn wealth_created(&self) -> f64 {
        self.returns.wealth_created
    }

    /// Flat view of the headline figures, suitable for serialization
    pub fn headline(&self) -> SimulationHeadline {
        SimulationHeadline {
            total_cost: self.total_cost(),
            acquisition_fees: self.inputs.acquisition.acquisition_fees(),
            borrowed: self.borrowed(),
            monthly_payment: self.loan.monthly_payment(),
            total_interest: self.loan.total_interest(),
            gross_yield_pct: self.gross_yield(),
            net_yield_pct: self.net_yield(),
            resale_years: self.returns.resale_years,
            resale_value: self.returns.resale_value,
            npv: self.npv(),
            irr_pct: self.irr().map(|r| r * 100.0),
            wealth_created: self.wealth_created(),
        }
    }
}

/// Headline figures of a simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationHeadline {
    pub total_cost: f64,
    pub acquisition_fees: f64,
    pub borrowed: f64,
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub gross_yield_pct: f64,
    pub net_yield_pct: f64,
    pub resale_years: u32,
    pub resale_value: f64,
    pub npv: f64,
    pub irr_pct: Option<f64>,
    pub wealth_created: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LmnpError;
    use crate::projection::npv;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn default_simulation() -> Simulation {
        Simulation::new(&SimulationParameters::default(), &Assumptions::default_lmnp()).unwrap()
    }

    #[test]
    fn test_default_scenario() {
        let sim = default_simulation();

        assert_relative_eq!(sim.total_cost(), 117_000.0, epsilon = 1e-6);
        assert_relative_eq!(sim.borrowed(), 107_000.0, epsilon = 1e-6);
        assert_eq!(sim.annual_table().len(), 20);
        assert_eq!(sim.monthly_table().len(), 240);
        assert_eq!(sim.tax_table().len(), 30);
        assert_eq!(sim.cashflow_table().len(), 30);
        assert_eq!(sim.returns().resale_flows.len(), 10);

        // year 1 deductible carries the 14 000 of fees on top of charges and interest
        let first = &sim.tax_table()[0];
        let interest = sim.annual_table()[0].interest;
        assert_relative_eq!(first.deductible_expense, 1_500.0 + interest + 14_000.0, epsilon = 1e-6);
        assert!(first.result < 0.0);
        assert_relative_eq!(first.taxable_base_real, 0.0);

        let second = &sim.tax_table()[1];
        assert_relative_eq!(second.revenue, 7_200.0 * 1.035, epsilon = 1e-9);
        assert!(second.deductible_expense < 14_000.0);
    }

    #[test]
    fn test_payment_closed_form() {
        let params = SimulationParameters {
            purchase_price: 90_000.0,
            agency_fee_pct: 0.0,
            notary_fee_pct: 0.0,
            furnishing_cost: 0.0,
            down_payment: 0.0,
            ..Default::default()
        };
        let sim = Simulation::new(&params, &Assumptions::default_lmnp()).unwrap();

        let i: f64 = 0.03 / 12.0;
        let expected = 90_000.0 * i / (1.0 - (1.0 + i).powi(-240));
        assert_abs_diff_eq!(sim.loan().monthly_payment(), expected, epsilon = 1e-9);
        assert!((sim.loan().monthly_payment() - 499.14).abs() < 0.01);
    }

    #[test]
    fn test_accessors_agree_with_components() {
        let sim = default_simulation();

        assert_eq!(sim.npv(), sim.returns().npv);
        assert_relative_eq!(sim.npv(), npv(0.05, &sim.returns().resale_flows), epsilon = 1e-9);
        assert_relative_eq!(sim.gross_yield(), 7_200.0 / 117_000.0 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(sim.net_yield(), 5_700.0 / 117_000.0 * 100.0, epsilon = 1e-9);
        assert!(sim.irr().is_some());

        let headline = sim.headline();
        assert_eq!(headline.borrowed, sim.borrowed());
        assert_eq!(headline.npv, sim.npv());
        assert_eq!(headline.irr_pct, sim.irr().map(|r| r * 100.0));
        assert_relative_eq!(headline.acquisition_fees, 14_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_identical_parameters_identical_results() {
        let a = default_simulation();
        let b = default_simulation();
        assert_eq!(a.tax_table(), b.tax_table());
        assert_eq!(a.cashflow_table(), b.cashflow_table());
        assert_eq!(a.annual_table(), b.annual_table());
        assert_eq!(a.headline(), b.headline());
    }

    #[test]
    fn test_cash_purchase() {
        let params = SimulationParameters {
            down_payment: 117_000.0,
            ..Default::default()
        };
        let sim = Simulation::new(&params, &Assumptions::default_lmnp()).unwrap();

        assert_eq!(sim.borrowed(), 0.0);
        assert_eq!(sim.loan().monthly_payment(), 0.0);
        assert!(sim.cashflow_table().iter().all(|r| r.debt_service == 0.0));
        assert_relative_eq!(sim.cashflow_table()[0].cashflow, 5_700.0, epsilon = 1e-9);
        assert!(sim.tax_table().iter().all(|r| r.depreciation > 0.0 || r.year > 25));
    }

    #[test]
    fn test_zero_rate_loan() {
        let params = SimulationParameters {
            loan_rate_pct: 0.0,
            ..Default::default()
        };
        let sim = Simulation::new(&params, &Assumptions::default_lmnp()).unwrap();
        assert_abs_diff_eq!(sim.loan().monthly_payment(), 107_000.0 / 240.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sim.loan().total_interest(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_target_resale_price() {
        let params = SimulationParameters {
            resale_value: 150_000.0,
            ..Default::default()
        };
        let sim = Simulation::new(&params, &Assumptions::default_lmnp()).unwrap();
        assert_eq!(sim.returns().resale_value, 150_000.0);

        let lower = default_simulation();
        assert!(sim.npv() > lower.npv());
        assert!(sim.wealth_created() > lower.wealth_created());
    }

    #[test]
    fn test_high_yield_irr_is_a_root() {
        // small down payment, double rent: IRR is well above 1000 %
        let params = SimulationParameters {
            monthly_rent: 1_200.0,
            down_payment: 6_080.0,
            ..Default::default()
        };
        let sim = Simulation::new(&params, &Assumptions::default_lmnp()).unwrap();
        let flows = &sim.returns().resale_flows;
        assert!(flows[0] < 0.0);

        let rate = sim.irr().expect("flows change sign once");
        assert!(rate > 10.0);
        assert_abs_diff_eq!(npv(rate, flows), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_cost_is_rejected() {
        let params = SimulationParameters {
            purchase_price: 0.0,
            furnishing_cost: 0.0,
            down_payment: 0.0,
            ..Default::default()
        };
        let err = Simulation::new(&params, &Assumptions::default_lmnp()).unwrap_err();
        assert!(matches!(err, LmnpError::InvalidInput { .. }));
    }

    #[test]
    fn test_invalid_parameters_build_nothing() {
        let cases = [
            SimulationParameters {
                purchase_price: -1.0,
                ..Default::default()
            },
            SimulationParameters {
                loan_term_years: 30,
                ..Default::default()
            },
            SimulationParameters {
                down_payment: 200_000.0,
                ..Default::default()
            },
            SimulationParameters {
                resale_value: -5.0,
                ..Default::default()
            },
        ];
        for params in &cases {
            let err = Simulation::new(params, &Assumptions::default_lmnp()).unwrap_err();
            assert!(matches!(err, LmnpError::InvalidInput { .. }), "{:?}", err);
        }
    }

    #[test]
    fn test_custom_assumptions() {
        let assumptions = Assumptions {
            simulation_years: 15,
            resale_years: 15,
            ..Assumptions::default_lmnp()
        };
        let sim = Simulation::new(&SimulationParameters::default(), &assumptions).unwrap();
        assert_eq!(sim.tax_table().len(), 15);
        assert_eq!(sim.cashflow_table().len(), 15);
        assert_eq!(sim.returns().resale_flows.len(), 15);
        assert!(sim.returns().remaining_principal_at_resale > 0.0);

        let bad = Assumptions {
            resale_years: 40,
            ..Assumptions::default_lmnp()
        };
        assert!(Simulation::new(&SimulationParameters::default(), &bad).is_err());
    }
}
