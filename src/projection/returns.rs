//! Yields and resale-horizon return metrics

use serde::{Deserialize, Serialize};

use super::cashflows::CashflowProjection;
use super::irr::{calculate_irr, npv, MAX_ITERATIONS};
use crate::error::{LmnpError, LmnpResult};
use crate::inputs::{ResaleEstimate, SimulationInputs};
use crate::loan::{round_to, LoanAmortizer};

/// Return figures of one simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnMetrics {
    /// Annual rent / total cost, in percent
    pub gross_yield_pct: f64,
    /// (Annual rent - charges) / total cost, in percent
    pub net_yield_pct: f64,
    pub resale_years: u32,
    pub resale_value: f64,
    /// Outstanding loan repaid out of the sale
    pub remaining_principal_at_resale: f64,
    pub discount_rate: f64,
    /// Yearly flows with the down payment and net sale proceeds folded in
    pub resale_flows: Vec<f64>,
    pub npv: f64,
    /// Periodic (annual) IRR as a fraction; None when the flows admit no root
    pub irr: Option<f64>,
    /// Sum of the resale flows ("enrichissement")
    pub wealth_created: f64,
}

impl ReturnMetrics {
    pub fn compute(
        inputs: &SimulationInputs,
        loan: &LoanAmortizer,
        projection: &CashflowProjection,
        resale_years: u32,
        discount_rate: f64,
    ) -> LmnpResult<Self> {
        let horizon = resale_years as usize;
        if resale_years == 0 || horizon > projection.len() {
            return Err(LmnpError::invalid(
                "resale_years",
                format!(
                    "must be between 1 and {} years, got {}",
                    projection.len(),
                    resale_years
                ),
            ));
        }

        let resale_value = resale_value(inputs, resale_years);
        let remaining = loan.remaining_after_year(resale_years);
        let flows = resale_flows(
            &projection.cashflows(),
            inputs.financing.down_payment,
            resale_value,
            remaining,
            horizon,
        );

        Ok(Self {
            gross_yield_pct: gross_yield(inputs),
            net_yield_pct: net_yield(inputs),
            resale_years,
            resale_value,
            remaining_principal_at_resale: remaining,
            discount_rate,
            npv: npv(discount_rate, &flows),
            irr: calculate_irr(&flows),
            wealth_created: flows.iter().sum(),
            resale_flows: flows,
        })
    }

    /// IRR in percent, or `NoConvergence` when there is none
    pub fn irr_pct(&self) -> LmnpResult<f64> {
        self.irr.map(|r| r * 100.0).ok_or_else(|| LmnpError::NoConvergence {
            function: "IRR".to_string(),
            iterations: MAX_ITERATIONS,
        })
    }
}

pub fn gross_yield(inputs: &SimulationInputs) -> f64 {
    inputs.rental.annual_rent() / inputs.total_cost() * 100.0
}

pub fn net_yield(inputs: &SimulationInputs) -> f64 {
    (inputs.rental.annual_rent() - inputs.rental.annual_charges) / inputs.total_cost() * 100.0
}

/// Estimated sale price after `years` of holding
pub fn resale_value(inputs: &SimulationInputs, years: u32) -> f64 {
    match inputs.resale {
        ResaleEstimate::TargetPrice(price) => price,
        ResaleEstimate::InflationRate(rate) => {
            round_to(inputs.acquisition.net_cost() * (1.0 + rate).powi(years as i32), 0)
        }
    }
}

/// First `horizon` cashflows, down payment out in the first year, sale net of
/// outstanding principal in the last
pub fn resale_flows(
    cashflows: &[f64],
    down_payment: f64,
    resale_value: f64,
    remaining_principal: f64,
    horizon: usize,
) -> Vec<f64> {
    let mut flows: Vec<f64> = cashflows.iter().take(horizon).copied().collect();
    flows.resize(horizon, 0.0);
    if let Some(first) = flows.first_mut() {
        *first -= down_payment;
    }
    if let Some(last) = flows.last_mut() {
        *last += resale_value - remaining_principal;
    }
    flows
}
