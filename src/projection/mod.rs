//! Cashflow projection and return metrics over the simulation horizon

mod cashflows;
mod engine;
pub mod irr;
mod returns;

pub use cashflows::{CashflowProjection, CashflowSummary, CashflowYearRow};
pub use engine::CashflowProjector;
pub use irr::{calculate_irr, irr, npv};
pub use returns::{gross_yield, net_yield, resale_flows, resale_value, ReturnMetrics};
