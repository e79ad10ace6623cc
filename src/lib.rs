//! LMNP Simulator - furnished-rental investment simulation under the French LMNP status
//!
//! This library provides:
//! - Loan amortization (monthly and annual schedules)
//! - Rental income with rent escalation
//! - Straight-line depreciation of property and furnishings
//! - Real-regime taxation with loss and depreciation carry-forward
//! - Cashflow, equity build-up and resale-horizon NPV / IRR
//! - Memoized and parallel scenario runs

pub mod assumptions;
pub mod depreciation;
pub mod error;
pub mod inputs;
pub mod loan;
pub mod projection;
pub mod rental;
pub mod report;
pub mod scenario;
pub mod session;
pub mod simulation;
pub mod tax;

// Re-export commonly used types
pub use assumptions::{Assumptions, DefaultsDocument};
pub use error::{LmnpError, LmnpResult};
pub use inputs::{EnergyRating, SimulationInputs, SimulationParameters};
pub use loan::LoanAmortizer;
pub use projection::{CashflowProjection, ReturnMetrics};
pub use scenario::ScenarioRunner;
pub use session::Session;
pub use simulation::Simulation;
pub use tax::{CarryForward, TaxEngine};
