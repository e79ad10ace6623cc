//! Real-regime taxation with loss and depreciation carry-forward

mod engine;
mod rows;
mod state;

pub use engine::{run_years, TaxEngine, TaxStreams};
pub use rows::{TaxSummary, TaxYearRow};
pub use state::{CarryForward, TaxYearInput};
