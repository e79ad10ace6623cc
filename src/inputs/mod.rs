//! User-facing parameters, validation and unit conversion

mod data;

pub use data::{
    AcquisitionInputs, EnergyRating, FinancingInputs, PropertyMetadata, RentalInputs,
    ResaleEstimate, SimulationInputs, SimulationKey, SimulationParameters, MAX_LOAN_TERM_YEARS,
    MIN_LOAN_TERM_YEARS, RESALE_PRICE_THRESHOLD,
};
