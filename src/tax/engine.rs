//! Year-by-year tax computation under the real regime

use log::debug;

use super::rows::{TaxSummary, TaxYearRow};
use super::state::{CarryForward, TaxYearInput};
use crate::error::{ensure_non_negative, LmnpError, LmnpResult};
use crate::inputs::AcquisitionInputs;

/// Annual streams the tax table is computed from.
///
/// Streams shorter than the horizon are zero-padded, longer ones truncated.
#[derive(Debug, Clone, Default)]
pub struct TaxStreams {
    pub revenues: Vec<f64>,
    pub charges: Vec<f64>,
    pub interest: Vec<f64>,
    pub depreciation: Vec<f64>,
}

/// Tax table for one simulation.
///
/// The table is a fold of [`CarryForward::apply`] over the ordered years,
/// starting from empty balances.
#[derive(Debug, Clone)]
pub struct TaxEngine {
    rows: Vec<TaxYearRow>,
    final_state: CarryForward,
}

impl TaxEngine {
    pub fn new(
        acquisition: &AcquisitionInputs,
        streams: &TaxStreams,
        horizon_years: u32,
        micro_taxable_share: f64,
    ) -> LmnpResult<Self> {
        ensure_non_negative("purchase_price", acquisition.price)?;
        if horizon_years == 0 {
            return Err(LmnpError::invalid("horizon_years", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&micro_taxable_share) {
            return Err(LmnpError::invalid(
                "micro_taxable_share",
                format!("must be within [0, 1], got {}", micro_taxable_share),
            ));
        }
        for (name, stream) in [
            ("revenues", &streams.revenues),
            ("charges", &streams.charges),
            ("interest", &streams.interest),
            ("depreciation", &streams.depreciation),
        ] {
            for value in stream {
                ensure_non_negative(name, *value)?;
            }
        }

        let fees = acquisition.acquisition_fees();
        let inputs = (1..=horizon_years).map(|year| {
            let idx = year as usize - 1;
            TaxYearInput {
                year,
                revenue: at(&streams.revenues, idx),
                charges: at(&streams.charges, idx),
                interest: at(&streams.interest, idx),
                depreciation: at(&streams.depreciation, idx),
                one_time_deduction: if year == 1 { fees } else { 0.0 },
            }
        });

        let (final_state, rows) = run_years(CarryForward::new(), inputs, micro_taxable_share);

        debug!(
            "Tax table over {} years: final loss {:.2}, final depreciation {:.2}",
            horizon_years, final_state.loss, final_state.depreciation
        );

        Ok(Self { rows, final_state })
    }

    pub fn rows(&self) -> &[TaxYearRow] {
        &self.rows
    }

    /// Balances left after the last year
    pub fn final_state(&self) -> CarryForward {
        self.final_state
    }

    pub fn summary(&self) -> TaxSummary {
        TaxSummary::from_rows(&self.rows)
    }
}

/// Fold the yearly transition over `inputs`, returning the final balances and one row per year
pub fn run_years(
    initial: CarryForward,
    inputs: impl IntoIterator<Item = TaxYearInput>,
    micro_taxable_share: f64,
) -> (CarryForward, Vec<TaxYearRow>) {
    inputs
        .into_iter()
        .fold((initial, Vec::new()), |(state, mut rows), input| {
            let (next, row) = state.apply(&input);
            rows.push(TaxYearRow {
                taxable_base_micro: input.revenue * micro_taxable_share,
                ..row
            });
            (next, rows)
        })
}

fn at(stream: &[f64], idx: usize) -> f64 {
    stream.get(idx).copied().unwrap_or(0.0)
}
