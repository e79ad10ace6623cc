//! Interactive session: the current simulation and the runner that built it

use std::sync::Arc;

use log::info;

use crate::assumptions::Assumptions;
use crate::error::{LmnpError, LmnpResult};
use crate::inputs::SimulationParameters;
use crate::scenario::ScenarioRunner;
use crate::simulation::Simulation;

/// Holds the last successfully submitted simulation.
///
/// Report pages read from here and fail with `MissingPrerequisite` until a
/// parameter set has been submitted. A rejected submission leaves the current
/// simulation untouched.
#[derive(Debug, Default)]
pub struct Session {
    runner: ScenarioRunner,
    current: Option<Arc<Simulation>>,
}

impl Session {
    pub fn new(assumptions: Assumptions) -> Self {
        Self {
            runner: ScenarioRunner::with_assumptions(assumptions),
            current: None,
        }
    }

    /// Submit a parameter set and make its simulation current
    pub fn submit(&mut self, params: &SimulationParameters) -> LmnpResult<Arc<Simulation>> {
        let simulation = self.runner.run(params)?;
        info!(
            "Session simulation set for {} ({} m²)",
            params.metadata.city, params.metadata.surface_m2
        );
        self.current = Some(Arc::clone(&simulation));
        Ok(simulation)
    }

    pub fn simulation(&self) -> LmnpResult<&Simulation> {
        self.current
            .as_deref()
            .ok_or_else(|| LmnpError::MissingPrerequisite("submit parameters first".to_string()))
    }

    pub fn has_simulation(&self) -> bool {
        self.current.is_some()
    }

    pub fn runner(&self) -> &ScenarioRunner {
        &self.runner
    }
}
