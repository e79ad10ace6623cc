//! Scenario runner for repeated and batch simulations
//!
//! Holds the assumptions once and memoizes simulations by the exact value of
//! their parameters, so resubmitting an unchanged form costs a hash lookup.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use crate::assumptions::Assumptions;
use crate::error::LmnpResult;
use crate::inputs::{SimulationKey, SimulationParameters};
use crate::simulation::Simulation;

/// Pre-loaded scenario runner with a content-addressed simulation cache
///
/// # Example
/// ```ignore
/// let mut runner = ScenarioRunner::new();
/// let first = runner.run(&params)?;
/// let again = runner.run(&params)?; // served from cache
///
/// // Independent rate sweep, evaluated in parallel
/// let sweep: Vec<_> = [2.5, 3.0, 3.5]
///     .iter()
///     .map(|&rate| SimulationParameters { loan_rate_pct: rate, ..params.clone() })
///     .collect();
/// let results = runner.run_scenarios(&sweep);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    assumptions: Assumptions,
    cache: HashMap<SimulationKey, Arc<Simulation>>,
}

impl ScenarioRunner {
    /// Create runner with the standard LMNP assumptions
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::default_lmnp())
    }

    /// Create runner from a defaults document on disk
    pub fn from_csv_path(path: &Path) -> LmnpResult<Self> {
        Ok(Self::with_assumptions(Assumptions::from_csv_path(path)?))
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            assumptions,
            cache: HashMap::new(),
        }
    }

    /// Simulation for `params`, built on first request and shared afterwards
    pub fn run(&mut self, params: &SimulationParameters) -> LmnpResult<Arc<Simulation>> {
        let key = params.cache_key();
        if let Some(existing) = self.cache.get(&key) {
            debug!("Simulation cache hit ({} cached)", self.cache.len());
            return Ok(Arc::clone(existing));
        }

        debug!("Simulation cache miss, building");
        let simulation = Arc::new(Simulation::new(params, &self.assumptions)?);
        self.cache.insert(key, Arc::clone(&simulation));
        Ok(simulation)
    }

    /// Run independent scenarios in parallel, one result per input, in order.
    /// Batch results bypass the cache.
    pub fn run_scenarios(&self, scenarios: &[SimulationParameters]) -> Vec<LmnpResult<Simulation>> {
        scenarios
            .par_iter()
            .map(|params| Simulation::new(params, &self.assumptions))
            .collect()
    }

    /// Get reference to the assumptions for inspection
    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Replace the assumptions; cached simulations were built on the old ones
    /// and are dropped
    pub fn set_assumptions(&mut self, assumptions: Assumptions) {
        self.assumptions = assumptions;
        self.cache.clear();
    }

    /// Number of cached simulations
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
