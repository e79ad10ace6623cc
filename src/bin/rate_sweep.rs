//! Sweep the loan rate and tabulate payment, NPV and IRR per rate
//!
//! Scenarios are independent and evaluated in parallel.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use lmnp_simulator::{Assumptions, DefaultsDocument, ScenarioRunner, SimulationParameters};

#[derive(Parser)]
#[command(about = "Loan rate sensitivity of an LMNP simulation")]
struct Args {
    /// Defaults document (key,value CSV); built-in defaults when omitted
    #[arg(long)]
    defaults: Option<std::path::PathBuf>,

    /// Lowest rate (%)
    #[arg(long, default_value_t = 1.0)]
    from: f64,

    /// Highest rate (%)
    #[arg(long, default_value_t = 5.0)]
    to: f64,

    /// Rate step (%)
    #[arg(long, default_value_t = 0.25)]
    step: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    if args.step <= 0.0 || args.to < args.from {
        bail!("Expected --from <= --to and a positive --step");
    }

    let (base, assumptions) = match &args.defaults {
        Some(path) => {
            let doc = DefaultsDocument::load_from(path)
                .with_context(|| format!("Failed to load defaults from {}", path.display()))?;
            (
                SimulationParameters::from_defaults(&doc)?,
                Assumptions::from_defaults(&doc)?,
            )
        }
        None => (SimulationParameters::default(), Assumptions::default_lmnp()),
    };

    let steps = ((args.to - args.from) / args.step).round() as usize;
    let rates: Vec<f64> = (0..=steps).map(|k| args.from + k as f64 * args.step).collect();
    let scenarios: Vec<SimulationParameters> = rates
        .iter()
        .map(|&rate| SimulationParameters {
            loan_rate_pct: rate,
            ..base.clone()
        })
        .collect();

    let start = Instant::now();
    let runner = ScenarioRunner::with_assumptions(assumptions);
    let results = runner.run_scenarios(&scenarios);
    println!("Ran {} scenarios in {:?}\n", results.len(), start.elapsed());

    println!(
        "{:>7} {:>12} {:>14} {:>12} {:>10} {:>14}",
        "Rate%", "Payment", "Interest", "NPV", "IRR%", "Wealth"
    );
    println!("{}", "-".repeat(74));

    for (rate, result) in rates.iter().zip(&results) {
        match result {
            Ok(sim) => {
                let irr = sim
                    .irr()
                    .map(|r| format!("{:.2}", r * 100.0))
                    .unwrap_or_else(|| "n/a".to_string());
                println!(
                    "{:>7.2} {:>12.2} {:>14.2} {:>12.2} {:>10} {:>14.2}",
                    rate,
                    sim.loan().monthly_payment(),
                    sim.loan().total_interest(),
                    sim.npv(),
                    irr,
                    sim.wealth_created(),
                );
            }
            Err(e) => println!("{:>7.2} error: {}", rate, e),
        }
    }

    Ok(())
}
