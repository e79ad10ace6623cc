//! LMNP Simulator CLI
//!
//! Runs one simulation from the defaults document plus command-line overrides
//! and prints the report pages.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use lmnp_simulator::assumptions::DEFAULT_PARAMETERS_PATH;
use lmnp_simulator::report::{
    export_tables, parameter_summary, LoanPage, ProfitabilityPage, ResalePage, SimulationReport,
    TaxPage,
};
use lmnp_simulator::{Assumptions, DefaultsDocument, EnergyRating, Session, SimulationParameters};

/// Furnished-rental (LMNP) investment simulator
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Defaults document (key,value CSV); data/defaults.csv is used when present
    #[arg(long)]
    defaults: Option<PathBuf>,

    /// Purchase price (€)
    #[arg(long)]
    price: Option<f64>,

    /// Agency fees (% of price)
    #[arg(long)]
    agency_fee: Option<f64>,

    /// Notary fees (% of price)
    #[arg(long)]
    notary_fee: Option<f64>,

    /// Renovation cost (€)
    #[arg(long)]
    renovation: Option<f64>,

    /// Furnishing cost (€)
    #[arg(long)]
    furnishing: Option<f64>,

    /// Down payment (€)
    #[arg(long)]
    down_payment: Option<f64>,

    /// Loan rate (% per year)
    #[arg(long)]
    rate: Option<f64>,

    /// Loan term (years, 5 to 25)
    #[arg(long)]
    term: Option<u32>,

    /// Monthly rent (€)
    #[arg(long)]
    rent: Option<f64>,

    /// Annual charges (€)
    #[arg(long)]
    charges: Option<f64>,

    /// Annual rent escalation (%)
    #[arg(long)]
    escalation: Option<f64>,

    /// Resale: below 100 an annual inflation in %, otherwise a target price (€)
    #[arg(long)]
    resale: Option<f64>,

    /// Holding period for the resale metrics (years)
    #[arg(long)]
    resale_years: Option<u32>,

    /// Discount rate for the NPV (%)
    #[arg(long)]
    discount_rate: Option<f64>,

    #[arg(long)]
    city: Option<String>,

    /// Surface area (m²)
    #[arg(long)]
    surface: Option<f64>,

    /// Energy rating, A to G
    #[arg(long)]
    energy_rating: Option<EnergyRating>,

    /// Show the monthly amortization table instead of the annual one
    #[arg(long)]
    monthly: bool,

    /// Print the full report as JSON instead of the console pages
    #[arg(long)]
    json: bool,

    /// Write CSV tables and report.json into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl Cli {
    fn apply_overrides(&self, params: &mut SimulationParameters, assumptions: &mut Assumptions) {
        let amounts = [
            (self.price, &mut params.purchase_price),
            (self.agency_fee, &mut params.agency_fee_pct),
            (self.notary_fee, &mut params.notary_fee_pct),
            (self.renovation, &mut params.renovation_cost),
            (self.furnishing, &mut params.furnishing_cost),
            (self.down_payment, &mut params.down_payment),
            (self.rate, &mut params.loan_rate_pct),
            (self.rent, &mut params.monthly_rent),
            (self.charges, &mut params.annual_charges),
            (self.escalation, &mut params.rent_escalation_pct),
            (self.resale, &mut params.resale_value),
            (self.surface, &mut params.metadata.surface_m2),
        ];
        for (value, field) in amounts {
            if let Some(value) = value {
                *field = value;
            }
        }

        if let Some(term) = self.term {
            params.loan_term_years = term;
        }
        if let Some(city) = &self.city {
            params.metadata.city = city.clone();
        }
        if let Some(rating) = self.energy_rating {
            params.metadata.energy_rating = rating;
        }
        if let Some(years) = self.resale_years {
            assumptions.resale_years = years;
        }
        if let Some(pct) = self.discount_rate {
            assumptions.discount_rate = pct / 100.0;
        }
    }
}

/// Parameters and assumptions from the defaults document, or built-ins when there is none
fn load_defaults(path: Option<&Path>) -> Result<(SimulationParameters, Assumptions)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None if Path::new(DEFAULT_PARAMETERS_PATH).exists() => PathBuf::from(DEFAULT_PARAMETERS_PATH),
        None => {
            info!("No defaults document, using built-in defaults");
            return Ok((SimulationParameters::default(), Assumptions::default_lmnp()));
        }
    };

    let doc = DefaultsDocument::load_from(&path)
        .with_context(|| format!("Failed to load defaults from {}", path.display()))?;
    info!("Loaded {} defaults from {}", doc.len(), path.display());

    Ok((
        SimulationParameters::from_defaults(&doc).context("Invalid parameter defaults")?,
        Assumptions::from_defaults(&doc).context("Invalid assumption defaults")?,
    ))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let (mut params, mut assumptions) = load_defaults(cli.defaults.as_deref())?;
    cli.apply_overrides(&mut params, &mut assumptions);

    let mut session = Session::new(assumptions);
    session
        .submit(&params)
        .context("Simulation rejected the parameters")?;
    let sim = session.simulation()?;

    if cli.json {
        println!("{}", SimulationReport::new(sim).to_json()?);
    } else {
        println!("LMNP Simulator v{}", env!("CARGO_PKG_VERSION"));
        println!("======================\n");
        println!("{}\n", parameter_summary(sim));
        println!("{}", LoanPage::new(sim, cli.monthly));
        println!("{}", TaxPage(sim));
        println!("{}", ProfitabilityPage(sim));
        println!("{}", ResalePage(sim));
    }

    if let Some(dir) = &cli.output_dir {
        let mut written = export_tables(sim, dir)
            .with_context(|| format!("Failed to export tables to {}", dir.display()))?;
        let report_path = dir.join("report.json");
        SimulationReport::new(sim)
            .write_json(&report_path)
            .with_context(|| format!("Failed to write {}", report_path.display()))?;
        written.push(report_path);

        // keep stdout clean for --json
        for path in &written {
            eprintln!("Written: {}", path.display());
        }
    }

    Ok(())
}
