//! Console pages, CSV tables and the JSON report of a simulation

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::assumptions::Assumptions;
use crate::depreciation::DepreciationYearRow;
use crate::error::LmnpResult;
use crate::inputs::SimulationParameters;
use crate::loan::{AmortizationRow, LoanSummary};
use crate::projection::{CashflowSummary, CashflowYearRow, ReturnMetrics};
use crate::simulation::{Simulation, SimulationHeadline};
use crate::tax::{TaxSummary, TaxYearRow};

/// Three-block parameter summary: property, rental and credit
pub fn parameter_summary(sim: &Simulation) -> String {
    let params = sim.parameters();
    let meta = &params.metadata;
    let renovation = if params.renovation_cost > 0.0 {
        "With renovation"
    } else {
        "Without renovation"
    };

    format!(
        "PROPERTY\n\
         Apartment • {} • {}m² • EPC {}\n\
         {:.0}€ • {}\n\
         \n\
         RENTAL\n\
         Rent: {:.0}€/year\n\
         Charges: {:.0}€/year\n\
         \n\
         CREDIT\n\
         Rate: {:.2}% • Term: {} years\n\
         Down payment: {:.0}€",
        meta.city,
        meta.surface_m2,
        meta.energy_rating,
        sim.total_cost(),
        renovation,
        sim.inputs().rental.annual_rent(),
        params.annual_charges,
        params.loan_rate_pct,
        params.loan_term_years,
        params.down_payment,
    )
}

/// Loan page: totals followed by the annual (or monthly) schedule
pub struct LoanPage<'a> {
    sim: &'a Simulation,
    monthly: bool,
}

impl<'a> LoanPage<'a> {
    pub fn new(sim: &'a Simulation, monthly: bool) -> Self {
        Self { sim, monthly }
    }
}

impl fmt::Display for LoanPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.sim.loan_summary();
        writeln!(f, "Loan")?;
        writeln!(f, "  Borrowed:         {:>12.2}", summary.borrowed)?;
        writeln!(f, "  Monthly payment:  {:>12.2}", summary.monthly_payment)?;
        writeln!(f, "  Total repaid:     {:>12.2}", summary.total_payments)?;
        writeln!(f, "  Total interest:   {:>12.2}", summary.total_interest)?;
        writeln!(f)?;

        let (label, rows) = if self.monthly {
            ("Month", self.sim.monthly_table())
        } else {
            ("Year", self.sim.annual_table())
        };
        writeln!(
            f,
            "{:>5} {:>12} {:>12} {:>12} {:>14}",
            label, "Payment", "Interest", "Principal", "Remaining"
        )?;
        writeln!(f, "{}", "-".repeat(59))?;
        for row in rows {
            writeln!(
                f,
                "{:>5} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                row.period, row.payment, row.interest, row.principal, row.remaining_principal
            )?;
        }
        Ok(())
    }
}

/// Tax page: one line per year of the real-regime table
pub struct TaxPage<'a>(pub &'a Simulation);

impl fmt::Display for TaxPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Taxation (real regime)")?;
        writeln!(
            f,
            "{:>4} {:>11} {:>11} {:>11} {:>11} {:>11} {:>10} {:>10} {:>11} {:>10} {:>10}",
            "Year", "Revenue", "Deductible", "Result", "Taxable", "Loss CF", "Deprec.", "Used",
            "Deprec. CF", "Base real", "Base micro"
        )?;
        writeln!(f, "{}", "-".repeat(122))?;
        for row in self.0.tax_table() {
            writeln!(
                f,
                "{:>4} {:>11.2} {:>11.2} {:>11.2} {:>11.2} {:>11.2} {:>10.2} {:>10.2} {:>11.2} {:>10.2} {:>10.2}",
                row.year,
                row.revenue,
                row.deductible_expense,
                row.result,
                row.taxable_result,
                row.loss_carry_forward,
                row.depreciation,
                row.depreciation_used,
                row.depreciation_carry_forward,
                row.taxable_base_real,
                row.taxable_base_micro,
            )?;
        }

        let summary = self.0.tax_summary();
        writeln!(f)?;
        writeln!(f, "  Taxable (real):   {:>12.2}", summary.total_taxable_real)?;
        writeln!(f, "  Taxable (micro):  {:>12.2}", summary.total_taxable_micro)?;
        writeln!(f, "  Real - micro:     {:>12.2}", summary.real_minus_micro())?;
        writeln!(f, "  Tax-free years:   {:>12}", summary.tax_free_years)?;
        writeln!(
            f,
            "  Depreciable base: {:>12.2}",
            self.0.depreciation().depreciable_base()
        )?;
        Ok(())
    }
}

/// Profitability page: yields and the cashflow table
pub struct ProfitabilityPage<'a>(pub &'a Simulation);

impl fmt::Display for ProfitabilityPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sim = self.0;
        writeln!(f, "Profitability")?;
        writeln!(f, "  Gross yield:      {:>11.2}%", sim.gross_yield())?;
        writeln!(f, "  Net yield:        {:>11.2}%", sim.net_yield())?;
        writeln!(f, "  Rent collected:   {:>12.2}", sim.ledger().total_revenue())?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>4} {:>11} {:>11} {:>11} {:>11} {:>11} {:>13}",
            "Year", "Revenue", "Expense", "Debt", "Cashflow", "Wealth", "Cumulative"
        )?;
        writeln!(f, "{}", "-".repeat(79))?;
        for row in sim.cashflow_table() {
            writeln!(
                f,
                "{:>4} {:>11.2} {:>11.2} {:>11.2} {:>11.2} {:>11.2} {:>13.2}",
                row.year,
                row.revenue,
                row.expense,
                row.debt_service,
                row.cashflow,
                row.wealth_accumulation,
                row.cumulative_wealth,
            )?;
        }
        Ok(())
    }
}

/// Resale page: horizon figures
pub struct ResalePage<'a>(pub &'a Simulation);

impl fmt::Display for ResalePage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let returns = self.0.returns();
        writeln!(f, "Resale after {} years", returns.resale_years)?;
        writeln!(f, "  Resale value:     {:>12.0}", returns.resale_value)?;
        writeln!(f, "  Remaining loan:   {:>12.2}", returns.remaining_principal_at_resale)?;
        writeln!(
            f,
            "  NPV @ {:.1}%:       {:>12.2}",
            returns.discount_rate * 100.0,
            returns.npv
        )?;
        match returns.irr {
            Some(rate) => writeln!(f, "  IRR:              {:>11.2}%", rate * 100.0)?,
            None => writeln!(f, "  IRR:              {:>12}", "n/a")?,
        }
        writeln!(f, "  Wealth created:   {:>12.2}", returns.wealth_created)?;
        Ok(())
    }
}

/// Write serializable rows as a CSV file with a header line
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> LmnpResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Export every table of `sim` into `dir`, returning the written paths
pub fn export_tables(sim: &Simulation, dir: &Path) -> LmnpResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let paths = [
        "loan_annual.csv",
        "loan_monthly.csv",
        "tax.csv",
        "cashflow.csv",
        "depreciation.csv",
    ]
    .map(|name| dir.join(name));

    write_csv(&paths[0], sim.annual_table())?;
    write_csv(&paths[1], sim.monthly_table())?;
    write_csv(&paths[2], sim.tax_table())?;
    write_csv(&paths[3], sim.cashflow_table())?;
    write_csv(&paths[4], &depreciation_table(sim))?;

    info!("Exported {} tables to {}", paths.len(), dir.display());
    Ok(paths.to_vec())
}

fn depreciation_table(sim: &Simulation) -> Vec<DepreciationYearRow> {
    sim.depreciation().rows(sim.assumptions().simulation_years)
}

/// Complete, serializable snapshot of a simulation
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub generated_at: DateTime<Utc>,
    pub parameters: SimulationParameters,
    pub assumptions: Assumptions,
    pub headline: SimulationHeadline,
    pub loan: LoanSummary,
    pub loan_annual: Vec<AmortizationRow>,
    pub tax: Vec<TaxYearRow>,
    pub tax_summary: TaxSummary,
    pub depreciation: Vec<DepreciationYearRow>,
    pub cashflow: Vec<CashflowYearRow>,
    pub cashflow_summary: CashflowSummary,
    pub returns: ReturnMetrics,
}

impl SimulationReport {
    pub fn new(sim: &Simulation) -> Self {
        Self {
            generated_at: Utc::now(),
            parameters: sim.parameters().clone(),
            assumptions: sim.assumptions().clone(),
            headline: sim.headline(),
            loan: sim.loan_summary(),
            loan_annual: sim.annual_table().to_vec(),
            tax: sim.tax_table().to_vec(),
            tax_summary: sim.tax_summary(),
            depreciation: depreciation_table(sim),
            cashflow: sim.cashflow_table().to_vec(),
            cashflow_summary: sim.cashflow().summary(),
            returns: sim.returns().clone(),
        }
    }

    pub fn to_json(&self) -> LmnpResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> LmnpResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::EnergyRating;
    use approx::assert_relative_eq;

    fn simulation(params: &SimulationParameters) -> Simulation {
        Simulation::new(params, &Assumptions::default_lmnp()).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lmnp_report_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_parameter_summary() {
        let sim = simulation(&SimulationParameters::default());
        let text = parameter_summary(&sim);

        assert!(text.contains("Apartment • Toulouse • 30m² • EPC D"));
        assert!(text.contains("117000€ • Without renovation"));
        assert!(text.contains("Rent: 7200€/year"));
        assert!(text.contains("Charges: 1500€/year"));
        assert!(text.contains("Rate: 3.00% • Term: 20 years"));
        assert!(text.contains("Down payment: 10000€"));
    }

    #[test]
    fn test_summary_reflects_metadata_and_renovation() {
        let mut params = SimulationParameters {
            renovation_cost: 5_000.0,
            ..Default::default()
        };
        params.metadata.city = "Bordeaux".to_string();
        params.metadata.surface_m2 = 42.0;
        params.metadata.energy_rating = EnergyRating::B;

        let text = parameter_summary(&simulation(&params));
        assert!(text.contains("Apartment • Bordeaux • 42m² • EPC B"));
        assert!(text.contains("122000€ • With renovation"));
    }

    #[test]
    fn test_pages_render() {
        let sim = simulation(&SimulationParameters::default());

        let annual = LoanPage::new(&sim, false).to_string();
        assert!(annual.contains("Total interest"));
        // header, totals, blank line, column header, rule, 20 years
        assert_eq!(annual.lines().count(), 6 + 2 + 20);

        let monthly = LoanPage::new(&sim, true).to_string();
        assert_eq!(monthly.lines().count(), 6 + 2 + 240);

        let tax = TaxPage(&sim).to_string();
        let year_lines = tax
            .lines()
            .filter(|line| {
                line.split_whitespace()
                    .next()
                    .is_some_and(|first| first.parse::<u32>().is_ok())
            })
            .count();
        assert_eq!(year_lines, 30);
        assert!(tax.contains("Depreciable base"));
        assert!(tax.contains("Real - micro"));

        let profitability = ProfitabilityPage(&sim).to_string();
        assert!(profitability.contains("Gross yield"));
        assert!(profitability.contains("Rent collected"));
        assert!(ResalePage(&sim).to_string().contains("Resale after 10 years"));
    }

    #[test]
    fn test_tax_page_shows_taxable_result() {
        let sim = simulation(&SimulationParameters::default());
        let tax = TaxPage(&sim).to_string();

        let header = tax.lines().nth(1).unwrap();
        let columns: Vec<&str> = header.split_whitespace().collect();
        assert_eq!(columns[3..5], ["Result", "Taxable"]);

        let row = &sim.tax_table()[1];
        let line = tax
            .lines()
            .find(|line| line.split_whitespace().next() == Some("2"))
            .unwrap();
        let values: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(values[4], format!("{:.2}", row.taxable_result));
        assert_eq!(values[5], format!("{:.2}", row.loss_carry_forward));
    }

    #[test]
    fn test_export_tables() {
        let sim = simulation(&SimulationParameters::default());
        let dir = scratch_dir("export");
        let paths = export_tables(&sim, &dir).unwrap();
        assert_eq!(paths.len(), 5);

        let mut reader = csv::Reader::from_path(dir.join("tax.csv")).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "year");
        assert!(headers.iter().any(|h| h == "depreciation_carry_forward"));
        assert_eq!(reader.records().count(), 30);

        let mut reader = csv::Reader::from_path(dir.join("loan_monthly.csv")).unwrap();
        assert_eq!(reader.records().count(), 240);

        let mut reader = csv::Reader::from_path(dir.join("depreciation.csv")).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), ["year", "property", "furnishing", "total"]);
        assert_eq!(reader.records().count(), 30);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_report() {
        let sim = simulation(&SimulationParameters::default());
        let report = SimulationReport::new(&sim);
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert!(value["generated_at"].is_string());
        assert_eq!(value["tax"].as_array().unwrap().len(), 30);
        assert_eq!(value["depreciation"].as_array().unwrap().len(), 30);
        assert_eq!(value["loan_annual"].as_array().unwrap().len(), 20);
        assert_eq!(value["parameters"]["metadata"]["city"], "Toulouse");
        assert_relative_eq!(value["headline"]["npv"].as_f64().unwrap(), sim.npv(), epsilon = 1e-6);

        let dir = scratch_dir("json");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.json");
        report.write_json(&path).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
        fs::remove_dir_all(&dir).unwrap();
    }
}
