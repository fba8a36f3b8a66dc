#![deny(warnings)]

//! Headless CLI for running forecast scenarios.
//!
//! Loads assumption overrides from a YAML key/value file, runs the
//! 60-month forecast, prints a summary plus the strategic narrative, and
//! optionally dumps any table or exports the whole bundle as CSV/JSON.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fin_core::{validate_assumptions, Assumptions, ForecastBundle, MONTHS};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Args {
    scenario: Option<String>,
    start: Option<String>,
    table: Option<String>,
    export: Option<PathBuf>,
    ask: Option<String>,
    version: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = it.next(),
            "--start" => args.start = it.next(),
            "--table" => args.table = it.next(),
            "--export" => args.export = it.next().map(PathBuf::from),
            "--ask" => args.ask = it.next(),
            "--version" => args.version = true,
            _ => {}
        }
    }
    args
}

/// Load a scenario: a YAML map of assumption keys to numbers, applied over
/// the documented defaults. Absent file means the baseline scenario.
fn load_scenario(path: Option<&str>) -> Result<Assumptions> {
    let Some(path) = path else {
        return Ok(Assumptions::baseline());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading scenario file {path}"))?;
    let overrides: BTreeMap<String, f64> =
        serde_yaml::from_str(&text).with_context(|| format!("parsing scenario file {path}"))?;
    Ok(Assumptions::from_map(&overrides))
}

fn table_columns<'a>(
    bundle: &'a ForecastBundle,
    name: &str,
) -> Option<Vec<(&'static str, &'a [f64])>> {
    match name {
        "pnl" => Some(bundle.pnl.columns()),
        "balance" => Some(bundle.balance.columns()),
        "cashflow" => Some(bundle.cash_flow.columns()),
        "kpis" => Some(bundle.kpis.columns()),
        "funnel" => Some(bundle.funnel.columns()),
        _ => None,
    }
}

fn print_table(periods: &[String], columns: &[(&'static str, &[f64])]) {
    print!("{:<8}", "Period");
    for (name, _) in columns {
        print!(" {name:>24}");
    }
    println!();
    for (i, p) in periods.iter().enumerate() {
        print!("{p:<8}");
        for (_, col) in columns {
            print!(" {:>24}", col[i]);
        }
        println!();
    }
}

fn write_csv(path: &Path, periods: &[String], columns: &[(&'static str, &[f64])]) -> Result<()> {
    let mut out = String::from("Period");
    for (name, _) in columns {
        out.push(',');
        out.push_str(name);
    }
    out.push('\n');
    for (i, p) in periods.iter().enumerate() {
        out.push_str(p);
        for (_, col) in columns {
            out.push(',');
            out.push_str(&col[i].to_string());
        }
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn export_bundle(dir: &Path, bundle: &ForecastBundle) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let tables = [
        ("income_statement.csv", bundle.pnl.columns()),
        ("balance_sheet.csv", bundle.balance.columns()),
        ("cash_flow.csv", bundle.cash_flow.columns()),
        ("kpis.csv", bundle.kpis.columns()),
        ("funnel.csv", bundle.funnel.columns()),
    ];
    for (file, columns) in tables {
        write_csv(&dir.join(file), &bundle.periods, &columns)?;
    }
    let json = serde_json::to_string_pretty(bundle)?;
    fs::write(dir.join("bundle.json"), json)
        .with_context(|| format!("writing {}", dir.join("bundle.json").display()))?;
    info!(dir = %dir.display(), "bundle exported");
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    if args.version {
        println!("proforma {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_SHA"));
        return Ok(());
    }
    info!(scenario = ?args.scenario, "starting forecast");

    let assumptions = load_scenario(args.scenario.as_deref())?;
    validate_assumptions(&assumptions)?;

    let bundle = match args.start.as_deref() {
        Some(s) => {
            let start = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("invalid --start date {s}"))?;
            fin_model::run_forecast_with_start(&assumptions, start)
        }
        None => fin_model::run_forecast(&assumptions),
    };

    let last = MONTHS - 1;
    let y5_revenue: f64 = bundle.pnl.revenue[MONTHS - 12..].iter().sum();
    println!(
        "Forecast OK | periods: {} | Y5 revenue: ${} | ending cash: ${} | LTV/CAC: {:.2} | payback: {:.2} mo",
        MONTHS,
        y5_revenue,
        bundle.balance.cash[last],
        bundle.kpis.ltv_to_cac[last],
        bundle.kpis.payback_months[last]
    );

    let narrative = fin_narrative::generate_narrative(&bundle);
    println!("\nThe Flywheel (core strengths):");
    for line in &narrative.flywheel {
        println!("- {line}");
    }
    println!("\nThe Brutal Facts (core weaknesses):");
    for line in &narrative.brutal_facts {
        println!("- {line}");
    }
    println!("\nThe Strategic Crossroads:\n{}", narrative.crossroads);

    if let Some(name) = args.table.as_deref() {
        match table_columns(&bundle, name) {
            Some(columns) => {
                println!();
                print_table(&bundle.periods, &columns);
            }
            None => anyhow::bail!(
                "unknown table `{name}` (expected pnl, balance, cashflow, kpis, or funnel)"
            ),
        }
    }

    if let Some(question) = args.ask.as_deref() {
        println!("\n{}", fin_narrative::query_analyst(question, &bundle));
    }

    if let Some(dir) = args.export.as_deref() {
        export_bundle(dir, &bundle)?;
    }

    Ok(())
}
