use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use site_roster::{apply_batches, load_batches, SiteConfig, SiteLedger};

const USAGE: &str = "usage:
  site-roster                              print the empty report
  site-roster report <batches.csv>         check batches in, print the report
  site-roster exits <batches.csv> <id>...  check batches in, check cohorts out, print the report

options:
  --json  print the full report (cohorts, totals, equipment, text) as JSON

environment:
  SITE_ROSTER_CONFIG  path to a TOML site config
  RUST_LOG            log filter (default: info)";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().collect();
    let json = args.iter().any(|arg| arg == "--json");
    args.retain(|arg| arg != "--json");

    let config_path = env::var("SITE_ROSTER_CONFIG").ok();
    let config = SiteConfig::load(config_path.as_deref().map(Path::new))
        .context("Failed to load site config")?;
    let ledger = SiteLedger::new(&config);

    match args.get(1).map(String::as_str) {
        None => {}
        Some("report") if args.len() == 3 => {
            run_import(&ledger, Path::new(&args[2]))?;
        }
        Some("exits") if args.len() >= 4 => {
            run_import(&ledger, Path::new(&args[2]))?;
            run_exits(&ledger, &args[3..]);
        }
        Some("-h") | Some("--help") | Some("help") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(_) => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    let report = ledger.get_report();
    if json {
        println!("{}", report.to_json().context("Failed to serialize report")?);
    } else {
        println!("{}", report.text);
    }
    Ok(())
}

fn run_import(ledger: &SiteLedger, csv_path: &Path) -> Result<()> {
    let batches = load_batches(csv_path)?;
    let cohort_ids = apply_batches(ledger, &batches)?;
    eprintln!("✓ Checked in {} batches from {}", cohort_ids.len(), csv_path.display());
    Ok(())
}

fn run_exits(ledger: &SiteLedger, cohort_ids: &[String]) {
    for cohort_id in cohort_ids {
        let removed = ledger.remove_cohort(cohort_id);
        eprintln!("✓ {}: {} checked out", cohort_id, removed);
    }
}
