use anyhow::{bail, Context, Result};
use std::env;

use vin_reconciler::{CsvCatalog, Reconciler, ReconcilerConfig, VehicleRecord, Vin};

const USAGE: &str = "\
usage:
  vin-reconciler decode <VIN>...
  vin-reconciler anonymize <VIN>...
  vin-reconciler reconcile <record.json> <catalog.csv> <VIN> [config.json]";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("decode") if args.len() > 1 => run_decode(&args[1..]),
        Some("anonymize") if args.len() > 1 => run_anonymize(&args[1..]),
        Some("reconcile") if args.len() == 4 || args.len() == 5 => {
            run_reconcile(&args[1], &args[2], &args[3], args.get(4).map(String::as_str))
        }
        _ => bail!("{}", USAGE),
    }
}

fn run_decode(vins: &[String]) -> Result<()> {
    for raw in vins {
        let vin = Vin::new(raw);
        let decoded = vin.decode();
        println!("{}", serde_json::to_string_pretty(&decoded)?);

        for issue in vin.issues() {
            log::warn!("{}: {}", vin, issue);
        }
    }
    Ok(())
}

fn run_anonymize(vins: &[String]) -> Result<()> {
    for raw in vins {
        let vin = Vin::new(raw);
        if !vin.is_valid() {
            log::warn!("{}: not a valid VIN, anonymizing anyway", vin);
        }
        println!("{}", vin.anonymize());
    }
    Ok(())
}

fn run_reconcile(
    record_path: &str,
    catalog_path: &str,
    raw_vin: &str,
    config_path: Option<&str>,
) -> Result<()> {
    let json = std::fs::read_to_string(record_path)
        .with_context(|| format!("Failed to read registry record: {}", record_path))?;
    let record = VehicleRecord::from_registry_json(&json)
        .with_context(|| format!("Invalid registry record: {}", record_path))?;

    let catalog = CsvCatalog::from_path(catalog_path)?;
    log::info!("📚 Loaded {} catalog entries from {}", catalog.len(), catalog_path);

    let config = match config_path {
        Some(path) => ReconcilerConfig::from_file(path)?,
        None => ReconcilerConfig::default(),
    };

    let vin = Vin::new(raw_vin);
    let report = Reconciler::new(config).reconcile(&vin, &record, &catalog)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
