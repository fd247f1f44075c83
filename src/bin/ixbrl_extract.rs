use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use ixbrl_financials::{extract_file, ExtractorConfig, FilingMetadata};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "ixbrl-extract",
    about = "Extract financial figures from an iXBRL accounts filing"
)]
struct Opt {
    /// iXBRL (.html / .xhtml) file to parse
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Companies House number; read from the document when omitted
    #[structopt(short, long)]
    company_number: Option<String>,

    /// Date the accounts were filed (YYYY-MM-DD)
    #[structopt(short, long, parse(try_from_str = parse_date))]
    filing_date: Option<NaiveDate>,

    /// Record which fact each value came from
    #[structopt(long)]
    provenance: bool,

    /// Enable debug logging
    #[structopt(short, long)]
    debug: bool,
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let opt = Opt::from_args();

    let level = if opt.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if !opt.input.exists() {
        eprintln!("Input file does not exist: {:?}", opt.input);
        std::process::exit(1);
    }

    let config = ExtractorConfig::from_env()?.with_provenance(opt.provenance);
    log::debug!("Config: {:?}", config);

    let mut metadata = FilingMetadata::new(opt.company_number.unwrap_or_default())
        .with_processed_on(Utc::now().date_naive());
    if let Some(filing_date) = opt.filing_date {
        metadata = metadata.with_filing_date(filing_date);
    }

    let result = extract_file(&opt.input, &metadata, &config)
        .with_context(|| format!("Failed to extract {:?}", opt.input))?;

    if !result.is_success() {
        log::warn!("No financial data tagged in {:?}", opt.input);
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
