use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use skudex_core::{CatalogIndex, CatalogPolicy, Error};
use skudex_ingest::{CacheConfig, CatalogStore};
use skudex_query::{QueryEngine, QueryIntent, QueryOutcome, ScoringWeights};

/// Catalog lookup over messy vendor price documents
#[derive(Parser, Debug)]
#[command(name = "skudex")]
#[command(about = "Ask price questions against spreadsheet catalogs", long_about = None)]
struct Args {
    /// Catalog document (xlsx, xlsm, xlsb, xls, ods, csv, or txt)
    file: PathBuf,

    /// Question to ask; omitted, a catalog summary is printed instead
    query: Option<String>,

    /// Force the query intent instead of detecting it
    #[arg(long)]
    intent: Option<QueryIntent>,

    /// Maximum matches to return
    #[arg(long, default_value_t = 10)]
    top_k: usize,

    /// JSON file overriding the built-in policy keyword tables
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Seconds a cached catalog stays valid
    #[arg(long, default_value_t = 300)]
    ttl_secs: u64,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Results go to stdout; logs stay out of their way
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("skudex v{}", env!("CARGO_PKG_VERSION"));

    let policy = match &args.policy {
        Some(path) => CatalogPolicy::from_json_str(&std::fs::read_to_string(path)?)?,
        None => CatalogPolicy::default(),
    };
    let config = CacheConfig {
        ttl: Duration::from_secs(args.ttl_secs),
    };
    let store = CatalogStore::new(policy, config)?;

    let doc = store.catalog(&args.file)?;
    info!(
        path = %args.file.display(),
        records = doc.index.len(),
        "catalog ready"
    );

    match args.query.as_deref() {
        Some(query) => {
            let engine = QueryEngine::new(store.policy(), ScoringWeights::default())?
                .with_top_k(args.top_k);
            let outcome = engine.search(&doc.index, query, args.intent);
            report(&outcome, args.json)
        }
        None => summarize(&doc.index, args.json),
    }
}

fn report(outcome: &QueryOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        print_text(outcome);
    }
    if outcome.matches.is_empty() {
        return Err(Error::NoMatch(outcome.unmatched.join(", ")).into());
    }
    Ok(())
}

fn print_text(outcome: &QueryOutcome) {
    for token in &outcome.unmatched {
        match outcome.suggestions.get(token) {
            Some(near) if !near.is_empty() => {
                println!("No match for {}. Closest: {}", token, near.join(", "));
            }
            _ => println!("No match for {}.", token),
        }
    }
    if outcome.partial {
        let asked = outcome.signals.codes.len();
        println!(
            "Partial result: {} of {} code(s) matched.",
            asked - outcome.unmatched.len(),
            asked
        );
    }
    for (rank, hit) in outcome.matches.iter().enumerate() {
        println!(
            "{:>2}. {:<18} {:.3}  {}",
            rank + 1,
            hit.record.code,
            hit.score,
            hit.kind
        );
        for (label, value) in &hit.record.values {
            println!("      {:<24} ${:>10.2}", label, value);
        }
        println!("      {} row {}", hit.record.sheet, hit.record.row + 1);
    }
}

fn summarize(index: &CatalogIndex, json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "records": index.len(),
            "base_groups": index.base_groups().len(),
            "sheets": index.summaries(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} record(s) across {} sheet(s), {} base group(s)",
        index.len(),
        index.summaries().len(),
        index.base_groups().len()
    );
    for sheet in index.summaries() {
        let header = sheet
            .guess
            .header_row
            .map_or_else(|| "none".to_string(), |r| (r + 1).to_string());
        println!(
            "  {:<24} {:>5} record(s)  header row {:<5} id col {:<3} confidence {:.2}",
            sheet.name,
            sheet.records,
            header,
            sheet.guess.identifier_column,
            sheet.guess.confidence
        );
    }
    Ok(())
}
