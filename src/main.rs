// 🏛️ cvr-resolve - CVR registry resolver CLI
//
//   cvr-resolve resolve <response.json> [--as-of YYYY-MM-DD] [--status CODE]
//   cvr-resolve query cvr <number>
//   cvr-resolve query name <text>
//
// Every command accepts --config <file.json> and -v (debug logging).

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::env;
use std::fs;
use tracing::Level;

use cvr_resolver::{OrganizationRecordBuilder, ResolverConfig, SearchQuery, SearchResponse};

/// Flags shared by every command
struct Options {
    positional: Vec<String>,
    config: Option<String>,
    as_of: Option<NaiveDate>,
    status: u16,
    verbose: bool,
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_options(&args)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if options.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let config = load_config(options.config.as_deref())?;

    match options.positional.first().map(String::as_str) {
        Some("resolve") => run_resolve(&options, &config),
        Some("query") => run_query(&options, &config),
        _ => {
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cvr-resolve resolve <response.json> [--as-of YYYY-MM-DD] [--status CODE]");
    eprintln!("  cvr-resolve query cvr <number>");
    eprintln!("  cvr-resolve query name <text>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file.json>   Resolver config (env CVR_* overrides apply on top)");
    eprintln!("  -v                     Debug logging on stderr");
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options {
        positional: Vec::new(),
        config: None,
        as_of: None,
        status: 200,
        verbose: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                options.config = Some(iter.next().context("--config needs a file path")?.clone());
            }
            "--as-of" => {
                let raw = iter.next().context("--as-of needs a date")?;
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .with_context(|| format!("Invalid --as-of date: {}", raw))?;
                options.as_of = Some(date);
            }
            "--status" => {
                let raw = iter.next().context("--status needs a status code")?;
                options.status = raw
                    .parse()
                    .with_context(|| format!("Invalid --status code: {}", raw))?;
            }
            "-v" | "--verbose" => options.verbose = true,
            _ => options.positional.push(arg.clone()),
        }
    }

    Ok(options)
}

fn load_config(path: Option<&str>) -> Result<ResolverConfig> {
    match path {
        Some(path) => ResolverConfig::from_file(path)?.with_overrides(|key| env::var(key).ok()),
        None => ResolverConfig::from_env(),
    }
}

fn run_resolve(options: &Options, config: &ResolverConfig) -> Result<()> {
    let path = options
        .positional
        .get(1)
        .context("resolve needs a saved response body: cvr-resolve resolve <response.json>")?;

    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read response body: {}", path))?;

    let builder = OrganizationRecordBuilder::with_config(config);

    let response = match SearchResponse::interpret(options.status, &body)? {
        Some(response) => response,
        None => {
            eprintln!("❌ Not found (status {})", options.status);
            return Ok(());
        }
    };

    let results = response.organizations(&builder, options.as_of);
    eprintln!("✓ Resolved {} of {} hits", results.len(), response.len());
    for result in &results {
        let record = &result.record;
        eprintln!("  {} {}", record.cvr_number, record.all_names().join(" / "));
        if let Some(address) = &record.address {
            eprintln!("    📍 {}", address.one_line());
        }
    }

    let records: Vec<_> = results.iter().map(|r| &r.record).collect();
    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}

fn run_query(options: &Options, config: &ResolverConfig) -> Result<()> {
    let kind = options.positional.get(1).map(String::as_str);
    let term = options.positional[2.min(options.positional.len())..].join(" ");

    let query = match kind {
        Some("cvr") => {
            let number: i64 = term
                .trim()
                .parse()
                .with_context(|| format!("Invalid CVR number: {:?}", term))?;
            SearchQuery::by_cvr_number(number)
        }
        Some("name") if !term.trim().is_empty() => SearchQuery::by_name(term.trim(), config.name_search_size),
        Some("name") => bail!("query name needs a search text"),
        _ => bail!("query needs a kind: cvr <number> | name <text>"),
    };

    let endpoints = config.endpoints();
    if endpoints.is_empty() {
        eprintln!("⚠️  No search endpoint configured");
    }
    for (i, endpoint) in endpoints.iter().enumerate() {
        eprintln!("{}. POST {}", i + 1, endpoint);
    }

    println!("{}", serde_json::to_string_pretty(&query)?);

    Ok(())
}
