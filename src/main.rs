//! Wikidata inspector: command-line entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse arguments
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Build the query endpoint
//!   7. Run the requested command (list, search or inspect)

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{info, warn};

use wikidata_inspector::config::{self, Config};
use wikidata_inspector::error::AppError;
use wikidata_inspector::logger;
use wikidata_inspector::profile::{Inspector, MergedRecord, YearRecord, display};
use wikidata_inspector::sparql::{QueryEndpoint, QueryError, Subject, endpoint};
use wikidata_inspector::subjects::{Candidate, Catalog, Debouncer};

/// `--search` argument that reads terms from stdin instead.
const STDIN_TERMS: &str = "-";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args(std::env::args().skip(1))?;

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        mode = config.endpoint.mode.as_str(),
        catalog = %config.catalog_path.display(),
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let endpoint = endpoint::build(&config.endpoint, &config.search.language)?;
    info!(endpoint = %endpoint.describe(), "endpoint ready");

    match args.command {
        Command::List { country } => list(&config, country.as_deref(), args.json),
        Command::Search { term } if term == STDIN_TERMS => {
            let debouncer = Debouncer::new(config.search.debounce);
            let stdin = BufReader::new(tokio::io::stdin());
            search_lines(stdin, &endpoint, debouncer, &mut std::io::stdout(), args.json).await
        }
        Command::Search { term } => search(&endpoint, &term, args.json).await,
        Command::Inspect { subject } => inspect(&config, endpoint, &subject, args.json).await,
    }
}

fn list(config: &Config, country: Option<&str>, json: bool) -> Result<(), AppError> {
    let catalog = Catalog::load(&config.catalog_path)?;
    let mut out = std::io::stdout().lock();

    let entries: Vec<_> = match country {
        Some(c) => catalog.filter_by_country(c).collect(),
        None => catalog.entries().iter().collect(),
    };

    if json {
        serde_json::to_writer_pretty(&mut out, &entries)?;
        writeln!(out)?;
        return Ok(());
    }

    if country.is_none() {
        writeln!(out, "{} organizations", catalog.len())?;
        for c in catalog.country_counts() {
            writeln!(out, "  {} ({})", c.country, c.count)?;
        }
        writeln!(out)?;
    }
    for e in entries {
        writeln!(out, "{:<12} {}  [{}]", e.id, e.label, e.country_or_unknown())?;
    }
    Ok(())
}

async fn search(endpoint: &QueryEndpoint, term: &str, json: bool) -> Result<(), AppError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(AppError::Usage("search term is empty".into()));
    }
    let candidates = endpoint.search(term).await?;
    let mut out = std::io::stdout().lock();
    write_candidates(&mut out, term, &candidates, json)?;
    Ok(())
}

/// Type-ahead over a line stream: each line is one keystroke's worth of input.
/// Only terms still current once the debounce delay elapses are searched.
async fn search_lines<R, W>(
    input: R,
    endpoint: &QueryEndpoint,
    debouncer: Debouncer,
    out: &mut W,
    json: bool,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let debouncer = Arc::new(debouncer);
    let mut lines = input.lines();
    let mut pending: JoinSet<Result<Option<(String, Vec<Candidate>)>, QueryError>> = JoinSet::new();
    let mut input_open = true;

    while input_open || !pending.is_empty() {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) => {
                    let debouncer = Arc::clone(&debouncer);
                    let endpoint = endpoint.clone();
                    pending.spawn(async move {
                        let Some(term) = debouncer.settle(&line).await else { return Ok(None) };
                        let candidates = endpoint.search(&term).await?;
                        Ok(Some((term, candidates)))
                    });
                }
                None => input_open = false,
            },
            Some(done) = pending.join_next() => match done {
                Ok(Ok(Some((term, candidates)))) => write_candidates(out, &term, &candidates, json)?,
                Ok(Ok(None)) => {}
                Ok(Err(e)) => warn!(error = %e, "search failed"),
                Err(e) => warn!("search task panicked: {e}"),
            },
        }
    }
    Ok(())
}

fn write_candidates(out: &mut impl Write, term: &str, candidates: &[Candidate], json: bool) -> Result<(), AppError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, candidates)?;
        writeln!(out)?;
        return Ok(());
    }
    if candidates.is_empty() {
        writeln!(out, "no results for '{term}'")?;
    }
    for c in candidates {
        match &c.description {
            Some(d) => writeln!(out, "{:<12} {} ({d})", c.id, c.label)?,
            None => writeln!(out, "{:<12} {}", c.id, c.label)?,
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ProfileDocument<'a> {
    subject: &'a Subject,
    record: &'a MergedRecord,
    financials: Vec<YearRecord>,
}

async fn inspect(config: &Config, endpoint: QueryEndpoint, needle: &str, json: bool) -> Result<(), AppError> {
    let subject = resolve_subject(config, needle)?;
    let inspector = Inspector::new(endpoint, &config.inspector);

    let record = until_interrupted(inspector.run_full_query(&subject), tokio::signal::ctrl_c()).await??;

    let mut out = std::io::stdout().lock();
    if json {
        let doc = ProfileDocument { subject: &subject, financials: record.financials(), record: &record };
        serde_json::to_writer_pretty(&mut out, &doc)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", display::render_text(&record))?;
    }
    out.flush()?;
    Ok(())
}

/// Race `work` against `interrupt`; an interruption is an error, never a quiet exit.
async fn until_interrupted<T>(work: impl Future<Output = T>, interrupt: impl Future) -> Result<T, AppError> {
    tokio::select! {
        res = work => Ok(res),
        _ = interrupt => {
            warn!("interrupted, abandoning query");
            Err(AppError::Interrupted)
        }
    }
}

/// A subject identifier, or a catalog id/label that maps to one.
fn resolve_subject(config: &Config, needle: &str) -> Result<Subject, AppError> {
    if let Ok(subject) = Subject::parse(needle) {
        return Ok(subject);
    }
    let catalog = Catalog::load(&config.catalog_path).map_err(|e| {
        warn!(error = %e, "catalog unavailable for name lookup");
        AppError::Query(QueryError::InvalidSubject(needle.to_string()))
    })?;
    let entry = catalog
        .find(needle)
        .ok_or_else(|| AppError::Usage(format!("'{needle}' is neither an identifier nor a catalog entry")))?;
    Ok(Subject::parse(&entry.id)?)
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List { country: Option<String> },
    Search { term: String },
    Inspect { subject: String },
}

#[derive(Debug)]
struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    json: bool,
    command: Command,
}

const USAGE: &str = "\
Usage: wikidata-inspector [OPTIONS] <SUBJECT>
       wikidata-inspector [OPTIONS] --search <TERM>
       wikidata-inspector [OPTIONS] --list [--country <NAME>]

Arguments:
  <SUBJECT>                  Wikidata identifier (Q312) or catalog label

Options:
  -h, --help                 Print help
  -f, --config <PATH>        Path to configuration file (default: config/default.toml)
  -s, --search <TERM>        Search organizations by name ('-' reads terms from stdin)
  -l, --list                 List the organization catalog
  -c, --country <NAME>       With --list, only this country
      --json                 Print JSON instead of text
  -v, -vv, -vvv, -vvvv       Increase logging verbosity";

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, AppError> {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut json = false;
    let mut list = false;
    let mut country = None;
    let mut term = None;
    let mut positional = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            positional = iter.next();
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            "-f" | "--config" => config_path = Some(value_for(&mut iter, "-f/--config")?),
            "-s" | "--search" => term = Some(value_for(&mut iter, "-s/--search")?),
            "-c" | "--country" => country = Some(value_for(&mut iter, "-c/--country")?),
            "-l" | "--list" => list = true,
            "--json" => json = true,
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            a if a.starts_with('-') => return Err(AppError::Usage(format!("unknown option '{a}'"))),
            _ if positional.is_none() => positional = Some(arg),
            _ => return Err(AppError::Usage(format!("unexpected argument '{arg}'"))),
        }
    }

    let command = match (list, term, positional) {
        (true, None, None) => Command::List { country },
        (false, Some(term), None) => Command::Search { term },
        (false, None, Some(subject)) => Command::Inspect { subject },
        (false, None, None) => return Err(AppError::Usage(format!("nothing to do\n\n{USAGE}"))),
        _ => return Err(AppError::Usage("give exactly one of <SUBJECT>, --search or --list".into())),
    };

    Ok(CliArgs { log_level: logger::level_for_verbosity(verbosity), config_path, json, command })
}

fn value_for(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, AppError> {
    iter.next().ok_or_else(|| AppError::Usage(format!("{flag} requires an argument")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikidata_inspector::sparql::endpoint::fixture::FixtureEndpoint;

    fn parse(args: &[&str]) -> Result<CliArgs, AppError> {
        parse_cli_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn positional_subject_inspects() {
        let a = parse(&["Q312"]).unwrap();
        assert_eq!(a.command, Command::Inspect { subject: "Q312".into() });
        assert_eq!(a.log_level, None);
        assert!(!a.json);
    }

    #[test]
    fn verbosity_tiers() {
        assert_eq!(parse(&["-v", "Q1"]).unwrap().log_level, Some("warn"));
        assert_eq!(parse(&["-vvv", "Q1"]).unwrap().log_level, Some("debug"));
        assert_eq!(parse(&["-vv", "-vv", "Q1"]).unwrap().log_level, Some("trace"));
    }

    #[test]
    fn list_with_country_and_config() {
        let a = parse(&["--list", "-c", "Germany", "-f", "custom.toml", "--json"]).unwrap();
        assert_eq!(a.command, Command::List { country: Some("Germany".into()) });
        assert_eq!(a.config_path.as_deref(), Some("custom.toml"));
        assert!(a.json);
    }

    #[test]
    fn search_term() {
        let a = parse(&["--search", "apple"]).unwrap();
        assert_eq!(a.command, Command::Search { term: "apple".into() });
    }

    #[test]
    fn dash_search_reads_stdin() {
        let a = parse(&["-s", "-"]).unwrap();
        assert_eq!(a.command, Command::Search { term: STDIN_TERMS.into() });
    }

    fn apple_endpoint() -> QueryEndpoint {
        QueryEndpoint::Fixture(FixtureEndpoint::new().candidates(
            "apple",
            vec![Candidate { id: "Q312".into(), label: "Apple Inc.".into(), description: None }],
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_lines_searches_only_the_last() {
        let mut out = Vec::new();
        let input: &[u8] = b"ap\napp\napple\n";
        search_lines(input, &apple_endpoint(), Debouncer::default(), &mut out, false).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["Q312         Apple Inc."]);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_line_yields_no_search() {
        let mut out = Vec::new();
        let input: &[u8] = b"apple\n   \n";
        search_lines(input, &apple_endpoint(), Debouncer::default(), &mut out, false).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn interruption_is_an_error() {
        let err = until_interrupted(std::future::pending::<()>(), std::future::ready(())).await.unwrap_err();
        assert!(matches!(err, AppError::Interrupted));

        let done = until_interrupted(async { 7 }, std::future::pending::<()>()).await.unwrap();
        assert_eq!(done, 7);
    }

    #[test]
    fn conflicting_or_missing_commands_are_usage_errors() {
        assert!(matches!(parse(&[]), Err(AppError::Usage(_))));
        assert!(matches!(parse(&["--list", "Q1"]), Err(AppError::Usage(_))));
        assert!(matches!(parse(&["Q1", "Q2"]), Err(AppError::Usage(_))));
        assert!(matches!(parse(&["--search"]), Err(AppError::Usage(_))));
        assert!(matches!(parse(&["--bogus"]), Err(AppError::Usage(_))));
    }
}
