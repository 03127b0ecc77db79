use ::log::{debug, info};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;

mod diagnostics;
mod fetch;
mod log;
mod model;
mod query;
mod render;

use crate::fetch::LogSource;
use crate::log::RunResult;
use crate::query::LogQuery;
use crate::render::ChartSession;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "memstat-profile-viz")]
#[command(about = "Compare per-test memory stats across test-run logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the runs and write an HTML chart (fails if the runs disagree).
    Report {
        /// Log URLs or local paths.
        sources: Vec<String>,

        /// More log URLs as a query string: `?url=<escaped>&url=<escaped>`.
        #[arg(long)]
        query: Option<String>,

        #[arg(short = 'o', long)]
        out: String,

        /// Also write the aligned dataset as JSON.
        #[arg(long)]
        json: Option<String>,

        #[arg(long, default_value = "Memory stats")]
        title: String,
    },
    /// Parse each log and print its tests and instrument support, without comparing.
    Inspect {
        sources: Vec<String>,

        #[arg(long)]
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report {
            sources,
            query,
            out,
            json,
            title,
        } => {
            // Any fatal error replaces the chart with an error page.
            let session = match build_session(sources, query.as_deref(), title).await {
                Ok(session) => session,
                Err(e) => {
                    write_output(&out, render::render_error_html(&e.to_string()))?;
                    return Err(e);
                }
            };

            let html = render::render_html_report(&session)?;
            write_output(&out, html)?;
            println!("Wrote {}", out);

            if let Some(json) = json {
                write_output(&json, render::render_json(&session)?)?;
                println!("Wrote {}", json);
            }
        }
        Commands::Inspect { sources, query } => {
            let query = collect_query(sources, query.as_deref())?;
            let runs = load_runs(&query).await?;

            let summary: Vec<serde_json::Value> = query
                .urls()
                .iter()
                .zip(&runs)
                .map(|(source, run)| inspect_run(source, run))
                .collect();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

async fn build_session(
    sources: Vec<String>,
    query: Option<&str>,
    title: String,
) -> Result<ChartSession> {
    // 1) Collect sources (positional first, then the query string).
    let query = collect_query(sources, query)?;

    // 2) Fetch + parse every run.
    let runs = load_runs(&query).await?;
    warn_unplotted(&runs);

    // 3) Reconcile onto the longest run's test sequence.
    let dataset = model::reconcile(&runs)?;
    info!(
        "reference run {} with {} tests, {} instrument(s)",
        dataset.reference_run,
        dataset.identifiers.len(),
        dataset.series.len()
    );

    Ok(ChartSession::new(title, query, dataset))
}

fn write_output(path: &str, contents: String) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("write output file {}", path))
}

fn collect_query(sources: Vec<String>, search: Option<&str>) -> Result<LogQuery> {
    let from_search = match search {
        Some(search) => LogQuery::parse(search)?.urls().to_vec(),
        None => Vec::new(),
    };
    Ok(LogQuery::from_urls(sources.into_iter().chain(from_search))?)
}

async fn load_runs(query: &LogQuery) -> Result<Vec<RunResult>> {
    let sources: Vec<LogSource> = query.urls().iter().map(|u| LogSource::parse(u)).collect();
    let texts = fetch::fetch_all(&sources).await?;

    Ok(texts
        .iter()
        .zip(&sources)
        .map(|(text, source)| {
            let run = log::parse_run(text);
            info!(
                "parsed {}: {} tests, {} supported instrument(s)",
                source,
                run.tests.len(),
                run.support.values().filter(|s| **s).count()
            );
            debug!("support table for {}: {:?}", source, run.support);
            run
        })
        .collect())
}

fn warn_unplotted(runs: &[RunResult]) {
    for (i, run) in runs.iter().enumerate() {
        for name in run.instruments() {
            if !run.support.contains_key(name) {
                diagnostics::warn(format!(
                    "run {} reports '{}' only after its first test; it will not be plotted",
                    i, name
                ));
            }
        }
    }
}

fn inspect_run(source: &str, run: &RunResult) -> serde_json::Value {
    // Peak value per instrument, formatted like the chart's y axis.
    let mut peaks: BTreeMap<&str, i64> = BTreeMap::new();
    for test in &run.tests {
        for (name, value) in &test.memory {
            if let Some(v) = value {
                let peak = peaks.entry(name.as_str()).or_insert(*v);
                *peak = (*peak).max(*v);
            }
        }
    }
    let peaks: BTreeMap<&str, String> = peaks
        .into_iter()
        .map(|(name, v)| (name, render::format_bytes(v)))
        .collect();

    serde_json::json!({
        "source": source,
        "tests": run.tests.len(),
        "support": run.support,
        "instruments": run.instruments(),
        "peaks": peaks,
    })
}
