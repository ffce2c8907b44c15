use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use metricwatch::seed::{self, SeedPlan};
use metricwatch::{App, DrawOutcome, FileStore, MetricsClient, MetricsService, Settings};

#[derive(Parser, Debug)]
#[command(name = "metricwatch")]
#[command(about = "Explore and graph time-series measurements from a remote metrics service")]
struct Args {
    /// Metrics service endpoint, e.g. http://localhost:8080
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Graph-state file (persisted configurations)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for graphable resources and their metrics
    Search {
        /// Free-text query, e.g. "type:generated"
        query: String,
    },

    /// Query measurements and emit chartable series as JSON
    Graph {
        /// Resource id to graph
        resource: String,

        /// Metrics to include, in plot order
        #[arg(short, long, value_delimiter = ',', required = true)]
        metrics: Vec<String>,

        /// Sample interval override, e.g. "300s"
        #[arg(long)]
        interval: Option<String>,

        /// Resolution override, e.g. "15m"
        #[arg(long)]
        resolution: Option<String>,

        /// Range start (RFC-3339 or epoch milliseconds)
        #[arg(long)]
        start: Option<String>,

        /// Range end (RFC-3339 or epoch milliseconds)
        #[arg(long)]
        end: Option<String>,

        /// Aggregation function for every selected metric (MIN, AVERAGE, MAX)
        #[arg(long)]
        function: Option<String>,

        /// Write the series JSON to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate random test data and upload it to the service
    Seed {
        /// Number of samples to generate
        #[arg(long, default_value_t = 43_200)]
        samples: usize,

        /// Samples per upload batch
        #[arg(long, default_value_t = 100)]
        batch_size: usize,

        /// Spacing between samples in milliseconds
        #[arg(long, default_value_t = 60_000)]
        interval_ms: i64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = endpoint;
    }
    if let Some(state) = args.state {
        settings.state_file = state;
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(args.command, settings))
}

async fn run(command: Command, settings: Settings) -> Result<()> {
    let client = MetricsClient::builder().endpoint(&settings.endpoint).build();

    match command {
        Command::Search { query } => run_search(&client, &query).await,
        Command::Graph {
            resource,
            metrics,
            interval,
            resolution,
            start,
            end,
            function,
            out,
        } => {
            let overrides = Overrides {
                interval,
                resolution,
                start,
                end,
                function,
            };
            run_graph(client, &settings, &resource, metrics, overrides, out).await
        }
        Command::Seed {
            samples,
            batch_size,
            interval_ms,
        } => run_seed(&client, samples, batch_size, interval_ms).await,
    }
}

async fn run_search(client: &MetricsClient, query: &str) -> Result<()> {
    let hits = client.search(query).await?;

    if hits.is_empty() {
        println!("No resources match \"{query}\"");
        return Ok(());
    }

    for hit in hits {
        println!("{}: {}", hit.resource.id, hit.metrics.join(", "));
    }
    Ok(())
}

/// Flag overrides applied on top of a restored configuration; the CLI
/// stands in for the configuration form.
struct Overrides {
    interval: Option<String>,
    resolution: Option<String>,
    start: Option<String>,
    end: Option<String>,
    function: Option<String>,
}

async fn run_graph(
    client: MetricsClient,
    settings: &Settings,
    resource: &str,
    metrics: Vec<String>,
    overrides: Overrides,
    out: Option<PathBuf>,
) -> Result<()> {
    let store = FileStore::open(&settings.state_file);
    let mut app = App::new(Box::new(client), Box::new(store));

    app.select(resource, metrics);
    apply_overrides(&mut app, overrides)?;

    match app.draw().await? {
        DrawOutcome::Plotted(series) => {
            let json = serde_json::to_string_pretty(&series)?;
            match out {
                Some(path) => {
                    fs::write(&path, json)?;
                    println!("Wrote {} series to {}", series.len(), path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
        DrawOutcome::ConfigRequired(reason) => {
            if reason.is_empty() {
                bail!("the service rejected the query; more configuration is required");
            }
            bail!("the service rejected the query: {}", reason.trim());
        }
    }
}

fn apply_overrides(app: &mut App, overrides: Overrides) -> Result<()> {
    if let Some(interval) = overrides.interval {
        app.config.interval = interval;
    }
    if let Some(resolution) = overrides.resolution {
        app.config.resolution = resolution;
    }
    if let Some(start) = overrides.start {
        app.config.range.start = Some(start);
    }
    if let Some(end) = overrides.end {
        app.config.range.end = Some(end);
    }
    if let Some(function) = overrides.function {
        let function = function
            .parse()
            .map_err(|e: String| anyhow!(e))?;
        for metric in app.config.metrics.values_mut() {
            metric.function = function;
        }
    }
    Ok(())
}

async fn run_seed(
    client: &MetricsClient,
    samples: usize,
    batch_size: usize,
    interval_ms: i64,
) -> Result<()> {
    let plan = SeedPlan {
        samples,
        interval_ms,
        batch_size,
    };

    let report = seed::run(client, &plan).await?;

    println!(
        "Added {} samples in {} batches for resource \"{}\"",
        report.samples, report.batches, report.resource
    );
    println!("Hint: also try searching \"type:generated\", or just \"generated\".");
    Ok(())
}
