use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use splitter::config::{GithubConfig, ReportConfig, SplitConfig};
use splitter::history::HistorySource;
use splitter::scheduler::{partition, reconcile, Bucket, InputFileSet, PartitionOrder};
use splitter::Result;

#[derive(Parser, Debug)]
#[command(name = "splitter")]
#[command(version)]
#[command(about = "Split test files across parallel CI nodes using timings from previous runs")]
struct Args {
    /// Number of parallel nodes
    #[arg(long, env = "NODES_COUNT", allow_negative_numbers = true)]
    nodes: i64,

    /// Index of this node, from 0 to nodes - 1
    #[arg(long, env = "NODE_ID", allow_negative_numbers = true)]
    node_index: i64,

    /// File with the list of test files, one per line (stdin if not set)
    #[arg(long, env = "INPUT_FROM_FILE")]
    input: Option<PathBuf>,

    // === History Options ===
    /// Read history from a local artifact zip instead of GitHub
    #[arg(long, env = "SPLITTER_ARCHIVE")]
    archive: Option<PathBuf>,

    /// Repository to fetch artifacts from ("owner/repo")
    #[arg(long, env = "GITHUB_REPOSITORY", default_value = "")]
    repo: String,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", default_value = "", hide_env_values = true)]
    token: String,

    /// Current branch or ref, used when the default branch has no artifacts
    #[arg(long, env = "GITHUB_REF", default_value = "")]
    branch: String,

    /// Branch whose artifacts are preferred
    #[arg(long, default_value = "main")]
    default_branch: String,

    /// Name of the artifact holding test reports
    #[arg(long, default_value = "test-results")]
    artifact_name: String,

    /// GitHub API base URL
    #[arg(long, default_value = "https://api.github.com")]
    api_url: String,

    /// Maximum artifact list pages to fetch (100 artifacts each)
    #[arg(long, default_value = "10")]
    max_pages: u32,

    /// Report file name prefix inside the artifact
    #[arg(long, default_value = "rspec-")]
    report_prefix: String,

    /// Report file name suffix inside the artifact
    #[arg(long, default_value = ".xml")]
    report_suffix: String,

    // === Output Options ===
    /// Order in which files are assigned to nodes
    #[arg(long, value_enum, default_value = "by-name")]
    order: OrderArg,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value = "lines")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    ByName,
    LongestFirst,
}

impl From<OrderArg> for PartitionOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::ByName => PartitionOrder::ByName,
            OrderArg::LongestFirst => PartitionOrder::LongestFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Lines,
    Json,
}

#[derive(Serialize)]
struct ChunkOutput<'a> {
    node_index: usize,
    file_count: usize,
    total_seconds: f64,
    files: &'a [String],
}

// =============================================================================
// Helper Functions
// =============================================================================

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

async fn read_input(path: Option<&Path>) -> Result<InputFileSet> {
    let text = match path {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };
    Ok(InputFileSet::parse(&text))
}

fn history_source(args: &Args) -> HistorySource {
    if let Some(path) = non_empty(args.archive.clone()) {
        return HistorySource::Archive(path);
    }
    if args.repo.is_empty() {
        tracing::warn!("No repository configured, running without history");
        return HistorySource::Disabled;
    }

    let config = GithubConfig {
        api_url: args.api_url.clone(),
        artifact_name: args.artifact_name.clone(),
        default_branch: args.default_branch.clone(),
        max_pages: args.max_pages,
        ..GithubConfig::new(&args.repo, &args.token)
    }
    .with_branch(&args.branch);
    HistorySource::Github(config)
}

fn write_bucket(bucket: &Bucket, format: OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    match format {
        OutputFormat::Lines => {
            for filename in &bucket.files {
                tracing::info!(%filename, "File to run");
                writeln!(writer, "{}", filename)?;
            }
        }
        OutputFormat::Json => {
            let output = ChunkOutput {
                node_index: bucket.index,
                file_count: bucket.files.len(),
                total_seconds: bucket.total_time,
                files: &bucket.files,
            };
            serde_json::to_writer_pretty(&mut writer, &output)?;
            writeln!(writer)?;
        }
    }

    writer.flush()?;
    Ok(())
}

// =============================================================================
// Split
// =============================================================================

async fn run(args: Args) -> Result<()> {
    let config = SplitConfig::new(args.nodes, args.node_index)?.with_order(args.order.into());
    let input = read_input(non_empty(args.input.clone()).as_deref()).await?;

    tracing::info!(
        branch = %args.branch,
        node = config.node_index,
        max_nodes = config.node_count,
        order = %config.order,
        input_files_count = input.len(),
        "Start"
    );

    let reports = ReportConfig {
        prefix: args.report_prefix.clone(),
        suffix: args.report_suffix.clone(),
    };
    let records = history_source(&args).load(&reports).await?;

    let timing = reconcile(&records, &input);
    tracing::info!(count = timing.len(), total_time = timing.total(), "Files to run");

    let split = partition(&timing, config.node_count, config.order)?;
    tracing::info!(
        max_bucket_time = split.max_total(),
        "Return chunk for NODE_ID {}",
        config.node_index
    );

    let bucket = split.bucket(config.node_index)?;
    write_bucket(bucket, args.format)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // stdout carries the chunk, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "Split failed");
        std::process::exit(1);
    }
}
