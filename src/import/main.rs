//! Survey import CLI.
//!
//! Reads a JSON batch exported from the survey app, drops points already
//! present in OSM and uploads the rest in one changeset.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geopaposm::batch::{parse_records, BatchImporter, RecordOutcome};
use geopaposm::config::Config;
use geopaposm::models::{SearchBuffer, SurveyRecord};
use geopaposm::osm::{
    ChangesetUploader, DryRunSink, GeoDataSource, MemorySource, OsmClient, UploadSink,
};
use geopaposm::ImportError;

#[derive(Parser, Debug)]
#[command(name = "import")]
#[command(about = "Import survey points into OpenStreetMap")]
struct Args {
    /// JSON batch exported from the survey app
    file: PathBuf,

    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OSM API base URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// OSM username
    #[arg(long, env = "OSM_USERNAME")]
    username: Option<String>,

    /// OSM password
    #[arg(long, env = "OSM_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Note appended to the changeset comment
    #[arg(long)]
    comment: Option<String>,

    /// Search buffer in degrees around each point
    #[arg(long)]
    buffer: Option<f64>,

    /// Compare against a JSON file of existing entities instead of the API
    #[arg(long)]
    existing: Option<PathBuf>,

    /// Log what would be uploaded without touching OSM
    #[arg(long)]
    dry_run: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("geopaposm import");
    info!("File: {}", args.file.display());

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(url) = &args.api_url {
        config.api.url = url.clone();
    }
    if args.username.is_some() {
        config.api.username = args.username.clone();
    }
    if args.password.is_some() {
        config.api.password = args.password.clone();
    }
    if let Some(degrees) = args.buffer {
        config.import.buffer = SearchBuffer::new(degrees)?;
    }
    let comment = args.comment.as_deref().or(config.import.comment.as_deref());

    let input = std::fs::read_to_string(&args.file).context("Failed to read input batch")?;
    let records = match parse_records(&input) {
        Ok(records) => records,
        Err(e) => return Ok(report_error(&e)),
    };
    info!("Loaded {} survey records", records.len());

    let client = OsmClient::new(&config.api.url, config.api.credentials())
        .context("Failed to create OSM API client")?;
    info!("OSM API: {}", client.base_url());

    let source: Box<dyn GeoDataSource> = match &args.existing {
        Some(path) => Box::new(
            MemorySource::load_from_file(path).context("Failed to load existing entities")?,
        ),
        None => Box::new(client.clone()),
    };

    let mut sink: Box<dyn UploadSink> = if args.dry_run {
        Box::new(DryRunSink::new())
    } else {
        if config.api.credentials().is_none() {
            anyhow::bail!("Uploading requires --username and --password (or a config token)");
        }
        Box::new(ChangesetUploader::new(client, comment))
    };

    let outcome = import_all(
        &records,
        source.as_ref(),
        sink.as_mut(),
        config.import.buffer,
    )
    .await;

    match outcome {
        Ok(label) => {
            println!("{}", label);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_error(&e)),
    }
}

async fn import_all(
    records: &[SurveyRecord],
    source: &dyn GeoDataSource,
    sink: &mut dyn UploadSink,
    buffer: SearchBuffer,
) -> Result<String, ImportError> {
    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut importer = BatchImporter::new(source, sink, buffer);
    let mut ineligible = 0usize;

    for record in records {
        if importer.process(record).await? == RecordOutcome::Ineligible {
            ineligible += 1;
        }
        pb.set_message(format!("{} queued", importer.stats().created));
        pb.inc(1);
    }
    pb.finish_with_message("Processing complete");

    if ineligible > 0 {
        warn!("{} records had no usable location", ineligible);
    }

    let result = importer.finish().await?;
    info!("Import finished: {}", result.summary());
    Ok(result.output_label())
}

fn report_error(e: &ImportError) -> ExitCode {
    error!("{}", e);
    println!("{}", e.label());
    ExitCode::FAILURE
}
