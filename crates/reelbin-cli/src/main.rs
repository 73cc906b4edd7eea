//! reelbin CLI: admin client for the reelbin API.
//!
//! The `upload` subcommand is the bulk-upload flow: probe every file for
//! duration and a thumbnail frame, queue them, then submit sequentially with
//! per-item progress. Set REELBIN_API_URL and REELBIN_ADMIN_PASSWORD, or pass
//! `--api-url` / `--password`.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::mpsc;

use reelbin_api_client::ApiClient;
use reelbin_cli::adapters::{ApiUploader, FfmpegProbe};
use reelbin_cli::{format_size_mb, init_tracing};
use reelbin_processing::MetadataExtractor;
use reelbin_queue::{QueueEvent, QueueStatus, SourceFile, UploadQueue};

#[derive(Parser)]
#[command(name = "reelbin", about = "reelbin catalog CLI")]
struct Cli {
    /// API base URL (default: REELBIN_API_URL or http://localhost:5000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Admin password (default: REELBIN_ADMIN_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe and upload video files through the bulk queue
    Upload {
        /// Video files to queue, uploaded in the given order
        files: Vec<PathBuf>,
    },
    /// Register an existing host file code without uploading bytes
    Add {
        /// Host file code
        code: String,
        /// Title (defaults to the file code)
        #[arg(long)]
        title: Option<String>,
        /// Duration as mm:ss or hh:mm:ss
        #[arg(long, default_value = "0:00")]
        duration: String,
    },
    /// List all catalog videos
    List,
    /// Get a single video by ID (counts a view)
    Get {
        /// Video UUID
        id: String,
    },
    /// Delete a video by ID
    Delete {
        /// Video UUID
        id: String,
    },
    /// Check the admin password against the server
    Verify,
    /// Catalog totals (video count, views)
    Stats,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn build_client(cli: &Cli) -> anyhow::Result<ApiClient> {
    let base_url = cli
        .api_url
        .clone()
        .or_else(|| std::env::var("REELBIN_API_URL").ok())
        .unwrap_or_else(|| "http://localhost:5000".to_string());
    let password = cli
        .password
        .clone()
        .or_else(|| std::env::var("REELBIN_ADMIN_PASSWORD").ok());
    Ok(ApiClient::new(base_url, password)?)
}

fn credential(cli: &Cli) -> String {
    cli.password
        .clone()
        .or_else(|| std::env::var("REELBIN_ADMIN_PASSWORD").ok())
        .unwrap_or_default()
}

async fn bulk_upload(cli: &Cli, files: Vec<PathBuf>) -> anyhow::Result<()> {
    if files.is_empty() {
        anyhow::bail!("Select at least one video file");
    }

    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid filename: {}", path.display()))?
            .to_string();
        sources.push(SourceFile::new(filename, data));
    }

    let probe = FfmpegProbe(MetadataExtractor::new(
        std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
        std::env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
    ));

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut queue = UploadQueue::with_events(events_tx);

    println!("Detecting metadata for {} file(s)...", sources.len());
    queue.enqueue(sources, &probe).await;

    let mut titles = HashMap::new();
    println!("\nUpload queue ({}):", queue.len());
    for item in queue.items() {
        titles.insert(item.id, item.title.clone());
        println!(
            "  {}  [{}]  {}  ({})",
            item.title,
            item.duration,
            item.source.filename,
            format_size_mb(item.source.data.len() as u64),
        );
    }
    println!();

    let printer = tokio::spawn(print_events(events_rx, titles));

    let uploader = ApiUploader::new(build_client(cli)?);
    let result = queue.upload_all(&uploader, &credential(cli)).await;
    queue.close_events();
    printer.await.ok();

    result.context("Bulk upload aborted")?;

    let mut failed = 0;
    for item in queue.items() {
        match item.status {
            QueueStatus::Done => println!("done   {}", item.title),
            QueueStatus::Error => {
                failed += 1;
                println!(
                    "error  {} - {}",
                    item.title,
                    item.error_message.as_deref().unwrap_or("unknown error")
                );
            }
            _ => println!("{}  {}", item.status, item.title),
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} uploads failed", failed, queue.len());
    }
    println!("\nAll videos uploaded successfully.");
    Ok(())
}

async fn print_events(
    mut events: mpsc::UnboundedReceiver<QueueEvent>,
    titles: HashMap<reelbin_queue::QueueItemId, String>,
) {
    while let Some(event) = events.recv().await {
        match event {
            QueueEvent::StatusChanged { id, status } => {
                let title = titles.get(&id).map(String::as_str).unwrap_or("?");
                match status {
                    QueueStatus::Uploading => println!("Uploading {}...", title),
                    QueueStatus::Done => println!("  100% - done"),
                    QueueStatus::Error => println!("  failed"),
                    QueueStatus::Pending => {}
                }
            }
            QueueEvent::Progress { percent, .. } => {
                print!("\r  {:>3}%", percent);
                let _ = std::io::stdout().flush();
                if percent == 100 {
                    println!();
                }
            }
            QueueEvent::ItemAdded { .. } => {}
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Upload { files } => bulk_upload(&cli, files.clone()).await?,
        Commands::Add {
            code,
            title,
            duration,
        } => {
            let client = build_client(&cli)?;
            let title = title.clone().unwrap_or_else(|| code.clone());
            let response = client.add_video_by_code(code, &title, duration).await?;
            print_json(&response)?;
        }
        Commands::List => {
            let client = build_client(&cli)?;
            let response = client.list_videos().await?;
            print_json(&response)?;
        }
        Commands::Get { id } => {
            let client = build_client(&cli)?;
            let id = id.parse().context("Invalid video UUID")?;
            let response = client.get_video(id).await?;
            print_json(&response)?;
        }
        Commands::Delete { id } => {
            let client = build_client(&cli)?;
            let id = id.parse().context("Invalid video UUID")?;
            let response = client.delete_video(id).await?;
            print_json(&response)?;
        }
        Commands::Verify => {
            let client = build_client(&cli)?;
            let response = client.verify_admin().await?;
            print_json(&response)?;
        }
        Commands::Stats => {
            let client = build_client(&cli)?;
            let response = client.admin_stats().await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
