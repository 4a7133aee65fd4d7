//! Zipress CLI: process zip archives stored in a bucket.
//!
//! Storage is selected with STORAGE_BACKEND (s3, local or memory); see `Config::from_env`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use zipress_cli::{download_file, init_tracing, list_files, upload_file};
use zipress_core::Config;
use zipress_processing::{ArchivePipeline, CancellationToken};
use zipress_storage::create_storage;

#[derive(Parser)]
#[command(name = "zipress", about = "Extract and re-encode media from zip archives in a bucket")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcode archives into `resized/` (every archive in the bucket unless --key is given)
    Process {
        /// Key of a single archive to process
        #[arg(long)]
        key: Option<String>,
    },
    /// Copy an archive's members unchanged into `compressed/`
    Unzip {
        /// Key of the archive
        #[arg(long)]
        key: String,
    },
    /// List every object key in the bucket
    List,
    /// Upload a local file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Destination key (defaults to the file name)
        #[arg(long)]
        key: Option<String>,
    },
    /// Download an object to a local file
    Download {
        /// Object key
        key: String,
        /// Output path (defaults to the key's file name)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete an object
    Delete {
        /// Object key
        key: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Cancel `token` on the first CTRL-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping at the next entry");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;
    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage")?;

    match cli.command {
        Commands::Process { key } => {
            let pipeline = ArchivePipeline::from_config(storage, &config);
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());

            match key {
                Some(key) => print_json(&pipeline.process_archive(&key, &cancel).await?)?,
                None => print_json(&pipeline.process_bucket(&cancel).await?)?,
            }
        }
        Commands::Unzip { key } => {
            let pipeline = ArchivePipeline::from_config(storage, &config);
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());

            print_json(&pipeline.copy_archive(&key, &cancel).await?)?;
        }
        Commands::List => {
            let keys = list_files(storage.as_ref(), config.list_page_size).await?;
            print_json(&keys)?;
        }
        Commands::Upload { file, key } => {
            let stored = upload_file(storage.as_ref(), &file, key.as_deref()).await?;
            print_json(&stored)?;
        }
        Commands::Download { key, out } => {
            let out = match out {
                Some(out) => out,
                None => PathBuf::from(zipress_cli::default_key(&PathBuf::from(&key))?),
            };
            let size_bytes = download_file(storage.as_ref(), &key, &out).await?;
            print_json(&serde_json::json!({
                "key": key,
                "path": out.display().to_string(),
                "size_bytes": size_bytes,
            }))?;
        }
        Commands::Delete { key } => {
            storage.delete_object(&key).await?;
            print_json(&serde_json::json!({ "success": true, "message": format!("{} deleted", key) }))?;
        }
    }

    Ok(())
}
