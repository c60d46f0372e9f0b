pub mod config;
pub mod otp;
pub mod paths;
pub mod tabs;

pub use config::ConfigCmd;
pub use otp::OtpCmd;
pub use paths::PathsArgs;
pub use tabs::TabsCmd;

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use hop_core::Settings;
use hop_runtime::KeyValueStore;
use hop_store::{AliasRecord, FileKv, Target};

#[derive(Args)]
pub struct ListArgs {
    /// Case-insensitive filter on alias and target fields
    pub query: Option<String>,
    /// Print JSON (including ids) instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Read from this file instead of stdin
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub(crate) fn state_kv(settings: &Settings) -> Arc<dyn KeyValueStore> {
    Arc::new(FileKv::new(&settings.state_dir))
}

pub(crate) fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

pub(crate) fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

pub(crate) fn print_listing<T: Target>(records: &[&AliasRecord<T>], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    if records.is_empty() {
        eprintln!("No {} entries.", T::CATALOG);
        return Ok(());
    }
    let width = records.iter().map(|r| r.alias.chars().count()).max().unwrap_or(0);
    for record in records {
        println!(
            "{:<width$}  {}  [{}]",
            record.alias,
            record.target.describe(),
            record.id,
            width = width
        );
    }
    Ok(())
}

pub(crate) fn print_import_summary(catalog: &str, report: &hop_store::ImportReport) {
    println!(
        "Imported {} {} entries ({} updated, {} new)",
        report.parsed, catalog, report.updated, report.inserted
    );
}
