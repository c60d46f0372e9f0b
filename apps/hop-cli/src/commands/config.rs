use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use hop_core::{config_schema_json, write_schema_file, Settings};

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Print (or write) the JSON schema for hop.toml
    Schema {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the resolved settings (config file plus environment)
    Show,
}

pub fn run(cmd: ConfigCmd) -> Result<()> {
    match cmd {
        ConfigCmd::Schema { out: Some(path) } => {
            write_schema_file(&path).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        ConfigCmd::Schema { out: None } => {
            println!("{}", serde_json::to_string_pretty(&config_schema_json())?);
        }
        ConfigCmd::Show => {
            let settings = Settings::load()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}
