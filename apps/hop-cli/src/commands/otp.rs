use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use hop_core::otp::OtpService;
use hop_core::Settings;
use hop_store::{search, validate_alias, OtpStore, ReferenceTarget};

use super::{
    print_import_summary, print_listing, read_input, state_kv, write_output, ExportArgs,
    ImportArgs, ListArgs,
};
use crate::adapters::OpCli;

#[derive(Subcommand)]
pub enum OtpCmd {
    /// List OTP entries
    List(ListArgs),
    /// Print the current one-time code for an alias
    Get { alias: String },
    /// Add an entry; `?attribute=otp` is appended to the reference when missing
    Add { label: String, reference: String },
    /// Change the label and/or reference of an entry
    Edit {
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long = "ref")]
        reference: Option<String>,
    },
    /// Remove an entry by id
    Rm { id: String },
    /// Merge entries from JSON or `Label = op://...` lines
    Import(ImportArgs),
    /// Print entries as re-importable JSON
    Export(ExportArgs),
    /// Check that the 1Password CLI can be found and run
    Doctor,
}

fn store(settings: &Settings) -> OtpStore {
    OtpStore::new(state_kv(settings)).with_seed(settings.otp_seed.clone())
}

fn service(settings: &Settings) -> (OtpService, OpCli) {
    let op = OpCli::from_settings(settings);
    (
        OtpService::new(store(settings), Arc::new(op.clone())),
        op,
    )
}

pub async fn run(cmd: OtpCmd, settings: &Settings) -> Result<()> {
    match cmd {
        OtpCmd::List(args) => {
            let records = store(settings).load().await?;
            let hits = search(&records, args.query.as_deref().unwrap_or(""));
            print_listing(&hits, args.json)
        }
        OtpCmd::Get { alias } => {
            let (service, _) = service(settings);
            let code = service.fetch(&alias).await?;
            println!("{}", code.code);
            Ok(())
        }
        OtpCmd::Add { label, reference } => {
            let alias = validate_alias(&label)?;
            let target = ReferenceTarget::from_input(&reference)?;
            let record = store(settings).add(&alias, target).await?;
            println!("Added {} ({})", record.alias, record.id);
            Ok(())
        }
        OtpCmd::Edit {
            id,
            label,
            reference,
        } => {
            let store = store(settings);
            let records = store.load().await?;
            let mut record = records
                .into_iter()
                .find(|r| r.id == id)
                .with_context(|| format!("no OTP entry with id {id}"))?;
            if let Some(label) = label {
                record.alias = validate_alias(&label)?;
            }
            if let Some(reference) = reference {
                record.target = ReferenceTarget::from_input(&reference)?;
            }
            let alias = record.alias.clone();
            if !store.update(record).await? {
                bail!("no OTP entry with id {id}");
            }
            println!("Updated {alias}");
            Ok(())
        }
        OtpCmd::Rm { id } => {
            if !store(settings).delete(&id).await? {
                bail!("no OTP entry with id {id}");
            }
            println!("Removed {id}");
            Ok(())
        }
        OtpCmd::Import(args) => {
            let text = read_input(args.file.as_deref())?;
            let report = store(settings).import(&text).await?;
            if report.parsed == 0 {
                bail!("no valid OTP entries found in input");
            }
            print_import_summary("OTP", &report);
            Ok(())
        }
        OtpCmd::Export(args) => {
            let text = store(settings).export().await?;
            write_output(args.out.as_deref(), &text)
        }
        OtpCmd::Doctor => {
            let (service, op) = service(settings);
            println!("op: {}", op.program());
            let version = service.check_tool().await?;
            println!("version: {version}");
            Ok(())
        }
    }
}
