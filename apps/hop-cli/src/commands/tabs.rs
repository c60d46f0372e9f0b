use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use hop_core::orchestrator::Orchestrator;
use hop_core::Settings;
use hop_events::{kinds, Envelope};
use hop_store::{
    parse_selector, resolve, search, split_keywords, validate_alias, ContextSelectorTarget,
    Resolution, TabStore, Target, ValidationError,
};
use tokio::sync::broadcast::{self, error::RecvError};

use super::{
    print_import_summary, print_listing, read_input, state_kv, write_output, ExportArgs,
    ImportArgs, ListArgs,
};
use crate::adapters::{KeystrokeSelector, MenuSwitcher, ScriptSwitcher};

#[derive(Subcommand)]
pub enum TabsCmd {
    /// List tab shortcuts, sorted by workspace then tab index
    List(ListArgs),
    /// Switch to the workspace and select the tab mapped to an alias
    Open { alias: String },
    /// Add a tab shortcut
    Add {
        #[arg(long)]
        alias: String,
        #[arg(long)]
        workspace: String,
        /// 1-based index of the pinned tab
        #[arg(long)]
        tab: String,
        /// Comma-separated extra search terms
        #[arg(long, default_value = "")]
        keywords: String,
    },
    /// Change fields of a tab shortcut
    Edit {
        id: String,
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        workspace: Option<String>,
        #[arg(long)]
        tab: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
    },
    /// Remove a tab shortcut by id
    Rm { id: String },
    /// Merge shortcuts from a JSON array
    Import(ImportArgs),
    /// Print shortcuts as re-importable JSON
    Export(ExportArgs),
}

fn store(settings: &Settings) -> TabStore {
    TabStore::new(state_kv(settings)).with_seed(settings.tabs_seed.clone())
}

pub async fn run(cmd: TabsCmd, settings: &Settings) -> Result<()> {
    match cmd {
        TabsCmd::List(args) => {
            let records = store(settings).load().await?;
            let hits = search(&records, args.query.as_deref().unwrap_or(""));
            print_listing(&hits, args.json)
        }
        TabsCmd::Open { alias } => open(settings, &alias).await,
        TabsCmd::Add {
            alias,
            workspace,
            tab,
            keywords,
        } => {
            let alias = validate_alias(&alias)?;
            let target = ContextSelectorTarget::from_input(&workspace, &tab, &keywords)?;
            let record = store(settings).add(&alias, target).await?;
            println!(
                "Added {} → {} ({})",
                record.alias,
                record.target.describe(),
                record.id
            );
            Ok(())
        }
        TabsCmd::Edit {
            id,
            alias,
            workspace,
            tab,
            keywords,
        } => {
            let store = store(settings);
            let records = store.load().await?;
            let mut record = records
                .into_iter()
                .find(|r| r.id == id)
                .with_context(|| format!("no tab shortcut with id {id}"))?;
            if let Some(alias) = alias {
                record.alias = validate_alias(&alias)?;
            }
            if let Some(workspace) = workspace {
                let workspace = workspace.trim();
                if workspace.is_empty() {
                    return Err(ValidationError::MissingField("workspace name").into());
                }
                record.target.context_name = workspace.to_string();
            }
            if let Some(tab) = tab {
                record.target.selector = parse_selector(&tab)?;
            }
            if let Some(keywords) = keywords {
                record.target.keywords = split_keywords(&keywords);
            }
            let alias = record.alias.clone();
            if !store.update(record).await? {
                bail!("no tab shortcut with id {id}");
            }
            println!("Updated {alias}");
            Ok(())
        }
        TabsCmd::Rm { id } => {
            if !store(settings).delete(&id).await? {
                bail!("no tab shortcut with id {id}");
            }
            println!("Removed {id}");
            Ok(())
        }
        TabsCmd::Import(args) => {
            let text = read_input(args.file.as_deref())?;
            let report = store(settings).import(&text).await?;
            if report.parsed == 0 {
                bail!("no valid tab shortcuts found in input");
            }
            print_import_summary("tab", &report);
            Ok(())
        }
        TabsCmd::Export(args) => {
            let text = store(settings).export().await?;
            write_output(args.out.as_deref(), &text)
        }
    }
}

fn orchestrator(settings: &Settings) -> Orchestrator {
    let orchestrator = Orchestrator::new(
        Box::new(ScriptSwitcher::default()),
        Box::new(KeystrokeSelector::default()),
    )
    .with_settle(Duration::from_millis(settings.settle_ms))
    .with_modifier_key(settings.modifier_key.clone());
    if settings.use_ui_scripting {
        orchestrator.with_primary(Box::new(MenuSwitcher::default()))
    } else {
        orchestrator
    }
}

async fn open(settings: &Settings, alias: &str) -> Result<()> {
    let records = store(settings).load().await?;
    let target = match resolve(&records, alias) {
        Resolution::Found(record) => record.target.clone(),
        Resolution::NotFound => bail!("no tab shortcut named {:?}", alias.trim()),
        Resolution::Empty => bail!("no tab shortcuts configured; add one with `hop tabs add`"),
    };

    let orchestrator = orchestrator(settings);
    let printer = tokio::spawn(print_progress(orchestrator.bus().subscribe()));
    eprintln!("Opening {}", target.describe());
    let report = orchestrator.run(&target).await;
    // Dropping the orchestrator closes the bus and ends the printer.
    drop(orchestrator);
    let _ = printer.await;

    if !report.outcome.is_success() {
        bail!("{}: {}", report.outcome.display_label(), target.describe());
    }
    println!("Opened {}", target.describe());
    Ok(())
}

async fn print_progress(mut rx: broadcast::Receiver<Envelope>) {
    loop {
        match rx.recv().await {
            Ok(event) => render_event(&event),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn render_event(event: &Envelope) {
    match event.kind.as_str() {
        kinds::SWITCH_STARTED | kinds::SWITCH_COMPLETED => {}
        kinds::SWITCH_BUSY => eprintln!("  a switch is already in progress"),
        _ => {
            let field = |key: &str| event.payload[key].as_str().unwrap_or("?").to_string();
            let status = event.payload["outcome"]["status"]
                .as_str()
                .unwrap_or("?")
                .to_string();
            let error = event.payload["outcome"]["error"]
                .as_str()
                .map(|e| format!(" ({e})"))
                .unwrap_or_default();
            eprintln!(
                "  {:<16} {:<9} {}{}",
                field("stage"),
                field("strategy"),
                status,
                error
            );
        }
    }
}
