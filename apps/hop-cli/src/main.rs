use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use hop_core::Settings;

mod adapters;
mod commands;

use commands::{ConfigCmd, OtpCmd, PathsArgs, TabsCmd};

#[derive(Parser)]
#[command(
    name = "hop",
    version,
    about = "Jump to one-time codes and browser tabs by alias"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print effective config/state/logs paths (JSON)
    Paths(PathsArgs),
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
    /// One-time codes from 1Password references
    Otp {
        #[command(subcommand)]
        cmd: OtpCmd,
    },
    /// Workspace tab shortcuts
    Tabs {
        #[command(subcommand)]
        cmd: TabsCmd,
    },
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
struct CompletionsArgs {
    /// Target shell (bash, zsh, fish, powershell, elvish)
    shell: clap_complete::Shell,
    /// Output directory (writes a file). If not set, prints to stdout.
    #[arg(long)]
    out_dir: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    hop_otel::init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli.command).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Paths(args) => commands::paths::run(args),
        Commands::Config { cmd } => commands::config::run(cmd),
        Commands::Otp { cmd } => {
            let settings = Settings::load()?;
            commands::otp::run(cmd, &settings).await
        }
        Commands::Tabs { cmd } => {
            let settings = Settings::load()?;
            commands::tabs::run(cmd, &settings).await
        }
        Commands::Completions(args) => cmd_completions(args.shell, args.out_dir.as_deref()),
    }
}

fn cmd_completions(shell: clap_complete::Shell, out_dir: Option<&str>) -> Result<()> {
    use clap_complete::{generate, generate_to};
    use std::io::stdout;
    let mut cmd = Cli::command();
    let bin = "hop";
    if let Some(dir) = out_dir {
        let dir_path = std::path::Path::new(dir);
        std::fs::create_dir_all(dir_path)?;
        let path = generate_to(shell, &mut cmd, bin, dir_path)?;
        eprintln!("Wrote {}", path.display());
    } else {
        generate(shell, &mut cmd, bin, &mut stdout());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
