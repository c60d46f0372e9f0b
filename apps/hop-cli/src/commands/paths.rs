use anyhow::Result;
use clap::Args;
use hop_core::effective_paths;

#[derive(Args)]
pub struct PathsArgs {
    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: PathsArgs) -> Result<()> {
    let v = effective_paths();
    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&v)?);
    } else {
        println!("{}", v);
    }
    Ok(())
}
