use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vitrine", version, about = "Render a portfolio page backed by object storage media")]
#[command(after_help = concat!(
    "Environment:\n",
    "  VITRINE_*   Override config values (nest with __, e.g. VITRINE_STORAGE__BUCKET)\n",
    "  RUST_LOG    Log filter (default: info)",
))]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to vitrine.toml in the user config directory.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// More logging; repeat for trace output.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and print every asset in the namespace.
    List,
    /// Load assets and show which one each slot displays.
    Slots,
    /// Render the page once loading has settled.
    Render {
        /// Write to this file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
