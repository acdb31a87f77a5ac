mod cli;
mod commands;
mod error;
mod store;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::io::Write;
use tracing_subscriber::EnvFilter;
use vitrine_config::Config;
use vitrine_page::Page;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli).await.map_err(|err| miette::miette!("{err:?}"))
}

/// `RUST_LOG` decides unless `-v` was given; defaults to `info`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(namespace = %config.namespace, "Configuration loaded");
    let store = store::connect(&config.storage)?;
    let slots = config.slot_map().or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::List => commands::list(&*store, &config.namespace, &mut std::io::stdout().lock()).await,
        Command::Slots => commands::slots(&*store, &config.namespace, &slots, &mut std::io::stdout().lock()).await,
        Command::Render { output } => {
            let profile = config.page.profile.clone();
            let page = match &config.page.template {
                Some(path) => Page::from_template_file(profile, path),
                None => Page::new(profile),
            }
            .or_raise(|| ErrorKind::Render)?;
            let mut html = Vec::new();
            commands::render(store, &config.namespace, &page, &slots, &mut html).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, html).await.or_raise(|| ErrorKind::Output)?;
                    tracing::info!(path = %path.display(), "Page written");
                    Ok(())
                },
                None => std::io::stdout().write_all(&html).or_raise(|| ErrorKind::Output),
            }
        },
    }
}
