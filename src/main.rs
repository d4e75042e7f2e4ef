// yapt/src/main.rs
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use std::time::Instant;
use yapt::{format_file_size, Action, ActionEngine, Cli, FileCatalog};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let config = cli.to_config();
    let action = Action::from(cli.action);

    println!("loading {} ...", cli.source.display());
    let started = Instant::now();
    let catalog = FileCatalog::discover(&cli.source, config.recursive)
        .with_context(|| format!("Cannot scan {}", cli.source.display()))?;
    println!(
        "{} File(s) {} in {:.2?}",
        catalog.count(),
        format_file_size(catalog.total_size()),
        started.elapsed()
    );

    let engine = ActionEngine::new(config);
    let started = Instant::now();
    let state = engine
        .process(action, &catalog)
        .with_context(|| format!("{} failed", action))?;

    println!("{}", state.title());
    print!("{}", state.summary());
    println!("Done in {:.2?}", started.elapsed());

    Ok(())
}
