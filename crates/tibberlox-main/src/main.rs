// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tibberlox.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Tibberlox - hourly Tibber price snapshot sender

mod cli;
mod config;
mod sender;

use anyhow::{Context, Result};
use clap::Parser;
use tibberlox_core::{PriceFeed, SnapshotCycle};
use tibberlox_tibber::{TibberClient, TibberHome};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, Commands, RunArgs};
use crate::config::AppConfig;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --log
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&cli.log))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {e}");
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Homes) => list_homes(&config),
        Some(Commands::Run(args)) => {
            args.apply(&mut config.snapshot);
            run_cycle(&config, &args)
        }
        None => run_cycle(&config, &RunArgs::default()),
    }
}

fn list_homes(config: &AppConfig) -> Result<()> {
    config.validate_credentials()?;
    let client = TibberClient::new(&config.token)?;

    let homes = client.homes().context("Failed to list homes")?;
    if homes.is_empty() {
        warn!("Account has no homes");
    }
    for home in &homes {
        println!("home_id {}: {} ({})", home.index, home.address, home.id);
    }
    Ok(())
}

fn run_cycle(config: &AppConfig, args: &RunArgs) -> Result<()> {
    config.validate()?;

    let client = TibberClient::new(&config.token)?;
    let feed = TibberHome::new(client, config.home_id);
    info!(
        "🚀 Starting price cycle for {} ({} destination(s))",
        feed.name(),
        config.destinations.len()
    );

    let cycle = SnapshotCycle::new(config.snapshot.clone());
    let snapshot = cycle.run(&feed).context("Price cycle failed")?;

    let invalid = config.snapshot.invalid_data_value;
    debug!("Datagram:\n{}", snapshot.to_datagram(invalid, true));

    if args.dry_run {
        println!("{}", snapshot.to_datagram(invalid, true));
        info!("Dry run, nothing sent");
        return Ok(());
    }

    let payload = snapshot.to_datagram(invalid, false);
    let report = sender::send_snapshot(&config.destinations, &payload)?;
    info!(
        "✅ Cycle finished: {} key(s), sent to {}, failed {}",
        snapshot.len(),
        report.sent,
        report.failed
    );
    if report.all_failed() {
        warn!("Datagram could not be delivered to any destination");
    }
    Ok(())
}
