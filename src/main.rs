//! Bus Route Desk - dispatcher console for bus routing solutions
//!
//! Loads stops and solutions from the optimization service, lets the
//! dispatcher edit and lock routes, and re-optimizes around the locks.

mod cli;
mod config;
mod defaults;
mod handlers;
mod services;
mod shell;
mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::handlers::{AppContext, Driver, Event};
use crate::services::map::HeadlessMap;
use crate::services::optimizer::{create_optimization_service, OptimizationService};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs directory - use LOGS_DIR env var or default to ./logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "./logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "bus-route-desk.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Console output stays on stderr so command output can be piped
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,bus_route_desk=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!("Starting Bus Route Desk...");

    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    let mut params = config.params();
    cli.apply_to(&mut params);

    let service: Arc<dyn OptimizationService> = Arc::from(
        create_optimization_service(config.optimizer()).context("Failed to create optimizer client")?,
    );
    match &config.optimizer_url {
        Some(url) => info!("Optimizer at {}", url),
        None => info!("OPTIMIZER_URL not set, using demo optimizer"),
    }

    let ctx = AppContext::new(HeadlessMap::default(), params, config.depot_rule());
    let mut driver = Driver::new(ctx, service);

    match cli.command.unwrap_or(Command::Shell) {
        Command::Stops => {
            run_once(&mut driver, Event::LoadStops).await;
            for stop in &driver.context().baseline {
                println!(
                    "{:<10} {:<28} demand {:>3}  ({:.6}, {:.6})",
                    stop.id, stop.name, stop.demand, stop.lat, stop.lon
                );
            }
        }
        Command::Optimize => {
            run_once(&mut driver, Event::Optimize).await;
            if driver.context().solution.is_some() {
                run_once(&mut driver, Event::ShowSolution).await;
            }
        }
        Command::Shell => shell::run(&mut driver).await?,
    }

    Ok(())
}

async fn run_once(driver: &mut Driver<HeadlessMap>, event: Event) {
    for notice in driver.handle(event).await {
        shell::print_notice(&notice);
    }
}
