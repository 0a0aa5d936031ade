//! CLI argument parsing for the bus-route-desk binary.

use clap::{Parser, Subcommand};

use crate::types::OptimizeParams;

#[derive(Parser)]
#[command(name = "bus-route-desk", about = "Review, lock and re-optimize bus routes")]
pub struct Cli {
    /// Data set to load stops from
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Solver time limit in seconds
    #[arg(long, global = true)]
    pub time_limit: Option<u64>,

    /// Seats per bus
    #[arg(long, global = true)]
    pub capacity: Option<u32>,

    /// Dwell time per stop in minutes
    #[arg(long, global = true)]
    pub service_time: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every stop of the data set and exit
    Stops,
    /// Run one optimization, print the routes and exit
    Optimize,
    /// Start the interactive console (default if no subcommand given)
    Shell,
}

impl Cli {
    /// Override configured defaults with the flags that were given
    pub fn apply_to(&self, params: &mut OptimizeParams) {
        if let Some(db) = &self.db {
            params.db_name = db.clone();
        }
        if let Some(time_limit) = self.time_limit {
            params.time_limit = time_limit;
        }
        if let Some(capacity) = self.capacity {
            params.capacity = capacity;
        }
        if let Some(service_time) = self.service_time {
            params.service_time = service_time;
        }
    }
}
