#[macro_use]
mod utils;

mod announce;
mod cli;
mod clock;
mod config;
mod countdown;
mod location;
mod models;
mod prayer_times;
mod signals;

use anyhow::Result;
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::default_path()?,
    };

    match cli.command {
        Some(Commands::Setup { reset }) => handlers::handle_setup(&config_path, reset),
        Some(Commands::Times) => handlers::handle_times(&config_path),
        // No subcommand → run the countdown
        None => handlers::handle_run(&config_path),
    }
}
