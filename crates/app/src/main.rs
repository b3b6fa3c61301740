//! Biuty Storefront CLI

use std::process;

use biuty_app::{config::AppConfig, observability};
use clap::Parser;

mod cli;

#[tokio::main]
pub async fn main() {
    AppConfig::load_dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = observability::init_subscriber(cli.logging()) {
        eprintln!("{}", cli::report(&error));
        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        eprintln!("{error}");
        process::exit(1);
    }
}
