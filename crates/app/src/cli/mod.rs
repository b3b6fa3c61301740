use std::error::Error;

use biuty_app::{
    config::{AppConfig, logging::LoggingConfig},
    context::AppContext,
};
use clap::{Parser, Subcommand};

mod cart;
mod catalog;
mod checkout;
mod coupon;

#[derive(Debug, Parser)]
#[command(name = "biuty", about = "Biuty storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog(catalog::CatalogCommand),

    /// Show or change the cart
    Cart(cart::CartCommand),

    /// Apply or remove a discount coupon
    Coupon(coupon::CouponCommand),

    /// Place an order for the cart
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    pub(crate) fn logging(&self) -> &LoggingConfig {
        &self.config.logging
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let context = AppContext::in_memory(&self.config)
            .await
            .map_err(|error| format!("failed to start: {}", report(&error)))?;

        match self.command {
            Commands::Catalog(command) => catalog::run(&context, command).await,
            Commands::Cart(command) => cart::run(&context, command).await,
            Commands::Coupon(command) => coupon::run(&context, command).await,
            Commands::Checkout(args) => checkout::run(&context, args).await,
        }
    }
}

/// Render an error with its chain of causes.
pub(crate) fn report(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
