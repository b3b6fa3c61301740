//! Application configuration
//!
//! Every setting can be given as a command-line flag or an environment variable; a `.env` file
//! in the working directory is read first.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use biuty::prelude::{
    CouponBook, CouponBookError, MoneyParseError, PricingRules, ShippingPolicy,
    ShippingPolicyError, currency_from_code, parse_amount,
};
use clap::Args;
use thiserror::Error;
use tracing::debug;

use crate::config::{logging::LoggingConfig, pricing::PricingConfig, storage::StorageConfig};

pub mod logging;
pub mod pricing;
pub mod storage;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid amount or currency in pricing settings")]
    Money(#[from] MoneyParseError),

    #[error("invalid shipping policy")]
    Shipping(#[from] ShippingPolicyError),

    #[error("invalid coupon book")]
    Coupons(#[from] CouponBookError),

    #[error("could not read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Biuty configuration shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Shipping and coupon settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Cart, catalog and media locations.
    #[command(flatten)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load `.env` into the process environment, if present.
    pub fn load_dotenv() {
        _ = dotenvy::dotenv();
    }

    /// Build the pricing rules these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency or an amount doesn't parse, the shipping policy is
    /// inconsistent, or the coupon book can't be read.
    pub fn rules(&self) -> Result<PricingRules, ConfigError> {
        let pricing = &self.pricing;
        let currency = currency_from_code(&pricing.currency)?;

        let shipping = ShippingPolicy::new(
            parse_amount(&pricing.free_shipping_threshold, currency)?,
            parse_amount(&pricing.shipping_fee, currency)?,
        )?;

        let coupons = match &pricing.coupons_file {
            Some(path) => {
                let yaml = read(path)?;

                CouponBook::from_yaml(&yaml, currency)?
            }
            None => CouponBook::defaults(currency)?,
        };

        debug!(
            currency = currency.iso_alpha_code,
            coupons = coupons.len(),
            "pricing rules loaded"
        );

        Ok(PricingRules::new(shipping, coupons))
    }
}

/// Read a settings file to a string.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] naming the path on failure.
pub fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
