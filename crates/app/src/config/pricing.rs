//! Pricing Config

use std::path::PathBuf;

use clap::Args;

/// Shipping and coupon settings.
#[derive(Debug, Args)]
pub struct PricingConfig {
    /// ISO code of the store currency
    #[arg(long, env = "BIUTY_CURRENCY", default_value = "BRL", global = true)]
    pub currency: String,

    /// Subtotals above this amount ship free
    #[arg(
        long,
        env = "BIUTY_FREE_SHIPPING_THRESHOLD",
        default_value = "100.00",
        global = true
    )]
    pub free_shipping_threshold: String,

    /// Flat shipping fee below the threshold
    #[arg(long, env = "BIUTY_SHIPPING_FEE", default_value = "10.00", global = true)]
    pub shipping_fee: String,

    /// YAML coupon book; the built-in coupons are used when omitted
    #[arg(long, env = "BIUTY_COUPONS_FILE", global = true)]
    pub coupons_file: Option<PathBuf>,
}
