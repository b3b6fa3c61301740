//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Where carts, the catalog and media live.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// JSON file the cart is saved to between runs
    #[arg(long, env = "BIUTY_CART_FILE", default_value = ".biuty/cart.json", global = true)]
    pub cart_file: PathBuf,

    /// YAML catalog to load; the bundled catalog is used when omitted
    #[arg(long, env = "BIUTY_CATALOG_FILE", global = true)]
    pub catalog_file: Option<PathBuf>,

    /// Base URL uploaded images are served from
    #[arg(
        long,
        env = "BIUTY_MEDIA_BASE_URL",
        default_value = "https://media.biuty.local",
        global = true
    )]
    pub media_base_url: String,
}
