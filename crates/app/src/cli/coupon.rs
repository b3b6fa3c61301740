use biuty_app::context::AppContext;
use clap::{Args, Subcommand};

use crate::cli::cart::print_summary;

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    /// Apply a coupon code, replacing any coupon already applied
    Apply {
        /// Coupon code, in any case
        code: String,
    },

    /// Remove the applied coupon
    Remove,
}

pub(crate) async fn run(context: &AppContext, command: CouponCommand) -> Result<(), String> {
    let mut session = context.open_cart().await;

    match command.command {
        CouponSubcommand::Apply { code } => {
            println!("{}", session.apply_coupon(&code).await.message());
        }
        CouponSubcommand::Remove => match session.remove_coupon().await {
            Some(coupon) => println!("Coupon {} removed.", coupon.code()),
            None => println!("No coupon applied."),
        },
    }

    print_summary(&session)
}
