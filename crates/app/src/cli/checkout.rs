use biuty_app::{context::AppContext, domain::orders::models::Customer};
use clap::Args;
use rusty_money::Money;

use crate::cli::{cart::print_summary, report};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Customer full name
    #[arg(long)]
    name: String,

    /// Customer email address
    #[arg(long)]
    email: String,

    /// Delivery address
    #[arg(long)]
    address: String,
}

pub(crate) async fn run(context: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let mut session = context.open_cart().await;

    print_summary(&session)?;

    let order = context
        .checkout
        .place_order(
            &mut session,
            Customer {
                name: args.name,
                email: args.email,
                address: args.address,
            },
        )
        .await
        .map_err(|error| format!("checkout failed: {}", report(&error)))?;

    let currency = context.rules.currency();

    println!();
    println!("order_number: {}", order.number);
    println!("order_status: {}", order.status);
    println!("order_total: {}", Money::from_minor(order.total, currency));
    println!("thank you, {}!", order.customer.name);

    Ok(())
}
