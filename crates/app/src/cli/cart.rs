use std::io;

use biuty::prelude::LineId;
use biuty_app::{carts::CartSession, context::AppContext};
use clap::{Args, Subcommand};

use crate::cli::report;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart and its totals
    Show,

    /// Add a product to the cart
    Add {
        /// Product slug
        slug: String,

        /// How many units to add
        #[arg(long, short, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,

        /// Variant name, for products sold in shades or sizes
        #[arg(long, short)]
        variant: Option<String>,
    },

    /// Change a line's quantity; zero removes it
    Set {
        /// Line number as shown by `cart show`
        line: usize,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Add one unit to a line
    Increment {
        /// Line number as shown by `cart show`
        line: usize,
    },

    /// Take one unit off a line
    Decrement {
        /// Line number as shown by `cart show`
        line: usize,
    },

    /// Remove a line
    Remove {
        /// Line number as shown by `cart show`
        line: usize,
    },

    /// Empty the cart
    Clear,
}

pub(crate) async fn run(context: &AppContext, command: CartCommand) -> Result<(), String> {
    let mut session = context.open_cart().await;

    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add {
            slug,
            quantity,
            variant,
        } => {
            let product = context
                .products
                .get_by_slug(&slug)
                .await
                .map_err(|error| format!("{slug}: {}", report(&error)))?;

            let variant = match (variant, product.variants.is_empty()) {
                (Some(name), _) => Some(
                    product
                        .variant_named(&name)
                        .map(|variant| variant.uuid)
                        .ok_or_else(|| format!("{} has no variant named {name}", product.name))?,
                ),
                (None, true) => None,
                (None, false) => {
                    let names: Vec<&str> =
                        product.variants.iter().map(|v| v.name.as_str()).collect();

                    return Err(format!("choose a variant with --variant: {}", names.join(", ")));
                }
            };

            let cart_product = product
                .to_cart_product(context.rules.currency())
                .map_err(|error| format!("{slug}: {}", report(&error)))?;

            session
                .add_line(&cart_product, quantity, variant)
                .await
                .map_err(|error| report(&error))?;
        }
        CartSubcommand::Set { line, quantity } => {
            let line = line_at(&session, line)?;

            session
                .set_quantity(line, quantity)
                .await
                .map_err(|error| report(&error))?;
        }
        CartSubcommand::Increment { line } => {
            let line = line_at(&session, line)?;

            session.increment(line).await.map_err(|error| report(&error))?;
        }
        CartSubcommand::Decrement { line } => {
            let line = line_at(&session, line)?;

            session.decrement(line).await.map_err(|error| report(&error))?;
        }
        CartSubcommand::Remove { line } => {
            let line = line_at(&session, line)?;

            session.remove_line(line).await;
        }
        CartSubcommand::Clear => session.clear().await,
    }

    print_summary(&session)
}

/// Resolve a 1-based line number from the cart table.
fn line_at(session: &CartSession, position: usize) -> Result<LineId, String> {
    position
        .checked_sub(1)
        .and_then(|index| session.cart().lines().get(index))
        .map(|line| line.id())
        .ok_or_else(|| format!("the cart has no line {position}"))
}

pub(crate) fn print_summary(session: &CartSession) -> Result<(), String> {
    if session.cart().is_empty() {
        println!("Your cart is empty.");

        return Ok(());
    }

    let summary = session.summary().map_err(|error| report(&error))?;

    summary
        .write_to(io::stdout().lock(), session.cart())
        .map_err(|error| format!("failed to print the cart: {}", report(&error)))
}
