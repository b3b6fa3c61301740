use biuty_app::{
    context::AppContext,
    domain::products::models::{Product, ProductFilters, ProductSort},
};
use clap::{Args, Subcommand, ValueEnum};
use rusty_money::{Money, iso::Currency};

use crate::cli::report;

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List products, optionally filtered
    List(ListArgs),

    /// Search products by name, description or category
    Search {
        /// Words to look for
        query: String,
    },

    /// Show one product
    Show {
        /// Product slug
        slug: String,
    },

    /// Featured products, new arrivals and best sellers
    Highlights {
        /// How many products per section
        #[arg(long, default_value_t = 4)]
        limit: usize,
    },
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Only products in this category
    #[arg(long)]
    category: Option<String>,

    /// Listing order
    #[arg(long, value_enum, default_value_t = SortArg::Newest)]
    sort: SortArg,

    /// Hide products that are sold out
    #[arg(long)]
    in_stock: bool,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Products per page
    #[arg(long, default_value_t = 12)]
    page_size: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
    BestSelling,
}

impl From<SortArg> for ProductSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Newest => Self::Newest,
            SortArg::PriceAsc => Self::PriceAscending,
            SortArg::PriceDesc => Self::PriceDescending,
            SortArg::Name => Self::Name,
            SortArg::BestSelling => Self::BestSelling,
        }
    }
}

pub(crate) async fn run(context: &AppContext, command: CatalogCommand) -> Result<(), String> {
    let currency = context.rules.currency();
    let products = &context.products;

    match command.command {
        CatalogSubcommand::List(args) => {
            let filters = ProductFilters {
                category: args.category,
                in_stock_only: args.in_stock,
                sort: args.sort.into(),
                ..ProductFilters::default()
            };

            let page = products
                .list(filters, args.page, args.page_size)
                .await
                .map_err(|error| format!("failed to list products: {}", report(&error)))?;

            for product in &page.items {
                print_row(product, currency);
            }

            println!(
                "page {} of {} ({} products)",
                page.page,
                page.total_pages().max(1),
                page.total
            );
        }
        CatalogSubcommand::Search { query } => {
            let found = products
                .search(&query)
                .await
                .map_err(|error| format!("search failed: {}", report(&error)))?;

            if found.is_empty() {
                println!("no products match \"{query}\"");
            }

            for product in &found {
                print_row(product, currency);
            }
        }
        CatalogSubcommand::Show { slug } => {
            let product = products
                .get_by_slug(&slug)
                .await
                .map_err(|error| format!("{slug}: {}", report(&error)))?;

            print_details(&product, currency);
        }
        CatalogSubcommand::Highlights { limit } => {
            let sections = [
                ("Featured", products.featured(limit).await),
                ("New arrivals", products.new_arrivals(limit).await),
                ("Best sellers", products.best_sellers(limit).await),
            ];

            for (title, section) in sections {
                let section = section
                    .map_err(|error| format!("failed to load {title}: {}", report(&error)))?;

                println!("{title}");

                for product in &section {
                    print_row(product, currency);
                }

                println!();
            }
        }
    }

    Ok(())
}

pub(crate) fn format_minor(minor: u64, currency: &'static Currency) -> String {
    i64::try_from(minor).map_or_else(
        |_| format!("{minor} {}", currency.iso_alpha_code),
        |minor| Money::from_minor(minor, currency).to_string(),
    )
}

fn print_row(product: &Product, currency: &'static Currency) {
    let stock = if product.in_stock() { "" } else { "  (sold out)" };

    println!(
        "{:<40} {:>12}  {}{stock}",
        product.name,
        format_minor(product.price, currency),
        product.slug
    );
}

fn print_details(product: &Product, currency: &'static Currency) {
    println!("{}", product.name);
    println!("slug: {}", product.slug);
    println!("category: {}", product.category);

    match product.compare_at_price {
        Some(was) => println!(
            "price: {} (was {})",
            format_minor(product.price, currency),
            format_minor(was, currency)
        ),
        None => println!("price: {}", format_minor(product.price, currency)),
    }

    println!("stock: {}", product.stock);

    if !product.variants.is_empty() {
        let names: Vec<&str> = product.variants.iter().map(|v| v.name.as_str()).collect();

        println!("variants: {}", names.join(", "));
    }

    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}
