//! Storefront flows across separate runs sharing one cart file.

use std::path::Path;

use biuty::prelude::CouponOutcome;
use biuty_app::{
    checkout::CheckoutError,
    config::{
        AppConfig,
        logging::{LogFormat, LoggingConfig},
        pricing::PricingConfig,
        storage::StorageConfig,
    },
    context::AppContext,
    domain::orders::models::Customer,
};
use testresult::TestResult;

fn config(cart_file: &Path, free_shipping_threshold: &str) -> AppConfig {
    AppConfig {
        logging: LoggingConfig {
            log_level: "warn".to_string(),
            log_format: LogFormat::Compact,
        },
        pricing: PricingConfig {
            currency: "BRL".to_string(),
            free_shipping_threshold: free_shipping_threshold.to_string(),
            shipping_fee: "10.00".to_string(),
            coupons_file: None,
        },
        storage: StorageConfig {
            cart_file: cart_file.to_path_buf(),
            catalog_file: None,
            media_base_url: "https://media.biuty.test".to_string(),
        },
    }
}

fn customer() -> Customer {
    Customer {
        name: "Ana Souza".to_string(),
        email: "ana@biuty.test".to_string(),
        address: "Rua das Flores, 42, São Paulo".to_string(),
    }
}

#[tokio::test]
async fn cart_saved_in_one_run_checks_out_in_the_next() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cart_file = dir.path().join("cart.json");
    let config = config(&cart_file, "200.00");

    {
        let context = AppContext::in_memory(&config).await?;
        let serum = context.products.get_by_slug("serum-vitamina-c").await?;
        let variant = serum.variant_named("30ml").map(|variant| variant.uuid);

        let mut session = context.open_cart().await;

        session
            .add_line(&serum.to_cart_product(context.rules.currency())?, 1, variant)
            .await?;

        let outcome = session.apply_coupon("biuty10").await;

        assert!(matches!(outcome, CouponOutcome::Applied(_)));
    }

    let context = AppContext::in_memory(&config).await?;
    let mut session = context.open_cart().await;

    assert_eq!(session.cart().item_count(), 1, "cart is restored from the file");

    let summary = session.summary()?;

    assert_eq!(summary.subtotal.to_minor_units(), 149_90);
    assert_eq!(summary.discount.to_minor_units(), 14_99);
    assert_eq!(summary.shipping.to_minor_units(), 10_00);
    assert_eq!(summary.total.to_minor_units(), 144_91);

    let order = context.checkout.place_order(&mut session, customer()).await?;

    assert_eq!(order.total, 144_91);
    assert_eq!(order.coupon_code.as_deref(), Some("BIUTY10"));
    assert!(session.cart().is_empty());
    assert!(context.cart_store.load().await?.is_none(), "saved cart is cleared");

    let serum = context.products.get_by_slug("serum-vitamina-c").await?;

    assert_eq!(serum.stock, 39);
    assert_eq!(serum.sales_count, 1);

    let orders = context.orders.list_for_customer("ANA@biuty.test").await?;

    assert_eq!(orders.len(), 1);

    Ok(())
}

#[tokio::test]
async fn default_policy_ships_free_above_one_hundred() -> TestResult {
    let dir = tempfile::tempdir()?;
    let context = AppContext::in_memory(&config(&dir.path().join("cart.json"), "100.00")).await?;
    let currency = context.rules.currency();

    let lipstick = context.products.get_by_slug("batom-matte-rosa-nude").await?;
    let sunscreen = context.products.get_by_slug("protetor-solar-fps-50").await?;
    let shade = sunscreen.variant_named("Sem cor").map(|variant| variant.uuid);

    let mut session = context.open_cart().await;

    session.add_line(&lipstick.to_cart_product(currency)?, 1, None).await?;
    session.add_line(&sunscreen.to_cart_product(currency)?, 1, shade).await?;

    let summary = session.summary()?;

    assert_eq!(summary.subtotal.to_minor_units(), 109_80);
    assert!(summary.has_free_shipping());
    assert_eq!(summary.total.to_minor_units(), 109_80);

    Ok(())
}

#[tokio::test]
async fn sold_out_product_cannot_be_ordered() -> TestResult {
    let dir = tempfile::tempdir()?;
    let context = AppContext::in_memory(&config(&dir.path().join("cart.json"), "100.00")).await?;

    let oil = context.products.get_by_slug("oleo-corporal-de-amendoas").await?;
    let mut session = context.open_cart().await;

    session
        .add_line(&oil.to_cart_product(context.rules.currency())?, 1, None)
        .await?;

    let result = context.checkout.place_order(&mut session, customer()).await;

    assert!(matches!(result, Err(CheckoutError::OutOfStock { available: 0, .. })));
    assert_eq!(session.cart().len(), 1);

    Ok(())
}

#[tokio::test]
async fn corrupt_cart_file_opens_an_empty_cart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cart_file = dir.path().join("cart.json");

    std::fs::write(&cart_file, "{ not json")?;

    let context = AppContext::in_memory(&config(&cart_file, "100.00")).await?;
    let session = context.open_cart().await;

    assert!(session.cart().is_empty());
    assert!(context.cart_store.load().await.is_err(), "file is left for inspection");

    Ok(())
}
