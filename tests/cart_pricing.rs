//! Integration tests for cart pricing: coupons, shipping and totals.

use std::sync::Arc;

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::BRL};
use testresult::TestResult;

use biuty::prelude::*;

fn default_rules() -> Result<Arc<PricingRules>, CouponBookError> {
    Ok(Arc::new(PricingRules::defaults()?))
}

/// Free shipping only above R$200, as the cart page used to charge it.
fn storefront_page_rules() -> TestResult<Arc<PricingRules>> {
    let shipping = ShippingPolicy::new(
        Money::from_minor(200_00, BRL),
        Money::from_minor(10_00, BRL),
    )?;

    Ok(Arc::new(PricingRules::new(shipping, CouponBook::defaults(BRL)?)))
}

fn product(name: &str, price: &str) -> TestResult<Product> {
    Ok(Product::new(
        ProductId::new(),
        name,
        name.to_lowercase().replace(' ', "-"),
        parse_price(price)?,
    ))
}

#[test]
fn repeated_adds_of_same_variant_collapse_into_one_line() -> TestResult {
    let mut cart = Cart::new(default_rules()?);
    let serum = product("Serum Vitamina C", "149.90 BRL")?;
    let shade = Some(VariantId::new());

    let quantities = [1, 3, 2, 5, 1];

    for quantity in quantities {
        cart.add_line(&serum, quantity, shade)?;
    }

    assert_eq!(cart.len(), 1);
    assert_eq!(
        cart.lines().first().map(CartLine::quantity),
        Some(12),
        "quantity should be the sum of every add"
    );

    Ok(())
}

#[test]
fn set_quantity_zero_matches_remove_line() -> TestResult {
    let rules = default_rules()?;
    let serum = product("Serum", "149.90 BRL")?;
    let balm = product("Balm", "39.90 BRL")?;

    let mut removed = Cart::new(Arc::clone(&rules));
    removed.add_line(&balm, 1, None)?;
    let line = removed.add_line(&serum, 2, None)?;

    let mut zeroed = removed.clone();

    removed.remove_line(line);
    zeroed.set_quantity(line, 0)?;

    assert_eq!(removed.lines(), zeroed.lines());
    assert_eq!(removed.summary()?, zeroed.summary()?);

    Ok(())
}

#[test]
fn total_is_never_negative() -> TestResult {
    let rules = default_rules()?;
    let prices = ["0.00 BRL", "0.01 BRL", "5.00 BRL", "19.99 BRL", "20.00 BRL", "250.00 BRL"];
    let coupons = [None, Some("BIUTY10"), Some("BIUTY15"), Some("BEMVINDO20")];

    for price in prices {
        for coupon in coupons {
            let mut cart = Cart::new(Arc::clone(&rules));

            cart.add_line(&product("Item", price)?, 1, None)?;

            if let Some(code) = coupon {
                cart.apply_coupon(code);
            }

            let summary = cart.summary()?;

            assert!(
                summary.total.to_minor_units() >= 0,
                "negative total for {price} with {coupon:?}"
            );
            assert!(
                summary.discount.to_minor_units() <= summary.subtotal.to_minor_units(),
                "discount above subtotal for {price} with {coupon:?}"
            );
        }
    }

    Ok(())
}

#[test]
fn percentage_coupon_takes_percentage_of_subtotal() -> TestResult {
    let mut book = CouponBook::new(BRL);
    book.insert(Coupon::percentage("QUARTO", Percentage::from(0.25))?)?;

    let rules = Arc::new(PricingRules::new(ShippingPolicy::default(), book));
    let mut cart = Cart::new(rules);

    cart.add_line(&product("Kit", "80.00 BRL")?, 1, None)?;
    cart.apply_coupon("quarto");

    let summary = cart.summary()?;

    assert_eq!(summary.discount, Money::from_minor(20_00, BRL));
    assert_eq!(summary.total, Money::from_minor(70_00, BRL));

    Ok(())
}

#[test]
fn fixed_coupon_takes_smaller_of_value_and_subtotal() -> TestResult {
    let rules = default_rules()?;

    let mut small = Cart::new(Arc::clone(&rules));
    small.add_line(&product("Mini", "12.00 BRL")?, 1, None)?;
    small.apply_coupon("BEMVINDO20");

    let mut large = Cart::new(rules);
    large.add_line(&product("Kit", "60.00 BRL")?, 1, None)?;
    large.apply_coupon("BEMVINDO20");

    assert_eq!(small.summary()?.discount, Money::from_minor(12_00, BRL));
    assert_eq!(large.summary()?.discount, Money::from_minor(20_00, BRL));

    Ok(())
}

#[test]
fn shipping_is_free_only_above_threshold() -> TestResult {
    let rules = default_rules()?;

    let mut under = Cart::new(Arc::clone(&rules));
    under.add_line(&product("Balm", "50.00 BRL")?, 2, None)?;

    let mut over = Cart::new(rules);
    over.add_line(&product("Balm", "50.00 BRL")?, 2, None)?;
    over.add_line(&product("Lip", "0.01 BRL")?, 1, None)?;

    assert_eq!(under.summary()?.shipping, Money::from_minor(10_00, BRL));
    assert_eq!(over.summary()?.shipping, Money::from_minor(0, BRL));

    Ok(())
}

#[test]
fn single_serum_pays_flat_shipping() -> TestResult {
    let mut cart = Cart::new(storefront_page_rules()?);

    cart.add_line(&product("Serum", "149.90 BRL")?, 1, None)?;

    let summary = cart.summary()?;

    assert_eq!(summary.subtotal, Money::from_minor(149_90, BRL));
    assert_eq!(summary.shipping, Money::from_minor(10_00, BRL));
    assert_eq!(summary.total, Money::from_minor(159_90, BRL));

    Ok(())
}

#[test]
fn single_serum_with_biuty10() -> TestResult {
    let mut cart = Cart::new(storefront_page_rules()?);

    cart.add_line(&product("Serum", "149.90 BRL")?, 1, None)?;

    let outcome = cart.apply_coupon("BIUTY10");
    let summary = cart.summary()?;

    assert!(outcome.is_applied(), "{}", outcome.message());
    assert_eq!(summary.discount, Money::from_minor(14_99, BRL));
    assert_eq!(summary.total, Money::from_minor(144_91, BRL));

    Ok(())
}

#[test]
fn two_lines_over_threshold_ship_free() -> TestResult {
    let mut cart = Cart::new(default_rules()?);

    cart.add_line(&product("Serum", "80.00 BRL")?, 1, None)?;
    cart.add_line(&product("Balm", "40.00 BRL")?, 1, None)?;

    let summary = cart.summary()?;

    assert_eq!(summary.subtotal, Money::from_minor(120_00, BRL));
    assert_eq!(summary.shipping, Money::from_minor(0, BRL));
    assert_eq!(summary.total, Money::from_minor(120_00, BRL));
    assert_eq!(summary.item_count, 2);

    Ok(())
}

#[test]
fn invalid_coupon_is_declined_not_an_error() -> TestResult {
    let mut cart = Cart::new(default_rules()?);

    cart.add_line(&product("Serum", "149.90 BRL")?, 1, None)?;

    let outcome = cart.apply_coupon("GRATIS100");

    assert!(!outcome.is_applied());
    assert_eq!(outcome.message(), "Coupon GRATIS100 is not valid.");
    assert_eq!(cart.summary()?.discount, Money::from_minor(0, BRL));

    Ok(())
}

#[test]
fn coupon_book_loads_from_yaml() -> TestResult {
    let yaml = "coupons:\n  BIUTY10: \"10%\"\n  FRETEGRATIS: \"10.00 BRL\"\n";
    let rules = Arc::new(PricingRules::new(
        ShippingPolicy::default(),
        CouponBook::from_yaml(yaml, BRL)?,
    ));

    let mut cart = Cart::new(rules);

    cart.add_line(&product("Balm", "39.90 BRL")?, 1, None)?;
    cart.apply_coupon("fretegratis");

    let summary = cart.summary()?;

    assert_eq!(summary.discount, Money::from_minor(10_00, BRL));
    assert_eq!(summary.total, Money::from_minor(39_90, BRL));

    Ok(())
}
