//! Biuty prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError, CartLine, LineId, LineKey,
        snapshot::{CartSnapshot, LineSnapshot, SnapshotError},
    },
    coupons::{
        Coupon, CouponBook, CouponBookError, CouponDiscount, CouponOutcome, DeclineReason,
        DiscountKind,
    },
    money::{MoneyParseError, Price, currency_from_code, parse_amount, parse_price},
    pricing::{PricingError, PricingRules},
    products::{Product, ProductId, VariantId},
    shipping::{ShippingPolicy, ShippingPolicyError},
    summary::{CartSummary, SummaryError},
    uuids::TypedUuid,
};
