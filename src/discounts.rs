//! Discount arithmetic
//!
//! Coupon discounts are worked out in minor units so a percentage of a subtotal always lands on a
//! whole cent.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

use crate::coupons::CouponDiscount;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Calculate a percentage of an amount in minor units, rounding half away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result overflows or cannot be represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Discount a coupon grants on a subtotal, in minor units.
///
/// The result never exceeds the subtotal and is never negative, so a discounted subtotal can't
/// drop below zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if a percentage discount can't be represented.
pub fn coupon_discount_minor(
    discount: &CouponDiscount,
    subtotal_minor: i64,
) -> Result<i64, DiscountError> {
    let subtotal_minor = subtotal_minor.max(0);

    let raw = match discount {
        CouponDiscount::Percentage(percent) => percent_of_minor(percent, subtotal_minor)?,
        CouponDiscount::Fixed(amount) => amount.to_minor_units(),
    };

    Ok(raw.clamp(0, subtotal_minor))
}
