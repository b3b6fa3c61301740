//! Coupons
//!
//! A coupon book is a small fixed set of discount codes. Looking a code up never fails with an
//! error: unknown or unusable codes produce a [`CouponOutcome::Declined`] with a reason the
//! storefront can show as-is.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::money::{MoneyParseError, Price, parse_price};

/// Errors raised while building a coupon book.
#[derive(Debug, Error)]
pub enum CouponBookError {
    /// The coupon code is empty once trimmed.
    #[error("coupon code cannot be blank")]
    BlankCode,

    /// A percentage outside 0%..=100%.
    #[error("coupon {0}: percentage must be between 0% and 100%")]
    PercentageOutOfRange(String),

    /// A fixed discount below zero.
    #[error("coupon {0}: fixed discount cannot be negative")]
    NegativeAmount(String),

    /// A percentage that couldn't be parsed.
    #[error("coupon {0}: invalid percentage {1}")]
    InvalidPercentage(String, String),

    /// A fixed amount that couldn't be parsed.
    #[error("coupon {0}: {1}")]
    InvalidAmount(String, #[source] MoneyParseError),

    /// A fixed amount in a different currency from the book.
    #[error("coupon {code}: amount is in {found}, but the coupon book is in {expected}")]
    CurrencyMismatch {
        /// Coupon code
        code: String,
        /// Book currency
        expected: &'static str,
        /// Amount currency
        found: &'static str,
    },

    /// YAML parsing error
    #[error("failed to parse coupon book: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Whether a coupon takes a percentage or a fixed amount off.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DiscountKind {
    /// A percentage of the subtotal
    Percentage,

    /// A fixed amount, capped at the subtotal
    Fixed,
}

/// The discount a coupon grants.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CouponDiscount {
    /// Take a percentage off the subtotal (e.g. "10% off").
    Percentage(Percentage),

    /// Take a fixed amount off the subtotal (e.g. "R$20 off").
    Fixed(Price),
}

impl CouponDiscount {
    /// Kind of discount.
    pub fn kind(&self) -> DiscountKind {
        match self {
            Self::Percentage(_) => DiscountKind::Percentage,
            Self::Fixed(_) => DiscountKind::Fixed,
        }
    }
}

impl fmt::Display for CouponDiscount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage(percent) => {
                write!(
                    f,
                    "{}% off",
                    ((*percent) * Decimal::ONE_HUNDRED).round_dp(2).normalize()
                )
            }
            Self::Fixed(amount) => write!(f, "{amount} off"),
        }
    }
}

/// A discount code.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    code: String,
    discount: CouponDiscount,
}

impl Coupon {
    /// Create a percentage coupon, `percent` being a fraction (`0.10` for 10%).
    ///
    /// # Errors
    ///
    /// Returns an error if the code is blank or the percentage is outside 0%..=100%.
    pub fn percentage(code: &str, percent: Percentage) -> Result<Self, CouponBookError> {
        let code = normalise_code(code).ok_or(CouponBookError::BlankCode)?;
        let fraction = percent * Decimal::ONE;

        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(CouponBookError::PercentageOutOfRange(code));
        }

        Ok(Self {
            code,
            discount: CouponDiscount::Percentage(percent),
        })
    }

    /// Create a fixed-amount coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is blank or the amount is negative.
    pub fn fixed(code: &str, amount: Price) -> Result<Self, CouponBookError> {
        let code = normalise_code(code).ok_or(CouponBookError::BlankCode)?;

        if amount.to_minor_units() < 0 {
            return Err(CouponBookError::NegativeAmount(code));
        }

        Ok(Self {
            code,
            discount: CouponDiscount::Fixed(amount),
        })
    }

    /// Upper-case coupon code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Discount granted by the coupon.
    pub fn discount(&self) -> &CouponDiscount {
        &self.discount
    }

    /// Kind of discount granted by the coupon.
    pub fn kind(&self) -> DiscountKind {
        self.discount.kind()
    }
}

/// Why a coupon code was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclineReason {
    /// Nothing was entered.
    BlankCode,

    /// The code is not in the coupon book.
    UnknownCode(String),

    /// A fixed-amount coupon in a different currency from the cart.
    CurrencyMismatch {
        /// Coupon code
        code: String,
        /// Coupon currency
        coupon_currency: &'static str,
        /// Cart currency
        cart_currency: &'static str,
    },
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankCode => f.write_str("Please enter a coupon code."),
            Self::UnknownCode(code) => write!(f, "Coupon {code} is not valid."),
            Self::CurrencyMismatch {
                code,
                coupon_currency,
                cart_currency,
            } => write!(
                f,
                "Coupon {code} is only valid for {coupon_currency} purchases, not {cart_currency}."
            ),
        }
    }
}

/// Result of trying to apply a coupon code.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponOutcome {
    /// The coupon is now active on the cart.
    Applied(Coupon),

    /// The coupon was rejected; any previously active coupon is untouched.
    Declined(DeclineReason),
}

impl CouponOutcome {
    /// Whether the coupon was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Message suitable for showing to the shopper.
    pub fn message(&self) -> String {
        match self {
            Self::Applied(coupon) => {
                format!("Coupon {} applied: {}.", coupon.code(), coupon.discount())
            }
            Self::Declined(reason) => reason.to_string(),
        }
    }
}

/// Coupon book as written in YAML.
#[derive(Debug, Deserialize)]
struct CouponBookFixture {
    /// Map of code -> discount (`"10%"` or `"20.00 BRL"`)
    coupons: FxHashMap<String, String>,
}

/// The set of valid coupons for a storefront currency.
#[derive(Debug, Clone)]
pub struct CouponBook {
    currency: &'static Currency,
    coupons: FxHashMap<String, Coupon>,
}

impl CouponBook {
    /// Create an empty coupon book.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            coupons: FxHashMap::default(),
        }
    }

    /// The storefront's standing coupons: `BIUTY10`, `BIUTY15` and `BEMVINDO20`.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in set; the `Result` carries validation through.
    pub fn defaults(currency: &'static Currency) -> Result<Self, CouponBookError> {
        let mut book = Self::new(currency);

        book.insert(Coupon::percentage("BIUTY10", Percentage::from(0.10))?)?;
        book.insert(Coupon::percentage("BIUTY15", Percentage::from(0.15))?)?;
        book.insert(Coupon::fixed(
            "BEMVINDO20",
            Money::from_minor(scaled(20, currency), currency),
        )?)?;

        Ok(book)
    }

    /// Load a coupon book from YAML.
    ///
    /// ```yaml
    /// coupons:
    ///   BIUTY10: "10%"
    ///   BEMVINDO20: "20.00 BRL"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or any coupon is invalid.
    pub fn from_yaml(yaml: &str, currency: &'static Currency) -> Result<Self, CouponBookError> {
        let fixture: CouponBookFixture = serde_norway::from_str(yaml)?;
        let mut book = Self::new(currency);

        for (code, value) in fixture.coupons {
            book.insert(parse_coupon(&code, &value)?)?;
        }

        Ok(book)
    }

    /// Add or replace a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CouponBookError::CurrencyMismatch`] for a fixed coupon in another currency.
    pub fn insert(&mut self, coupon: Coupon) -> Result<(), CouponBookError> {
        if let CouponDiscount::Fixed(amount) = coupon.discount() {
            let found = amount.currency();

            if found != self.currency {
                return Err(CouponBookError::CurrencyMismatch {
                    code: coupon.code,
                    expected: self.currency.iso_alpha_code,
                    found: found.iso_alpha_code,
                });
            }
        }

        self.coupons.insert(coupon.code.clone(), coupon);

        Ok(())
    }

    /// Resolve a code entered by a shopper for a cart in `cart_currency`.
    pub fn lookup(&self, code: &str, cart_currency: &'static Currency) -> CouponOutcome {
        let Some(code) = normalise_code(code) else {
            return CouponOutcome::Declined(DeclineReason::BlankCode);
        };

        let Some(coupon) = self.coupons.get(&code) else {
            return CouponOutcome::Declined(DeclineReason::UnknownCode(code));
        };

        if coupon.kind() == DiscountKind::Fixed && self.currency != cart_currency {
            return CouponOutcome::Declined(DeclineReason::CurrencyMismatch {
                code,
                coupon_currency: self.currency.iso_alpha_code,
                cart_currency: cart_currency.iso_alpha_code,
            });
        }

        CouponOutcome::Applied(coupon.clone())
    }

    /// Currency fixed amounts are expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Iterate over the coupons, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.values()
    }

    /// Number of coupons in the book.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the book has no coupons.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

fn normalise_code(code: &str) -> Option<String> {
    let code = code.trim();

    (!code.is_empty()).then(|| code.to_uppercase())
}

fn scaled(major: i64, currency: &Currency) -> i64 {
    (0..currency.exponent).fold(major, |value, _| value * 10)
}

fn parse_coupon(code: &str, value: &str) -> Result<Coupon, CouponBookError> {
    let trimmed = value.trim();

    if let Some(percent) = trimmed.strip_suffix('%') {
        let points = percent
            .trim()
            .parse::<f64>()
            .map_err(|_err| CouponBookError::InvalidPercentage(code.to_string(), value.to_string()))?;

        return Coupon::percentage(code, Percentage::from(points / 100.0));
    }

    let amount =
        parse_price(trimmed).map_err(|err| CouponBookError::InvalidAmount(code.to_string(), err))?;

    Coupon::fixed(code, amount)
}
