//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FLOATS                                 INTEGER CENTS                   │
//! │                                                                         │
//! │  9.99 * 3 = 29.969999999999995          999 * 3 = 2997                  │
//! │  sum of 1000 sales drifts               sum is exact                    │
//! │                                                                         │
//! │  Prices arrive as decimal text/numbers, are parsed once into cents,    │
//! │  and only turn back into a decimal when a response is rendered.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopkeep_core::money::Money;
//!
//! let price = Money::from_cents(999);
//! let parsed: Money = "9.99".parse().unwrap();
//! assert_eq!(price, parsed);
//!
//! let total = price * 3;
//! assert_eq!(total.cents(), 2997);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

/// Number of fractional digits in the currency's minor unit.
pub const MINOR_DIGITS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Arithmetic never has to special-case a sign
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **sqlx transparent**: Stored as a plain INTEGER column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(999); // $9.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 2997);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies by a quantity, or `None` if the result leaves `i64` cents.
    ///
    /// Use this on client-supplied quantities; [`multiply_quantity`] is for
    /// amounts that were already checked when the sale was planned.
    ///
    /// [`multiply_quantity`]: Money::multiply_quantity
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns the amount as a decimal number of major units.
    ///
    /// Only for rendering JSON responses, where clients expect `29.97`
    /// rather than `2997`. Never feed the result back into arithmetic.
    ///
    /// ```rust
    /// use shopkeep_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(2997).as_decimal(), 29.97);
    /// ```
    #[inline]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Why a decimal string could not become [`Money`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("empty amount")]
    Empty,

    #[error("not a decimal number")]
    Invalid,

    #[error("more than 2 decimal places")]
    TooManyDecimals,

    #[error("amount too large")]
    Overflow,
}

/// Parses plain decimal notation (`"9.99"`, `"10"`, `"-0.5"`, `"3."`).
///
/// Exponent notation is rejected, as is any fraction finer than a cent:
/// silently rounding a price is worse than refusing it.
impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (negative, unsigned) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseMoneyError::Invalid);
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseMoneyError::Invalid);
        }

        // Trailing zeros carry no value ("10.50" == "10.5", "1.000" == "1")
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > MINOR_DIGITS as usize {
            return Err(ParseMoneyError::TooManyDecimals);
        }

        let mut cents: i64 = 0;
        for digit in whole.bytes() {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(digit - b'0')))
                .ok_or(ParseMoneyError::Overflow)?;
        }
        cents = cents.checked_mul(100).ok_or(ParseMoneyError::Overflow)?;

        let mut minor: i64 = 0;
        for (idx, digit) in fraction.bytes().enumerate() {
            let place = 10_i64.pow(MINOR_DIGITS - 1 - idx as u32);
            minor += i64::from(digit - b'0') * place;
        }
        cents = cents.checked_add(minor).ok_or(ParseMoneyError::Overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Money(cents)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
