//! [`Money`]-related definitions.

use std::{fmt, ops};

use rust_decimal::Decimal;

/// Amount of money in euros.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount of [`Money`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] amount from the provided number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Formats this [`Money`] with exactly two decimal digits and a period
    /// as the decimal separator, e.g. `17.50`.
    #[must_use]
    pub fn to_plain(self) -> String {
        let mut amount = self.0.round_dp(2);
        amount.rescale(2);
        amount.to_string()
    }
}

/// Human-readable form: two decimal digits, a comma separator and the euro
/// sign, e.g. `17,50€`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}€", self.to_plain().replace('.', ","))
    }
}

impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl ops::Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}
