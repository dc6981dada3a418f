//! [`Bill`] of a [`Student`] and the fixed tariff it's computed from.

use common::Money;

use crate::domain::Student;

/// Ski-pass price per day, in cents.
const FORFAIT_PER_DAY: i64 = 17_50;

/// Equipment rental price per day, in cents.
const RENTAL_PER_DAY: i64 = 10_00;

/// Price of a single keycard, in cents.
const KEYCARD_PER_UNIT: i64 = 2_00;

/// Savings granted for an exact total, both in cents.
const DISCOUNTS: [(i64, i64); 8] = [
    (17_50, 5_55),
    (10_00, 3_10),
    (29_50, 9_47),
    (35_00, 11_10),
    (20_00, 6_20),
    (57_00, 18_62),
    (19_50, 6_37),
    (37_00, 11_92),
];

/// Amounts charged for a [`Student`].
///
/// Never persisted: always derived from the [`Student`] record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bill {
    /// Cost of the ski-pass days.
    pub forfait: Money,

    /// Cost of the equipment rental days.
    pub rental: Money,

    /// Cost of the keycards.
    pub keycard: Money,

    /// Sum of [`Bill::forfait`], [`Bill::rental`] and [`Bill::keycard`].
    pub total: Money,

    /// Discount granted for [`Bill::total`].
    pub savings: Money,

    /// [`Bill::total`] minus [`Bill::savings`].
    pub net: Money,
}

impl Bill {
    /// Computes the [`Bill`] of the provided [`Student`].
    #[must_use]
    pub fn of(student: &Student) -> Self {
        let forfait = Money::from_cents(FORFAIT_PER_DAY) * student.forfait_days;
        let rental = Money::from_cents(RENTAL_PER_DAY) * student.rental_days;
        let keycard = Money::from_cents(KEYCARD_PER_UNIT) * student.keycards;
        let total = forfait + rental + keycard;
        let savings = savings_for(total);

        Self {
            forfait,
            rental,
            keycard,
            total,
            savings,
            net: total - savings,
        }
    }
}

/// Looks up the savings granted for the exact `total`.
///
/// Totals absent from the table get no savings.
fn savings_for(total: Money) -> Money {
    DISCOUNTS
        .iter()
        .find(|(t, _)| Money::from_cents(*t) == total)
        .map_or(Money::ZERO, |(_, s)| Money::from_cents(*s))
}
