//! Fixed-point money helpers.
//!
//! Amounts are `rust_decimal::Decimal` with two decimal places. On the wire
//! they are written as strings (`"45.00"`); inbound JSON may use either a
//! number or a string.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serializer};

use crate::config::{MAX_AMOUNT_CENTS, MONEY_SCALE};

/// Round to two places and pin the scale so `45` renders as `45.00`.
pub fn normalize(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Largest amount the money columns can store.
pub fn max_amount() -> Decimal {
    Decimal::new(MAX_AMOUNT_CENTS, MONEY_SCALE)
}

pub fn in_range(value: &Decimal) -> bool {
    *value <= max_amount()
}

/// `price × quantity`, normalized. `None` if the product overflows.
pub fn line_total(price: Decimal, quantity: i32) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity)).map(normalize)
}

pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&normalize(*value).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    <Decimal as Deserialize>::deserialize(deserializer).map(normalize)
}
