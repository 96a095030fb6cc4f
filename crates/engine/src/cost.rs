//! Cost arithmetic for task resources.
//!
//! Every function here is pure. Inputs are accepted through [`ToAmount`] so
//! that the same formula works for stored columns, optional columns and raw
//! request values. Anything absent, unparsable or non-finite counts as `0`:
//! an aggregate over partial data is preferred to an aborted one.
//!
//! # Examples
//!
//! ```rust
//! use engine::cost::{labor_cost, material_cost, round_cents};
//!
//! assert_eq!(material_cost(10.0, 3.0), 30.0);
//! assert_eq!(material_cost("12.5", Some(2.0)), 25.0);
//! assert_eq!(labor_cost(20.0, 8.0, 1), 160.0);
//! assert_eq!(material_cost("n/a", 4.0), 0.0);
//! assert_eq!(round_cents(10.0 / 3.0), 3.33);
//! ```

/// A value that can take part in a cost formula.
pub trait ToAmount {
    /// Returns the numeric value, or `0.0` when there is none.
    fn to_amount(&self) -> f64;
}

impl ToAmount for f64 {
    fn to_amount(&self) -> f64 {
        if self.is_finite() { *self } else { 0.0 }
    }
}

impl ToAmount for f32 {
    fn to_amount(&self) -> f64 {
        f64::from(*self).to_amount()
    }
}

impl ToAmount for i32 {
    fn to_amount(&self) -> f64 {
        f64::from(*self)
    }
}

impl ToAmount for i64 {
    fn to_amount(&self) -> f64 {
        *self as f64
    }
}

impl ToAmount for u64 {
    fn to_amount(&self) -> f64 {
        *self as f64
    }
}

impl ToAmount for str {
    fn to_amount(&self) -> f64 {
        self.trim()
            .parse::<f64>()
            .map(|value| value.to_amount())
            .unwrap_or(0.0)
    }
}

impl ToAmount for String {
    fn to_amount(&self) -> f64 {
        self.as_str().to_amount()
    }
}

impl ToAmount for serde_json::Value {
    fn to_amount(&self) -> f64 {
        match self {
            serde_json::Value::Number(number) => number.as_f64().unwrap_or(0.0).to_amount(),
            serde_json::Value::String(text) => text.to_amount(),
            _ => 0.0,
        }
    }
}

impl<T: ToAmount> ToAmount for Option<T> {
    fn to_amount(&self) -> f64 {
        self.as_ref().map_or(0.0, ToAmount::to_amount)
    }
}

impl<T: ToAmount + ?Sized> ToAmount for &T {
    fn to_amount(&self) -> f64 {
        (**self).to_amount()
    }
}

/// Normalizes any [`ToAmount`] input.
pub fn amount(value: impl ToAmount) -> f64 {
    value.to_amount()
}

/// `unit_cost × quantity`.
pub fn material_cost(unit_cost: impl ToAmount, quantity: impl ToAmount) -> f64 {
    unit_cost.to_amount() * quantity.to_amount()
}

/// `daily_rate × days`.
pub fn equipment_cost(daily_rate: impl ToAmount, days: impl ToAmount) -> f64 {
    daily_rate.to_amount() * days.to_amount()
}

/// `hourly_rate × hours × quantity`; pass `1` as quantity for a single worker.
pub fn labor_cost(
    hourly_rate: impl ToAmount,
    hours: impl ToAmount,
    quantity: impl ToAmount,
) -> f64 {
    hourly_rate.to_amount() * hours.to_amount() * quantity.to_amount()
}

/// Rounds half away from zero to two decimals.
pub fn round_cents(value: f64) -> f64 {
    let value = value.to_amount();
    (value * 100.0).round() / 100.0
}

/// Head count of a labor requirement: a missing or non-positive quantity
/// stands for a single worker.
pub fn required_headcount(required_quantity: Option<i32>) -> i64 {
    required_quantity
        .filter(|quantity| *quantity > 0)
        .map_or(1, i64::from)
}
