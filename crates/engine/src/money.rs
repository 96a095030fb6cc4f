//! Percentages and display formatting for cost figures.
//!
//! Amounts are plain `f64` values. Rounding to cents happens only where a
//! figure leaves the engine, never while summing.
//!
//! # Examples
//!
//! ```rust
//! use engine::money::{fixed2, percent_of, variance_percentage};
//!
//! assert_eq!(fixed2(12.0), "12.00");
//! assert_eq!(percent_of(25.0, 200.0), 12.5);
//! assert_eq!(percent_of(25.0, 0.0), 0.0);
//! assert_eq!(variance_percentage(1200.0, 1000.0), 20);
//! ```

use crate::cost::{ToAmount, round_cents};

/// Formats a figure with exactly two decimals; non-finite values and
/// negative zero render as `"0.00"`.
pub fn fixed2(value: f64) -> String {
    let value = round_cents(value.to_amount());
    if value == 0.0 {
        return "0.00".to_string();
    }
    format!("{value:.2}")
}

/// `part / whole × 100`, or `0` when `whole` is zero.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    let whole = whole.to_amount();
    if whole == 0.0 {
        return 0.0;
    }
    part.to_amount() / whole * 100.0
}

/// Like [`percent_of`], clamped into `[0, 100]`.
pub fn bounded_percent(part: f64, whole: f64) -> f64 {
    percent_of(part, whole).clamp(0.0, 100.0)
}

/// `(actual − budgeted) / budgeted × 100` rounded to an integer, `0` when
/// nothing is budgeted.
pub fn variance_percentage(actual: f64, budgeted: f64) -> i64 {
    percent_of(actual - budgeted, budgeted).round() as i64
}

/// Same ratio as [`variance_percentage`] kept to two decimals.
pub fn variance_percentage_cents(actual: f64, budgeted: f64) -> f64 {
    round_cents(percent_of(actual - budgeted, budgeted))
}

/// Rounded share of finished items, `0` for an empty set.
pub fn completion_rate(completed: u64, total: u64) -> i64 {
    percent_of(completed as f64, total as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed2_normalizes_degenerate_values() {
        assert_eq!(fixed2(0.0), "0.00");
        assert_eq!(fixed2(-0.0), "0.00");
        assert_eq!(fixed2(-0.001), "0.00");
        assert_eq!(fixed2(f64::NAN), "0.00");
        assert_eq!(fixed2(1234.5), "1234.50");
        assert_eq!(fixed2(-15.5), "-15.50");
    }

    #[test]
    fn variance_percentage_is_zero_without_budget() {
        assert_eq!(variance_percentage(500.0, 0.0), 0);
        assert_eq!(variance_percentage_cents(500.0, 0.0), 0.0);
    }

    #[test]
    fn variance_percentage_rounds() {
        assert_eq!(variance_percentage(800.0, 1000.0), -20);
        assert_eq!(variance_percentage(1001.0, 3000.0), -67);
        assert_eq!(variance_percentage_cents(1001.0, 3000.0), -66.63);
    }

    #[test]
    fn bounded_percent_stays_in_range() {
        assert_eq!(bounded_percent(150.0, 100.0), 100.0);
        assert_eq!(bounded_percent(-5.0, 100.0), 0.0);
        assert_eq!(bounded_percent(10.0, 0.0), 0.0);
    }

    #[test]
    fn completion_rate_rounds_to_integer() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(3, 3), 100);
    }
}
