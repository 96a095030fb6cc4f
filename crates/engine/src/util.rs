//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use sea_orm::ActiveEnum;

use crate::{EngineError, ResultEngine};

/// Implements `FromStr` and `Display` for string-backed active enums, using
/// the stored value as the textual form.
macro_rules! str_enum {
    ($ty:ty, $label:literal) => {
        impl std::str::FromStr for $ty {
            type Err = $crate::EngineError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                $crate::util::parse_active_enum(value, $label)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&sea_orm::ActiveEnum::to_value(self))
            }
        }
    };
}

pub(crate) use str_enum;

/// Parse a wire value into an active enum, rejecting unknown values.
pub(crate) fn parse_active_enum<E>(value: &str, label: &str) -> ResultEngine<E>
where
    E: ActiveEnum<Value = String>,
{
    E::try_from_value(&value.trim().to_string())
        .map_err(|_| EngineError::Validation(format!("invalid {label}: {value}")))
}

/// Trim a required text field, rejecting blank input.
pub(crate) fn required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Progress values are whole percentages in `0..=100`.
pub(crate) fn validate_percent(value: i32, label: &str) -> ResultEngine<i32> {
    if !(0..=100).contains(&value) {
        return Err(EngineError::Validation(format!(
            "{label} must be between 0 and 100"
        )));
    }
    Ok(value)
}

/// Money and quantity inputs must be finite and non-negative.
pub(crate) fn validate_non_negative(value: f64, label: &str) -> ResultEngine<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::Validation(format!("{label} must be >= 0")));
    }
    Ok(value)
}
