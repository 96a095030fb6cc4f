//! Enum-complete grouped counts.
//!
//! A `GROUP BY` only returns the values that occur. Reports instead list every
//! statically known value of the enum, in declaration order, with `0` for
//! the values that did not occur.

use std::collections::HashMap;

use sea_orm::{ActiveEnum, Iterable};

/// Count of rows for one enum value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumCount {
    pub key: String,
    pub count: u64,
}

/// Expands grouped `(value, count)` rows into one entry per value of `E`.
///
/// Rows whose value is not a variant of `E` are dropped; duplicated values
/// are summed.
pub fn fill_enum_counts<E>(rows: impl IntoIterator<Item = (String, i64)>) -> Vec<EnumCount>
where
    E: ActiveEnum<Value = String> + Iterable,
{
    let mut seen: HashMap<String, u64> = HashMap::new();
    for (key, count) in rows {
        *seen.entry(key).or_default() += u64::try_from(count).unwrap_or(0);
    }
    E::iter()
        .map(|variant| {
            let key = variant.to_value();
            let count = seen.get(&key).copied().unwrap_or(0);
            EnumCount { key, count }
        })
        .collect()
}

/// Boolean counterpart of [`fill_enum_counts`]: always `true` then `false`.
pub fn fill_bool_counts(rows: impl IntoIterator<Item = (bool, i64)>) -> Vec<EnumCount> {
    let (mut yes, mut no) = (0u64, 0u64);
    for (flag, count) in rows {
        let count = u64::try_from(count).unwrap_or(0);
        if flag {
            yes += count;
        } else {
            no += count;
        }
    }
    vec![
        EnumCount {
            key: "true".to_string(),
            count: yes,
        },
        EnumCount {
            key: "false".to_string(),
            count: no,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstructionType, DocumentType, ProjectStatus, TaskStatus};

    #[test]
    fn empty_input_lists_every_value_with_zero() {
        let counts = fill_enum_counts::<ProjectStatus>(Vec::new());
        let keys: Vec<&str> = counts.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(
            keys,
            ["planning", "in_progress", "completed", "on_hold", "cancelled"]
        );
        assert!(counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn output_length_matches_cardinality() {
        assert_eq!(fill_enum_counts::<TaskStatus>(Vec::new()).len(), 3);
        assert_eq!(fill_enum_counts::<ConstructionType>(Vec::new()).len(), 5);
        assert_eq!(fill_enum_counts::<DocumentType>(Vec::new()).len(), 6);
    }

    #[test]
    fn present_values_keep_their_counts() {
        let rows = vec![
            ("completed".to_string(), 4),
            ("pending".to_string(), 1),
            ("archived".to_string(), 9),
        ];
        let counts = fill_enum_counts::<TaskStatus>(rows);
        assert_eq!(
            counts,
            vec![
                EnumCount {
                    key: "pending".to_string(),
                    count: 1
                },
                EnumCount {
                    key: "in_progress".to_string(),
                    count: 0
                },
                EnumCount {
                    key: "completed".to_string(),
                    count: 4
                },
            ]
        );
    }

    #[test]
    fn bool_counts_always_have_both_keys() {
        let counts = fill_bool_counts(vec![(false, 2)]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].key, "true");
        assert_eq!(counts[0].count, 0);
        assert_eq!(counts[1].count, 2);
    }
}
