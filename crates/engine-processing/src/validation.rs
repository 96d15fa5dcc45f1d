use model::{
    core::key::{KeyValue, join_keys},
    records::table::Table,
};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// A data-quality rule that did not hold. Key lists are complete and never
/// truncated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("Row count validation failed: target has {target_rows} rows, more than source's {source_rows}")]
    RowCount {
        source_rows: usize,
        target_rows: usize,
    },

    #[error("Primary key validation failed: duplicates found in {table} for column {column}: {}", join_keys(.duplicates))]
    PrimaryKey {
        table: String,
        column: String,
        duplicates: Vec<KeyValue>,
    },

    #[error("Source-target reconciliation failed: keys missing in target: {}", join_keys(.missing))]
    Reconciliation { missing: Vec<KeyValue> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Pass,
    Failed(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, ValidationOutcome::Pass)
    }

    pub fn into_result(self) -> Result<(), ValidationFailure> {
        match self {
            ValidationOutcome::Pass => Ok(()),
            ValidationOutcome::Failed(failure) => Err(failure),
        }
    }
}

/// Fails when the target holds more rows than the source.
pub fn validate_row_count(source: &Table, target: &Table) -> ValidationOutcome {
    debug!(source_rows = source.len(), target_rows = target.len(), "Checking row counts");

    if target.len() > source.len() {
        ValidationOutcome::Failed(ValidationFailure::RowCount {
            source_rows: source.len(),
            target_rows: target.len(),
        })
    } else {
        ValidationOutcome::Pass
    }
}

/// Fails when any value of `pk_column` occurs more than once. Every
/// duplicated key is reported once, in order of first appearance.
pub fn validate_primary_key(table: &Table, pk_column: &str) -> ValidationOutcome {
    let mut counts: HashMap<KeyValue, usize> = HashMap::with_capacity(table.len());
    let mut order = Vec::new();

    for key in table.keys(pk_column) {
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    let duplicates: Vec<KeyValue> = order.into_iter().filter(|k| counts[k] > 1).collect();

    debug!(
        table = %table.name,
        column = pk_column,
        duplicates = duplicates.len(),
        "Checked primary key uniqueness"
    );

    if duplicates.is_empty() {
        ValidationOutcome::Pass
    } else {
        ValidationOutcome::Failed(ValidationFailure::PrimaryKey {
            table: table.name.clone(),
            column: pk_column.to_string(),
            duplicates,
        })
    }
}

/// Fails when some key of `source` is absent from `target`. The failure
/// carries exactly the set `keys(source) - keys(target)`, in source order.
pub fn validate_reconciliation(source: &Table, target: &Table, pk_column: &str) -> ValidationOutcome {
    let present: HashSet<KeyValue> = target.keys(pk_column).collect();
    let mut seen = HashSet::new();

    let missing: Vec<KeyValue> = source
        .keys(pk_column)
        .filter(|k| !present.contains(k))
        .filter(|k| seen.insert(k.clone()))
        .collect();

    if missing.is_empty() {
        ValidationOutcome::Pass
    } else {
        ValidationOutcome::Failed(ValidationFailure::Reconciliation { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{core::value::Value, records::row::RowData};
    use proptest::prelude::*;

    fn table(name: &str, ids: &[&str]) -> Table {
        let rows = ids
            .iter()
            .map(|id| RowData::from_pairs([("id", Value::from(*id))]))
            .collect();
        Table::with_rows(name, vec!["id".into()], rows)
    }

    fn keys(ids: &[&str]) -> Vec<KeyValue> {
        ids.iter().map(|id| KeyValue::from(*id)).collect()
    }

    #[test]
    fn row_count_allows_equal_and_smaller_targets() {
        let source = table("source", &["1", "2"]);
        assert!(validate_row_count(&source, &table("target", &["1", "2"])).is_pass());
        assert!(validate_row_count(&source, &table("target", &["1"])).is_pass());
        assert!(validate_row_count(&table("s", &[]), &table("t", &[])).is_pass());
    }

    #[test]
    fn row_count_rejects_larger_target() {
        let outcome = validate_row_count(&table("s", &["1"]), &table("t", &["1", "2"]));
        assert_eq!(
            outcome,
            ValidationOutcome::Failed(ValidationFailure::RowCount {
                source_rows: 1,
                target_rows: 2
            })
        );
    }

    #[test]
    fn primary_key_reports_every_duplicate_once_in_first_appearance_order() {
        let delta = table("incremental_source", &["9", "1", "5", "9", "5", "9", "2"]);
        let err = validate_primary_key(&delta, "id").into_result().unwrap_err();

        assert_eq!(
            err,
            ValidationFailure::PrimaryKey {
                table: "incremental_source".into(),
                column: "id".into(),
                duplicates: keys(&["9", "5"]),
            }
        );
        assert_eq!(
            err.to_string(),
            "Primary key validation failed: duplicates found in incremental_source for column id: {9, 5}"
        );
    }

    #[test]
    fn primary_key_passes_on_empty_and_unique_tables() {
        assert!(validate_primary_key(&table("t", &[]), "id").is_pass());
        assert!(validate_primary_key(&table("t", &["1", "2", "3"]), "id").is_pass());
    }

    #[test]
    fn missing_key_column_counts_as_null_key() {
        let rows = vec![
            RowData::from_pairs([("amount", Value::from("1"))]),
            RowData::from_pairs([("amount", Value::from("2"))]),
        ];
        let t = Table::from_rows("t", rows);
        let err = validate_primary_key(&t, "id").into_result().unwrap_err();
        assert!(matches!(err, ValidationFailure::PrimaryKey { ref duplicates, .. } if duplicates == &keys(&["NULL"])));
    }

    #[test]
    fn reconciliation_lists_exactly_the_missing_keys() {
        let source = table("source", &["1", "2", "3", "2", "4"]);
        let target = table("target", &["1", "3"]);

        let err = validate_reconciliation(&source, &target, "id")
            .into_result()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationFailure::Reconciliation {
                missing: keys(&["2", "4"])
            }
        );
        assert_eq!(err.to_string(), "Source-target reconciliation failed: keys missing in target: {2, 4}");
    }

    #[test]
    fn reconciliation_ignores_extra_target_keys() {
        let source = table("source", &["1"]);
        let target = table("target", &["1", "7", "8"]);
        assert!(validate_reconciliation(&source, &target, "id").is_pass());
    }

    fn ids() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[0-9]{1,2}", 0..40)
    }

    fn owned_table(name: &str, ids: &[String]) -> Table {
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        table(name, &refs)
    }

    proptest! {
        #[test]
        fn row_count_fails_iff_target_is_larger(s in ids(), t in ids()) {
            let outcome = validate_row_count(&owned_table("s", &s), &owned_table("t", &t));
            prop_assert_eq!(outcome.is_pass(), t.len() <= s.len());
        }

        #[test]
        fn duplicates_are_exactly_keys_seen_twice(v in ids()) {
            let outcome = validate_primary_key(&owned_table("t", &v), "id");

            let mut expected = Vec::new();
            for (i, id) in v.iter().enumerate() {
                let first = v.iter().position(|x| x == id) == Some(i);
                let repeated = v.iter().filter(|x| *x == id).count() > 1;
                if first && repeated {
                    expected.push(KeyValue::new(id.clone()));
                }
            }

            match outcome {
                ValidationOutcome::Pass => prop_assert!(expected.is_empty()),
                ValidationOutcome::Failed(ValidationFailure::PrimaryKey { duplicates, .. }) => {
                    prop_assert_eq!(duplicates, expected)
                }
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }

        #[test]
        fn missing_set_is_the_set_difference(s in ids(), t in ids()) {
            let outcome = validate_reconciliation(&owned_table("s", &s), &owned_table("t", &t), "id");

            let target: HashSet<&String> = t.iter().collect();
            let mut expected: Vec<KeyValue> = Vec::new();
            for id in &s {
                let key = KeyValue::new(id.clone());
                if !target.contains(id) && !expected.contains(&key) {
                    expected.push(key);
                }
            }

            match outcome {
                ValidationOutcome::Pass => prop_assert!(expected.is_empty()),
                ValidationOutcome::Failed(ValidationFailure::Reconciliation { missing }) => {
                    prop_assert_eq!(missing, expected)
                }
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }
    }
}
