use crate::validation::{ValidationFailure, ValidationOutcome, validate_reconciliation};
use bigdecimal::BigDecimal;
use model::{
    core::{key::KeyValue, value::Value},
    records::{row::RowData, table::Table},
};
use serde::Serialize;
use std::{collections::HashSet, str::FromStr};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnNulls {
    pub column: String,
    pub nulls: usize,
}

/// Numeric sanity of the measure column. Empty cells are not counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasureCheck {
    pub column: String,
    pub non_positive: usize,
    pub unparsable: usize,
    pub min: Option<BigDecimal>,
}

/// Data-quality summary of a source table against its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataProfile {
    pub source_rows: usize,
    pub target_rows: usize,
    pub null_counts: Vec<ColumnNulls>,
    /// Rows identical to an earlier row of the source.
    pub duplicate_rows: usize,
    pub measure: Option<MeasureCheck>,
    pub missing_in_target: Vec<KeyValue>,
}

fn null_counts(table: &Table) -> Vec<ColumnNulls> {
    table
        .columns
        .iter()
        .map(|column| ColumnNulls {
            column: column.clone(),
            nulls: table
                .iter()
                .filter(|row| row.get_value(column).is_none_or(Value::is_null))
                .count(),
        })
        .collect()
}

fn duplicate_rows(table: &Table) -> usize {
    let mut seen: HashSet<&RowData> = HashSet::with_capacity(table.len());
    table.iter().filter(|row| !seen.insert(*row)).count()
}

fn measure_check(table: &Table, column: &str) -> MeasureCheck {
    let zero = BigDecimal::from(0_i64);
    let mut check = MeasureCheck {
        column: column.to_string(),
        non_positive: 0,
        unparsable: 0,
        min: None,
    };

    for value in table.iter().filter_map(|row| row.get_value(column)) {
        let Some(raw) = value.as_str() else {
            if !value.is_null() {
                check.unparsable += 1;
            }
            continue;
        };

        match BigDecimal::from_str(raw) {
            Ok(amount) => {
                if amount <= zero {
                    check.non_positive += 1;
                }
                if check.min.as_ref().is_none_or(|m| amount < *m) {
                    check.min = Some(amount);
                }
            }
            Err(_) => check.unparsable += 1,
        }
    }

    check
}

/// Profiles `source` (nulls, duplicate rows, measure sanity) and lists the
/// source keys absent from `target`.
pub fn profile_tables(
    source: &Table,
    target: &Table,
    pk_column: &str,
    measure_column: Option<&str>,
) -> DataProfile {
    let measure = match measure_column {
        Some(column) if source.has_column(column) => Some(measure_check(source, column)),
        Some(column) => {
            warn!(table = %source.name, column, "Measure column not found, skipping check");
            None
        }
        None => None,
    };

    let missing_in_target = match validate_reconciliation(source, target, pk_column) {
        ValidationOutcome::Failed(ValidationFailure::Reconciliation { missing }) => missing,
        _ => Vec::new(),
    };

    let profile = DataProfile {
        source_rows: source.len(),
        target_rows: target.len(),
        null_counts: null_counts(source),
        duplicate_rows: duplicate_rows(source),
        measure,
        missing_in_target,
    };

    info!(
        source_rows = profile.source_rows,
        target_rows = profile.target_rows,
        duplicate_rows = profile.duplicate_rows,
        missing_in_target = profile.missing_in_target.len(),
        "Profiled source data"
    );

    profile
}
