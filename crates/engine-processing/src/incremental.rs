use crate::error::ProcessingError;
use chrono::NaiveDate;
use engine_core::state::models::Checkpoint;
use model::records::{row::RowData, table::Table};
use tracing::debug;

fn row_date(
    table: &Table,
    index: usize,
    row: &RowData,
    date_column: &str,
) -> Result<NaiveDate, ProcessingError> {
    let value = row.get_value(date_column);
    value
        .and_then(|v| v.as_date())
        .ok_or_else(|| ProcessingError::NotADate {
            table: table.name.clone(),
            row: index,
            column: date_column.to_string(),
            value: value.map(ToString::to_string).unwrap_or_else(|| "NULL".into()),
        })
}

/// Rows of `source` dated strictly after the checkpoint, in source order.
///
/// Comparison is per calendar day: a timestamp on the checkpoint day is not
/// newer than the checkpoint.
pub fn select_incremental(
    source: &Table,
    checkpoint: &Checkpoint,
    date_column: &str,
) -> Result<Table, ProcessingError> {
    let mut rows = Vec::new();
    for (i, row) in source.iter().enumerate() {
        if row_date(source, i, row, date_column)? > checkpoint.last_run_date {
            rows.push(row.clone());
        }
    }

    debug!(
        source_rows = source.len(),
        selected = rows.len(),
        since = %checkpoint,
        "Filtered incremental rows"
    );

    Ok(source.derive(format!("incremental_{}", source.name), rows))
}

/// Latest calendar day in `date_column`.
pub fn watermark(table: &Table, date_column: &str) -> Result<NaiveDate, ProcessingError> {
    let mut max: Option<NaiveDate> = None;
    for (i, row) in table.iter().enumerate() {
        let date = row_date(table, i, row, date_column)?;
        max = Some(max.map_or(date, |m| m.max(date)));
    }
    max.ok_or_else(|| ProcessingError::EmptyTable(table.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(id: &str, created: Value) -> RowData {
        RowData::from_pairs([("id", Value::from(id)), ("created_date", created)])
    }

    fn source() -> Table {
        Table::from_rows(
            "source",
            vec![
                row("1", Value::Date(d(2024, 1, 1))),
                row("2", Value::Date(d(2024, 1, 2))),
                row("3", Value::Date(d(2024, 1, 3))),
            ],
        )
    }

    #[test]
    fn keeps_rows_strictly_after_checkpoint_in_order() {
        let delta = select_incremental(&source(), &Checkpoint::new(d(2024, 1, 1)), "created_date")
            .unwrap();

        let ids: Vec<_> = delta.keys("id").map(|k| k.to_string()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(delta.name, "incremental_source");
        assert_eq!(delta.columns, source().columns);
    }

    #[test]
    fn nothing_newer_gives_empty_table() {
        let delta = select_incremental(&source(), &Checkpoint::new(d(2024, 1, 3)), "created_date")
            .unwrap();
        assert!(delta.is_empty());

        let empty = Table::new("source", vec!["id".into(), "created_date".into()]);
        let delta = select_incremental(&empty, &Checkpoint::new(d(2024, 1, 3)), "created_date")
            .unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn timestamps_compare_by_calendar_day() {
        let ts = |h| Value::Timestamp(d(2024, 1, 3).and_hms_opt(h, 30, 0).unwrap());
        let table = Table::from_rows("source", vec![row("1", ts(23)), row("2", ts(0))]);

        let same_day = select_incremental(&table, &Checkpoint::new(d(2024, 1, 3)), "created_date")
            .unwrap();
        assert!(same_day.is_empty());

        let day_before = select_incremental(&table, &Checkpoint::new(d(2024, 1, 2)), "created_date")
            .unwrap();
        assert_eq!(day_before.len(), 2);
    }

    #[test]
    fn non_date_cell_is_rejected() {
        let table = Table::from_rows(
            "source",
            vec![row("1", Value::Date(d(2024, 1, 1))), row("2", Value::from("soon"))],
        );
        let err = select_incremental(&table, &Checkpoint::new(d(2023, 1, 1)), "created_date")
            .unwrap_err();
        assert_eq!(
            err,
            ProcessingError::NotADate {
                table: "source".into(),
                row: 1,
                column: "created_date".into(),
                value: "soon".into(),
            }
        );
    }

    #[test]
    fn watermark_is_latest_day() {
        assert_eq!(watermark(&source(), "created_date").unwrap(), d(2024, 1, 3));
        assert!(matches!(
            watermark(&Table::new("delta", vec![]), "created_date"),
            Err(ProcessingError::EmptyTable(_))
        ));
    }

    fn arb_source() -> impl Strategy<Value = Table> {
        prop::collection::vec((1u32..15, prop::option::of(0u32..24)), 0..30).prop_map(|cells| {
            let rows = cells
                .into_iter()
                .enumerate()
                .map(|(i, (day, hour))| {
                    let created = match hour {
                        Some(h) => Value::Timestamp(d(2024, 1, day).and_hms_opt(h, 0, 0).unwrap()),
                        None => Value::Date(d(2024, 1, day)),
                    };
                    row(&i.to_string(), created)
                })
                .collect();
            Table::from_rows("source", rows)
        })
    }

    fn day_of(row: &RowData) -> NaiveDate {
        row.get_value("created_date").and_then(Value::as_date).unwrap()
    }

    proptest! {
        #[test]
        fn splits_rows_at_the_checkpoint_day(source in arb_source(), cp_day in 1u32..15) {
            let cp = Checkpoint::new(d(2024, 1, cp_day));
            let delta = select_incremental(&source, &cp, "created_date").unwrap();

            prop_assert!(delta.iter().all(|r| day_of(r) > cp.last_run_date));
            let dropped = source.iter().filter(|r| !delta.rows.contains(r));
            for r in dropped {
                prop_assert!(day_of(r) <= cp.last_run_date);
            }
            let expected: Vec<_> = source
                .iter()
                .filter(|r| day_of(r) > cp.last_run_date)
                .cloned()
                .collect();
            prop_assert_eq!(&delta.rows, &expected);
        }

        #[test]
        fn reselecting_the_delta_changes_nothing(source in arb_source(), cp_day in 1u32..15) {
            let cp = Checkpoint::new(d(2024, 1, cp_day));
            let once = select_incremental(&source, &cp, "created_date").unwrap();
            let twice = select_incremental(&once, &cp, "created_date").unwrap();
            prop_assert_eq!(&once.rows, &twice.rows);
        }

        #[test]
        fn later_checkpoint_selects_a_subset(
            source in arb_source(),
            early in 1u32..15,
            gap in 0u32..5,
        ) {
            let earlier = Checkpoint::new(d(2024, 1, early));
            let later = Checkpoint::new(d(2024, 1, early + gap));
            let wide = select_incremental(&source, &earlier, "created_date").unwrap();
            let narrow = select_incremental(&source, &later, "created_date").unwrap();

            prop_assert!(narrow.len() <= wide.len());
            prop_assert!(narrow.iter().all(|r| wide.rows.contains(r)));
        }
    }
}
