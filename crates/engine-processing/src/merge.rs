use model::records::table::Table;
use tracing::debug;

pub const MERGED_TABLE: &str = "updated_target";

/// Simulated load: target rows followed by delta rows, with no
/// deduplication. Columns are the target's followed by any delta column the
/// target lacks.
pub fn merge(target: &Table, delta: &Table) -> Table {
    let mut columns = target.columns.clone();
    for column in &delta.columns {
        if !target.has_column(column) {
            columns.push(column.clone());
        }
    }

    let rows = target.iter().chain(delta.iter()).cloned().collect::<Vec<_>>();
    debug!(
        target_rows = target.len(),
        delta_rows = delta.len(),
        merged_rows = rows.len(),
        "Appended delta to target"
    );

    Table::with_rows(MERGED_TABLE, columns, rows)
}
