//! Full-table validation of source against target, without a checkpoint.

use crate::error::PipelineError;
use engine_processing::validation::{
    validate_primary_key, validate_reconciliation, validate_row_count,
};
use model::records::table::Table;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub source_rows: usize,
    pub target_rows: usize,
    pub primary_key: String,
    pub checks_passed: Vec<&'static str>,
}

/// Row count, primary key on both tables, then reconciliation of source
/// into target. Stops at the first failing check.
pub fn audit_tables(
    source: &Table,
    target: &Table,
    pk_column: &str,
) -> Result<AuditReport, PipelineError> {
    let mut report = AuditReport {
        source_rows: source.len(),
        target_rows: target.len(),
        primary_key: pk_column.to_string(),
        checks_passed: Vec::with_capacity(4),
    };

    validate_row_count(source, target).into_result()?;
    report.checks_passed.push("row_count");
    info!(source_rows = source.len(), target_rows = target.len(), "Row count validation passed");

    validate_primary_key(source, pk_column).into_result()?;
    report.checks_passed.push("primary_key_source");
    info!(table = %source.name, column = pk_column, "Primary key validation passed");

    validate_primary_key(target, pk_column).into_result()?;
    report.checks_passed.push("primary_key_target");
    info!(table = %target.name, column = pk_column, "Primary key validation passed");

    validate_reconciliation(source, target, pk_column).into_result()?;
    report.checks_passed.push("reconciliation");
    info!("Source-target reconciliation passed");

    info!("All validations passed successfully");
    Ok(report)
}
