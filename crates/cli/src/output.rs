use crate::error::CliError;
use serde::Serialize;
use std::path::Path;

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn write_report<T: Serialize>(value: &T, path: &Path) -> Result<(), CliError> {
    std::fs::write(path, to_json(value)?)?;
    Ok(())
}

pub fn print_report<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", to_json(value)?);
    Ok(())
}
