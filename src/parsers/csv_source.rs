use crate::errors::ScenarioError;
use csv::ReaderBuilder;
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The bundled five-room cooling schedule.
pub const DEFAULT_SCENARIO: &str = include_str!("../../scenarios/default.csv");

/// Reads raw scenario rows from a CSV file. Rows may have different lengths.
pub fn load_rows_from_csv(path: &Path, has_headers: bool) -> Result<Vec<Vec<String>>, ScenarioError> {
    let file = File::open(path).map_err(|e| ScenarioError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let rows = read_rows(file, has_headers).map_err(|e| ScenarioError::CsvError {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Read {} scenario rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Rows of [`DEFAULT_SCENARIO`].
pub fn default_rows() -> Result<Vec<Vec<String>>, csv::Error> {
    read_rows(DEFAULT_SCENARIO.as_bytes(), false)
}

fn read_rows<R: Read>(reader: R, has_headers: bool) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect()
}
