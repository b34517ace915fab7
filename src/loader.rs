use crate::error::{Error, Result};
use crate::types::{RawRow, Record, EXPECTED_COLUMNS};
use crate::util::{parse_i64_lenient, parse_string};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub malformed_rows: usize,
    pub defaulted_fields: usize,
    pub missing_columns: Vec<String>,
}

/// Read and coerce the registration CSV at `path`.
///
/// Fails only when the file cannot be opened or its header has none of the
/// expected columns; individual rows and cells degrade instead.
pub fn load_records(path: impl AsRef<Path>) -> Result<(Vec<Record>, LoadReport)> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_records(file)
}

/// Dashboard entry point: like [`load_records`], but a failed load is logged
/// and yields an empty collection so the caller can show the empty state.
pub fn load_or_empty(path: impl AsRef<Path>) -> (Vec<Record>, LoadReport) {
    let path = path.as_ref();
    match load_records(path) {
        Ok((records, report)) => {
            info!(
                path = %path.display(),
                total_rows = report.total_rows,
                loaded_rows = report.loaded_rows,
                malformed_rows = report.malformed_rows,
                defaulted_fields = report.defaulted_fields,
                "Loaded registration data"
            );
            (records, report)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to load registration data");
            (Vec::new(), LoadReport::default())
        }
    }
}

/// Parse delimited text with a header row. Columns are addressed by name, so
/// their order in the source does not matter.
pub fn parse_records<R: Read>(reader: R) -> Result<(Vec<Record>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing_columns: Vec<String> = EXPECTED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if missing_columns.len() == EXPECTED_COLUMNS.len() {
        return Err(Error::MissingColumns(missing_columns));
    }
    if !missing_columns.is_empty() {
        warn!(missing = ?missing_columns, "Source is missing columns; their fields will default");
    }

    let mut report = LoadReport {
        missing_columns,
        ..LoadReport::default()
    };
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = report.total_rows, error = %e, "Skipping unreadable row");
                report.malformed_rows += 1;
                continue;
            }
        };
        let (record, defaulted) = coerce_row(&row);
        report.defaulted_fields += defaulted;
        records.push(record);
    }

    report.loaded_rows = records.len();
    Ok((records, report))
}

/// Turn a raw row into a [`Record`], applying per-field defaults.
///
/// - `year`, `month`: integer, `0` when missing, malformed or when the number
///   does not fit the field type (a negative month). Values such as month 13
///   are kept as-is.
/// - `value`: non-negative integer count, `0` when missing, malformed or negative.
/// - `state`, `rto`, `vehicle_class`, `fuel`: trimmed text, `""` when missing.
///
/// Also returns how many fields fell back to their default.
pub fn coerce_row(row: &RawRow) -> (Record, usize) {
    let mut defaulted = 0usize;
    let record = Record {
        year: int_cell(&row.year, &mut defaulted),
        month: int_cell(&row.month, &mut defaulted),
        state: text_cell(&row.state, &mut defaulted),
        rto: text_cell(&row.rto, &mut defaulted),
        vehicle_class: text_cell(&row.vehicle_class, &mut defaulted),
        fuel: text_cell(&row.fuel, &mut defaulted),
        value: int_cell(&row.value, &mut defaulted),
    };
    (record, defaulted)
}

fn int_cell<T>(cell: &Option<String>, defaulted: &mut usize) -> T
where
    T: TryFrom<i64> + Default,
{
    // A number that parses but does not fit the target (a negative count)
    // defaults like any other malformed cell.
    match parse_i64_lenient(cell.as_deref()).and_then(|v| T::try_from(v).ok()) {
        Some(v) => v,
        None => {
            *defaulted += 1;
            T::default()
        }
    }
}

fn text_cell(cell: &Option<String>, defaulted: &mut usize) -> String {
    parse_string(cell.as_deref()).unwrap_or_else(|| {
        *defaulted += 1;
        String::new()
    })
}
