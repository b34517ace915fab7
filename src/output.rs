use crate::error::Result;
use crate::types::{BreakdownTable, DashboardSnapshot};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Cross-tabs have a data-driven column set, so they are written record by
/// record: `Label`, `Total`, then one column per category.
pub fn write_breakdown_csv(path: &Path, label_header: &str, table: &BreakdownTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(breakdown_header(label_header, table))?;
    for row in breakdown_records(table) {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write every view of `snapshot` into `dir` and return the paths written.
pub fn export_snapshot(dir: &Path, snapshot: &DashboardSnapshot) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join("stat_cards.csv");
    write_csv(&path, &snapshot.stat_cards)?;
    written.push(path);

    let path = dir.join("time_series.csv");
    write_csv(&path, &snapshot.time_series)?;
    written.push(path);

    let path = dir.join("fuel_trends.csv");
    write_breakdown_csv(&path, "Period", &snapshot.fuel_trends)?;
    written.push(path);

    let path = dir.join("class_by_state.csv");
    write_breakdown_csv(&path, "State", &snapshot.class_by_state)?;
    written.push(path);

    let path = dir.join("fuel_distribution.csv");
    write_csv(&path, &snapshot.fuel_distribution)?;
    written.push(path);

    let path = dir.join("electric_split.csv");
    write_csv(&path, &snapshot.electric_split.entries())?;
    written.push(path);

    let path = dir.join("snapshot.json");
    write_json(&path, snapshot)?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "Exported dashboard views");
    Ok(written)
}

fn breakdown_header(label_header: &str, table: &BreakdownTable) -> Vec<String> {
    let mut header = vec![label_header.to_string(), "Total".to_string()];
    header.extend(table.categories.iter().cloned());
    header
}

fn breakdown_records(table: &BreakdownTable) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.label.clone(), row.total.to_string()];
            cells.extend(
                table
                    .categories
                    .iter()
                    .map(|c| row.breakdown.get(c).copied().unwrap_or(0).to_string()),
            );
            cells
        })
        .collect()
}

pub fn render_table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn render_breakdown(label_header: &str, table: &BreakdownTable, max_rows: usize) -> String {
    if table.rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(breakdown_header(label_header, table));
    for row in breakdown_records(table).into_iter().take(max_rows) {
        builder.push_record(row);
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table_rows(rows, max_rows));
}

pub fn preview_breakdown(label_header: &str, table: &BreakdownTable, max_rows: usize) {
    println!("{}\n", render_breakdown(label_header, table, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fuel_trends;
    use crate::types::{LabelTotal, Record};

    fn rec(month: u32, fuel: &str, value: u64) -> Record {
        Record {
            year: 2021,
            month,
            state: "KA".to_string(),
            rto: String::new(),
            vehicle_class: "MOTOR CAR".to_string(),
            fuel: fuel.to_string(),
            value,
        }
    }

    #[test]
    fn test_breakdown_csv_layout() {
        let table = fuel_trends(&[rec(1, "PETROL", 4), rec(2, "ELECTRIC", 3)]);
        let lines: Vec<String> = breakdown_records(&table).iter().map(|r| r.join(",")).collect();
        assert_eq!(
            breakdown_header("Period", &table),
            vec!["Period", "Total", "ELECTRIC", "PETROL"]
        );
        assert_eq!(lines, vec!["2021-01,4,0,4", "2021-02,3,3,0"]);
    }

    #[test]
    fn test_render_empty() {
        let rows: Vec<LabelTotal> = Vec::new();
        assert_eq!(render_table_rows(&rows, 5), "(no rows)");
        assert_eq!(render_breakdown("State", &BreakdownTable::default(), 5), "(no rows)");
    }

    #[test]
    fn test_render_limits_rows() {
        let rows = vec![
            LabelTotal { label: "PETROL".to_string(), total: 10 },
            LabelTotal { label: "DIESEL".to_string(), total: 5 },
        ];
        let out = render_table_rows(&rows, 1);
        assert!(out.contains("PETROL"));
        assert!(!out.contains("DIESEL"));
    }

    #[test]
    fn test_write_breakdown_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.csv");
        let table = fuel_trends(&[rec(1, "PETROL", 4)]);
        write_breakdown_csv(&path, "Period", &table).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Period,Total,PETROL\n2021-01,4,4\n");
    }
}
