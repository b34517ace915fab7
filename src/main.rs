// Entry point: a menu-driven terminal dashboard over the registration data.
//
// The data file is loaded once at startup. Every menu action works on the
// same `Dashboard`, whose views are recomputed when the filters change:
// - filter options come from the full dataset,
// - the overview and insights reflect the current filters,
// - export writes the current views to CSV and JSON.
mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::Cli;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vahan_report::output;
use vahan_report::state::search_options;
use vahan_report::util::{format_int, format_number, month_name};
use vahan_report::{Dashboard, FilterCriteria, FilterUpdate};

/// Print `prompt` and read one trimmed line. `None` once stdin is closed.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn describe_criteria(c: &FilterCriteria) -> String {
    if !c.has_active_filters() {
        return "none".to_string();
    }
    let mut parts = Vec::new();
    let join = |items: Vec<String>| items.join(", ");
    if !c.years.is_empty() {
        parts.push(format!("years: {}", join(c.years.iter().map(|y| y.to_string()).collect())));
    }
    if !c.months.is_empty() {
        parts.push(format!("months: {}", join(c.months.iter().map(|m| m.to_string()).collect())));
    }
    if !c.states.is_empty() {
        parts.push(format!("states: {}", join(c.states.iter().cloned().collect())));
    }
    if !c.fuel_types.is_empty() {
        parts.push(format!("fuels: {}", join(c.fuel_types.iter().cloned().collect())));
    }
    if !c.vehicle_classes.is_empty() {
        parts.push(format!("classes: {}", join(c.vehicle_classes.iter().cloned().collect())));
    }
    match c.electric_only {
        Some(true) => parts.push("electric only".to_string()),
        Some(false) => parts.push("non-electric only".to_string()),
        None => {}
    }
    parts.join("; ")
}

fn handle_show_options(dashboard: &Dashboard) {
    let o = dashboard.options();
    let months: Vec<String> = o
        .months
        .iter()
        .map(|m| format!("{} ({})", m, month_name(*m).unwrap_or("?")))
        .collect();
    let years: Vec<String> = o.years.iter().map(|y| y.to_string()).collect();
    println!("Years:           {}", years.join(", "));
    println!("Months:          {}", months.join(", "));
    println!("States:          {}", o.states.join(", "));
    println!("Fuel types:      {}", o.fuel_types.join(", "));
    println!("Vehicle classes: {}", o.vehicle_classes.join(", "));
    println!("Active filters:  {}\n", describe_criteria(dashboard.filters().criteria()));
}

fn handle_set_filter(dashboard: &mut Dashboard) {
    println!("Enter a filter as key=values (keys: year, month, state, fuel, class, electric).");
    println!("Leave the values empty to clear that filter, e.g. `state=`.");
    let Some(input) = read_line("Filter: ") else {
        return;
    };
    match FilterUpdate::parse_assignment(&input) {
        Ok(update) => {
            dashboard.filters_mut().set_filters(update);
            println!(
                "Active filters: {}\n",
                describe_criteria(dashboard.filters().criteria())
            );
        }
        Err(e) => println!("{}\n", e),
    }
}

fn handle_search_states(dashboard: &Dashboard) {
    let Some(query) = read_line("Search states: ") else {
        return;
    };
    let hits = search_options(&dashboard.options().states, &query);
    if hits.is_empty() {
        println!("No matching states.\n");
    } else {
        for state in hits {
            println!("  {}", state);
        }
        println!();
    }
}

fn handle_overview(dashboard: &mut Dashboard, preview_rows: usize) {
    let filtered = dashboard.filters().criteria().has_active_filters();
    let snapshot = dashboard.snapshot();
    if snapshot.overview.records == 0 {
        println!("No Data Found");
        println!("No vehicle registration records match your current filter criteria.");
        println!("Try adjusting your filters to see more data.\n");
        return;
    }

    println!(
        "{} Vehicle Registration Insights ({} records)\n",
        if filtered { "Filtered" } else { "Complete" },
        format_int(snapshot.overview.records)
    );
    output::preview_table_rows(&snapshot.stat_cards, snapshot.stat_cards.len());

    println!("Vehicle Registrations Over Time");
    output::preview_table_rows(&snapshot.time_series, preview_rows);
    println!("Fuel Type Usage Trends");
    output::preview_breakdown("Period", &snapshot.fuel_trends, preview_rows);
    println!("Vehicle Class Distribution by State");
    output::preview_breakdown("State", &snapshot.class_by_state, preview_rows);
    println!("Fuel Type Distribution");
    output::preview_table_rows(&snapshot.fuel_distribution, preview_rows);
    println!("Electric vs Non-Electric Registrations");
    output::preview_table_rows(&snapshot.electric_split.entries(), 2);

    let o = &snapshot.overview;
    println!("Quick Stats");
    println!("  Total States:    {}", o.states);
    println!("  Vehicle Classes: {}", o.vehicle_classes);
    println!("  Fuel Types:      {}", o.fuel_types);
    if let (Some(first), Some(last)) = (o.first_year, o.last_year) {
        println!("  Data Period:     {} - {}", first, last);
    }
    println!("  Total Registrations: {}", format_int(o.total_registrations));
    println!("  Coverage Period:     {} Years\n", o.coverage_years);
}

fn handle_insights(dashboard: &mut Dashboard) {
    let snapshot = dashboard.snapshot();
    for (idx, insight) in snapshot.insights.iter().enumerate() {
        println!("Key Insight #{}: {}", idx + 1, insight);
    }
    if let Some(change) = &snapshot.year_change {
        println!(
            "({} total {} vs {} total {}, {}%)",
            change.latest_year,
            format_int(change.latest_total),
            change.previous_year,
            format_int(change.previous_total),
            format_number(change.change_pct, 1)
        );
    }
    println!();
}

fn handle_export(dashboard: &mut Dashboard, dir: &Path) {
    let snapshot = dashboard.snapshot();
    match output::export_snapshot(dir, snapshot) {
        Ok(paths) => {
            for p in paths {
                println!("  wrote {}", p.display());
            }
            println!();
        }
        Err(e) => eprintln!("Export failed: {}\n", e),
    }
}

/// A missing export directory is created on export; an existing path that
/// is not a directory is rejected at startup.
fn check_export_dir(dir: &Path) -> Result<()> {
    match std::fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            bail!("export directory {} is not a directory", dir.display())
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e)
            .with_context(|| format!("cannot access export directory {}", dir.display())),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(io::stderr))
        .init();

    check_export_dir(&cli.export_dir)?;

    println!("Loading registration data from {} ...", cli.data.display());
    let mut dashboard = Dashboard::load(&cli.data);
    let report = dashboard.load_report().clone();
    if dashboard.records().is_empty() {
        warn!("No registration records available; the dashboard will show its empty state");
    } else {
        println!(
            "({} rows read, {} loaded, {} skipped, {} cells defaulted)\n",
            format_int(report.total_rows),
            format_int(report.loaded_rows),
            format_int(report.malformed_rows),
            format_int(report.defaulted_fields)
        );
    }
    dashboard
        .filters_mut()
        .subscribe(|c| info!(active = c.has_active_filters(), "Filters updated"));

    loop {
        println!("Vahan Analytics Dashboard");
        println!("[1] Show filter options");
        println!("[2] Set a filter");
        println!("[3] Search states");
        println!("[4] Reset filters");
        println!("[5] Show overview");
        println!("[6] Show insights");
        println!("[7] Export views");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_show_options(&dashboard),
            "2" => handle_set_filter(&mut dashboard),
            "3" => handle_search_states(&dashboard),
            "4" => {
                dashboard.filters_mut().reset_filters();
                println!("Filters reset.\n");
            }
            "5" => handle_overview(&mut dashboard, cli.preview_rows),
            "6" => handle_insights(&mut dashboard),
            "7" => handle_export(&mut dashboard, &cli.export_dir),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter a number from the menu.\n"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_dir_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_export_dir(dir.path()).is_ok());
        assert!(check_export_dir(&dir.path().join("not-yet")).is_ok());

        let file = tempfile::NamedTempFile::new().unwrap();
        let err = check_export_dir(file.path()).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }
}
