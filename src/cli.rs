//! Launch options for the terminal dashboard.

use std::path::PathBuf;

use clap::Parser;

/// Vahan registration dashboard
#[derive(Parser, Debug)]
#[command(name = "vahan_report")]
#[command(about = "Interactive vehicle-registration analytics dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Registration CSV with year, month, state, rto, vehicle_class, fuel, value columns
    #[arg(long, default_value = "data/vahan.csv")]
    pub data: PathBuf,

    /// Directory that exported views are written to
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Rows shown per table preview
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
