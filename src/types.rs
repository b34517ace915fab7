use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tabled::Tabled;

/// Fuel label that marks a registration as electric.
pub const ELECTRIC_FUEL: &str = "ELECTRIC";

/// Placeholder rendered wherever a "top X" pick has nothing to pick from.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column names the loader looks up in the header row.
pub const EXPECTED_COLUMNS: [&str; 7] =
    ["year", "month", "state", "rto", "vehicle_class", "fuel", "value"];

/// One CSV row exactly as it appears in the source, before coercion.
///
/// Every field is optional so a missing column or an empty cell never fails
/// deserialization; the loader decides the default for each one.
#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub rto: Option<String>,
    #[serde(default)]
    pub vehicle_class: Option<String>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// A typed vehicle-registration row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub year: i32,
    pub month: u32,
    pub state: String,
    pub rto: String,
    pub vehicle_class: String,
    pub fuel: String,
    pub value: u64,
}

impl Record {
    /// `YYYY-MM` key with the month zero-padded, so keys sort chronologically.
    pub fn period_key(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    pub fn is_electric(&self) -> bool {
        self.fuel == ELECTRIC_FUEL
    }
}

/// The user's current inclusion constraints.
///
/// An empty set leaves its dimension unconstrained. `electric_only` is a
/// tri-state: `None` keeps both, `Some(true)` keeps electric fuel only,
/// `Some(false)` drops electric fuel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub years: BTreeSet<i32>,
    pub months: BTreeSet<u32>,
    pub states: BTreeSet<String>,
    pub fuel_types: BTreeSet<String>,
    pub vehicle_classes: BTreeSet<String>,
    pub electric_only: Option<bool>,
}

impl FilterCriteria {
    pub fn has_active_filters(&self) -> bool {
        !self.years.is_empty()
            || !self.months.is_empty()
            || !self.states.is_empty()
            || !self.fuel_types.is_empty()
            || !self.vehicle_classes.is_empty()
            || self.electric_only.is_some()
    }
}

/// A partial update to [`FilterCriteria`]. Fields left as `None` are kept.
///
/// `electric_only` is doubly optional: `Some(None)` clears the toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub years: Option<BTreeSet<i32>>,
    pub months: Option<BTreeSet<u32>>,
    pub states: Option<BTreeSet<String>>,
    pub fuel_types: Option<BTreeSet<String>>,
    pub vehicle_classes: Option<BTreeSet<String>>,
    pub electric_only: Option<Option<bool>>,
}

/// Distinct values per dimension, sorted ascending, for filter option lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UniqueValues {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub states: Vec<String>,
    pub fuel_types: Vec<String>,
    pub vehicle_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct LabelTotal {
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct TimeSeriesPoint {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: u64,
    /// First day of the period; `None` when year/month is not a real date.
    #[serde(rename = "Date")]
    #[tabled(skip)]
    pub date: Option<NaiveDate>,
}

/// One row of a cross-tab: a label, its total and per-category sub-totals.
///
/// `breakdown` holds every category of the owning [`BreakdownTable`], with
/// `0` for categories the row never saw, and `total` is their sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub label: String,
    pub total: u64,
    pub breakdown: BTreeMap<String, u64>,
}

/// Cross-tab whose column set is the union of categories observed in the
/// input, so it varies with the current filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BreakdownTable {
    pub categories: Vec<String>,
    pub rows: Vec<BreakdownRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BinarySplit {
    pub electric: u64,
    pub non_electric: u64,
}

impl BinarySplit {
    pub fn entries(&self) -> Vec<LabelTotal> {
        vec![
            LabelTotal { label: "Electric".to_string(), total: self.electric },
            LabelTotal { label: "Non-Electric".to_string(), total: self.non_electric },
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total_registrations: u64,
    pub top_fuel: Option<LabelTotal>,
    pub top_vehicle_class: Option<LabelTotal>,
    pub top_state: Option<LabelTotal>,
}

/// Change between the two most recent years present in the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearChange {
    pub previous_year: i32,
    pub previous_total: u64,
    pub latest_year: i32,
    pub latest_total: u64,
    /// Percent change; `0` when the previous year's total is zero.
    pub change_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StatCard {
    #[serde(rename = "Title")]
    #[tabled(rename = "Title")]
    pub title: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Detail")]
    #[tabled(rename = "Detail")]
    pub detail: String,
    #[serde(rename = "Trend")]
    #[tabled(rename = "Trend")]
    pub trend: Trend,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetOverview {
    pub records: usize,
    pub total_registrations: u64,
    pub states: usize,
    pub vehicle_classes: usize,
    pub fuel_types: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub coverage_years: u32,
}

/// Every derived view for one filter state, as handed to the front end.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub revision: u64,
    pub criteria: FilterCriteria,
    pub overview: DatasetOverview,
    pub summary: SummaryStats,
    pub year_change: Option<YearChange>,
    pub peak_period: Option<LabelTotal>,
    pub stat_cards: Vec<StatCard>,
    pub time_series: Vec<TimeSeriesPoint>,
    pub fuel_trends: BreakdownTable,
    pub class_by_state: BreakdownTable,
    pub fuel_distribution: Vec<LabelTotal>,
    pub electric_split: BinarySplit,
    pub insights: Vec<String>,
}
