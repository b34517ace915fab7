use crate::aggregate::{
    class_by_state, dataset_overview, electric_split, fuel_distribution, fuel_trends,
    peak_period, stat_cards, summary_stats, time_series, unique_values, year_over_year,
    TOP_STATES,
};
use crate::filter::filter_records;
use crate::insights::generate_insights;
use crate::loader::{load_or_empty, LoadReport};
use crate::state::FilterState;
use crate::types::{DashboardSnapshot, Record, UniqueValues};
use std::path::Path;
use tracing::debug;

/// The loaded dataset plus the filter store driving it.
///
/// Records and option lists are fixed at construction; only the filter
/// state changes afterwards.
#[derive(Debug)]
pub struct Dashboard {
    records: Vec<Record>,
    options: UniqueValues,
    load_report: LoadReport,
    filters: FilterState,
    cached: Option<DashboardSnapshot>,
}

impl Dashboard {
    pub fn new(records: Vec<Record>) -> Self {
        let load_report = LoadReport {
            total_rows: records.len(),
            loaded_rows: records.len(),
            ..LoadReport::default()
        };
        Self::with_report(records, load_report)
    }

    /// Load from `path`; a failed load produces an empty dashboard.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let (records, report) = load_or_empty(path);
        Self::with_report(records, report)
    }

    fn with_report(records: Vec<Record>, load_report: LoadReport) -> Self {
        let options = unique_values(&records);
        Self {
            records,
            options,
            load_report,
            filters: FilterState::new(),
            cached: None,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Filter option lists, always from the unfiltered collection.
    pub fn options(&self) -> &UniqueValues {
        &self.options
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    pub fn filtered(&self) -> Vec<Record> {
        filter_records(&self.records, self.filters.criteria())
    }

    /// All views for the current filters. Recomputed only when the filter
    /// revision moved since the last call.
    pub fn snapshot(&mut self) -> &DashboardSnapshot {
        let revision = self.filters.revision();
        let snapshot = match self.cached.take() {
            Some(s) if s.revision == revision => s,
            _ => self.compute(),
        };
        self.cached.insert(snapshot)
    }

    fn compute(&self) -> DashboardSnapshot {
        let filtered = self.filtered();
        debug!(
            revision = self.filters.revision(),
            records = filtered.len(),
            "Recomputing dashboard views"
        );
        DashboardSnapshot {
            revision: self.filters.revision(),
            criteria: self.filters.criteria().clone(),
            overview: dataset_overview(&filtered),
            summary: summary_stats(&filtered),
            year_change: year_over_year(&filtered),
            peak_period: peak_period(&filtered),
            stat_cards: stat_cards(&filtered),
            time_series: time_series(&filtered),
            fuel_trends: fuel_trends(&filtered),
            class_by_state: class_by_state(&filtered, TOP_STATES),
            fuel_distribution: fuel_distribution(&filtered),
            electric_split: electric_split(&filtered),
            insights: generate_insights(&filtered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::NO_DATA;
    use crate::types::FilterUpdate;

    fn rec(year: i32, month: u32, state: &str, fuel: &str, value: u64) -> Record {
        Record {
            year,
            month,
            state: state.to_string(),
            rto: String::new(),
            vehicle_class: "MOTOR CAR".to_string(),
            fuel: fuel.to_string(),
            value,
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(vec![
            rec(2021, 1, "KA", "PETROL", 10),
            rec(2021, 2, "MH", "ELECTRIC", 5),
            rec(2022, 1, "DL", "DIESEL", 7),
        ])
    }

    #[test]
    fn test_options_ignore_filters() {
        let mut d = dashboard();
        let before = d.options().clone();
        d.filters_mut().toggle_state("KA");
        assert_eq!(d.filtered().len(), 1);
        assert_eq!(d.options(), &before);
        assert_eq!(d.options().states, vec!["DL", "KA", "MH"]);
    }

    #[test]
    fn test_snapshot_tracks_revision() {
        let mut d = dashboard();
        assert_eq!(d.snapshot().revision, 0);
        assert_eq!(d.snapshot().summary.total_registrations, 22);

        d.filters_mut().set_filters(FilterUpdate {
            years: Some([2021].into()),
            ..Default::default()
        });
        let snap = d.snapshot();
        assert_eq!(snap.revision, 1);
        assert_eq!(snap.summary.total_registrations, 15);
        assert_eq!(snap.electric_split.electric, 5);
        assert!(snap.criteria.has_active_filters());
    }

    #[test]
    fn test_everything_filtered_out() {
        let mut d = dashboard();
        d.filters_mut().toggle_state("ZZ");
        let snap = d.snapshot();
        assert_eq!(snap.overview.records, 0);
        assert_eq!(snap.insights, vec![NO_DATA.to_string()]);
        assert!(snap.time_series.is_empty());
        assert_eq!(snap.stat_cards.len(), 4);
    }

    #[test]
    fn test_failed_load_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = Dashboard::load(dir.path().join("missing.csv"));
        assert!(d.records().is_empty());
        assert_eq!(d.options(), &UniqueValues::default());
        assert_eq!(d.snapshot().insights, vec![NO_DATA.to_string()]);
    }
}
