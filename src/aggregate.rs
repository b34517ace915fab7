//! Aggregation library: independent reducers over a (filtered) record slice.
//!
//! Every function is pure and recomputes from scratch. Grouping goes through
//! ordered maps so output never depends on hash iteration order. When two
//! groups tie on total, the lexicographically smaller label wins; that rule
//! covers every "top" pick and every descending sort here.

use crate::types::{
    BinarySplit, BreakdownRow, BreakdownTable, DatasetOverview, LabelTotal, Record, StatCard,
    SummaryStats, TimeSeriesPoint, Trend, UniqueValues, YearChange, NOT_AVAILABLE,
};
use crate::util::{format_int, percentage, period_start};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Number of states kept by [`class_by_state`].
pub const TOP_STATES: usize = 10;

/// Counts add saturating, so oversized cells pin at `u64::MAX` instead of
/// overflowing.
fn add_counts(counts: impl IntoIterator<Item = u64>) -> u64 {
    counts.into_iter().fold(0, u64::saturating_add)
}

/// Sum `value` per key.
pub fn sum_by<'a, K, F>(records: &'a [Record], key: F) -> BTreeMap<K, u64>
where
    K: Ord,
    F: Fn(&'a Record) -> K,
{
    let mut map: BTreeMap<K, u64> = BTreeMap::new();
    for r in records {
        let slot = map.entry(key(r)).or_default();
        *slot = slot.saturating_add(r.value);
    }
    map
}

/// Sorted, de-duplicated values of one dimension.
pub fn distinct<'a, K, F>(records: &'a [Record], key: F) -> Vec<K>
where
    K: Ord,
    F: Fn(&'a Record) -> K,
{
    records.iter().map(key).collect::<BTreeSet<_>>().into_iter().collect()
}

/// Explicit union pass for breakdown columns: every category the input
/// contains, sorted.
pub fn observed_categories<'a, F>(records: &'a [Record], key: F) -> Vec<String>
where
    F: Fn(&'a Record) -> &'a str,
{
    distinct(records, key).into_iter().map(str::to_string).collect()
}

fn by_total_desc(a: &LabelTotal, b: &LabelTotal) -> Ordering {
    b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label))
}

/// Highest-total entry of a grouping, ties to the smallest key.
pub fn leader<K: ToString>(groups: &BTreeMap<K, u64>) -> Option<LabelTotal> {
    let mut best: Option<(&K, u64)> = None;
    // Ascending key order plus a strict comparison keeps the first
    // (smallest) key among equal totals.
    for (k, total) in groups {
        if best.map_or(true, |(_, t)| *total > t) {
            best = Some((k, *total));
        }
    }
    best.map(|(k, total)| LabelTotal { label: k.to_string(), total })
}

/// Option lists for the filter sidebar. Callers pass the full, unfiltered
/// collection so the lists stay stable as filters change.
pub fn unique_values(records: &[Record]) -> UniqueValues {
    UniqueValues {
        years: distinct(records, |r| r.year),
        months: distinct(records, |r| r.month),
        states: observed_categories(records, |r| r.state.as_str()),
        fuel_types: observed_categories(records, |r| r.fuel.as_str()),
        vehicle_classes: observed_categories(records, |r| r.vehicle_class.as_str()),
    }
}

pub fn total_registrations(records: &[Record]) -> u64 {
    add_counts(records.iter().map(|r| r.value))
}

pub fn summary_stats(records: &[Record]) -> SummaryStats {
    SummaryStats {
        total_registrations: total_registrations(records),
        top_fuel: leader(&sum_by(records, |r| r.fuel.as_str())),
        top_vehicle_class: leader(&sum_by(records, |r| r.vehicle_class.as_str())),
        top_state: leader(&sum_by(records, |r| r.state.as_str())),
    }
}

pub fn yearly_totals(records: &[Record]) -> BTreeMap<i32, u64> {
    sum_by(records, |r| r.year)
}

/// Compare the latest year present against the one before it. `None` with
/// fewer than two distinct years.
pub fn year_over_year(records: &[Record]) -> Option<YearChange> {
    let yearly = yearly_totals(records);
    let mut recent = yearly.iter().rev();
    let (&latest_year, &latest_total) = recent.next()?;
    let (&previous_year, &previous_total) = recent.next()?;
    let change_pct = percentage(
        latest_total as f64 - previous_total as f64,
        previous_total as f64,
    );
    Some(YearChange {
        previous_year,
        previous_total,
        latest_year,
        latest_total,
        change_pct,
    })
}

/// Monthly totals keyed `YYYY-MM`, in key order like every other period view.
pub fn time_series(records: &[Record]) -> Vec<TimeSeriesPoint> {
    let mut periods: BTreeMap<String, TimeSeriesPoint> = BTreeMap::new();
    for r in records {
        let point = periods.entry(r.period_key()).or_insert_with_key(|period| TimeSeriesPoint {
            period: period.clone(),
            total: 0,
            date: period_start(r.year, r.month),
        });
        point.total = point.total.saturating_add(r.value);
    }
    periods.into_values().collect()
}

/// The single busiest `YYYY-MM` period; ties go to the earliest period.
pub fn peak_period(records: &[Record]) -> Option<LabelTotal> {
    leader(&sum_by(records, Record::period_key))
}

/// Generic cross-tab: one row per `row_key`, one column per observed
/// `col_key`, with zero-filled cells and a row total.
pub fn breakdown<'a, R, C>(records: &'a [Record], row_key: R, col_key: C) -> BreakdownTable
where
    R: Fn(&'a Record) -> String,
    C: Fn(&'a Record) -> &'a str,
{
    let categories = observed_categories(records, &col_key);

    let mut cells: BTreeMap<String, BTreeMap<&str, u64>> = BTreeMap::new();
    for r in records {
        let cell = cells.entry(row_key(r)).or_default().entry(col_key(r)).or_default();
        *cell = cell.saturating_add(r.value);
    }

    let rows = cells
        .into_iter()
        .map(|(label, seen)| {
            let breakdown: BTreeMap<String, u64> = categories
                .iter()
                .map(|c| (c.clone(), seen.get(c.as_str()).copied().unwrap_or(0)))
                .collect();
            let total = add_counts(breakdown.values().copied());
            BreakdownRow { label, total, breakdown }
        })
        .collect();

    BreakdownTable { categories, rows }
}

/// Per-period fuel mix, rows in chronological order.
pub fn fuel_trends(records: &[Record]) -> BreakdownTable {
    breakdown(records, Record::period_key, |r| r.fuel.as_str())
}

/// Vehicle classes per state, the `top_n` states by total. Sorting happens
/// before truncation.
pub fn class_by_state(records: &[Record], top_n: usize) -> BreakdownTable {
    let mut table = breakdown(records, |r| r.state.clone(), |r| r.vehicle_class.as_str());
    table
        .rows
        .sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    table.rows.truncate(top_n);
    table
}

/// Totals of one category dimension, largest first.
pub fn distribution_by<'a, F>(records: &'a [Record], key: F) -> Vec<LabelTotal>
where
    F: Fn(&'a Record) -> &'a str,
{
    let mut rows: Vec<LabelTotal> = sum_by(records, key)
        .into_iter()
        .map(|(label, total)| LabelTotal { label: label.to_string(), total })
        .collect();
    rows.sort_by(by_total_desc);
    rows
}

pub fn fuel_distribution(records: &[Record]) -> Vec<LabelTotal> {
    distribution_by(records, |r| r.fuel.as_str())
}

/// Electric vs everything else. The non-electric side is the remainder of
/// the grand total so the two always add up to it.
pub fn electric_split(records: &[Record]) -> BinarySplit {
    let total = total_registrations(records);
    let electric = add_counts(records.iter().filter(|r| r.is_electric()).map(|r| r.value));
    BinarySplit {
        electric,
        non_electric: total.saturating_sub(electric),
    }
}

/// Electric share of all registrations, in percent.
pub fn electric_share(records: &[Record]) -> f64 {
    let split = electric_split(records);
    percentage(
        split.electric as f64,
        split.electric.saturating_add(split.non_electric) as f64,
    )
}

pub fn dataset_overview(records: &[Record]) -> DatasetOverview {
    let first_year = records.iter().map(|r| r.year).min();
    let last_year = records.iter().map(|r| r.year).max();
    let coverage_years = match (first_year, last_year) {
        (Some(first), Some(last)) => {
            u32::try_from(i64::from(last) - i64::from(first) + 1).unwrap_or(0)
        }
        _ => 0,
    };
    DatasetOverview {
        records: records.len(),
        total_registrations: total_registrations(records),
        states: distinct(records, |r| r.state.as_str()).len(),
        vehicle_classes: distinct(records, |r| r.vehicle_class.as_str()).len(),
        fuel_types: distinct(records, |r| r.fuel.as_str()).len(),
        first_year,
        last_year,
        coverage_years,
    }
}

/// The four headline cards, rendered for display.
pub fn stat_cards(records: &[Record]) -> Vec<StatCard> {
    let summary = summary_stats(records);
    let total = summary.total_registrations;

    let (total_detail, total_trend) = match year_over_year(records) {
        Some(change) => (
            format!("{:+.1}% vs {}", change.change_pct, change.previous_year),
            if change.change_pct > 0.0 {
                Trend::Up
            } else if change.change_pct < 0.0 {
                Trend::Down
            } else {
                Trend::Neutral
            },
        ),
        None => ("No prior year".to_string(), Trend::Neutral),
    };

    vec![
        StatCard {
            title: "Total Registered Vehicles".to_string(),
            value: format_int(total),
            detail: total_detail,
            trend: total_trend,
        },
        leader_card("Top Fuel Type", summary.top_fuel.as_ref(), |n| {
            format!("{} vehicles", format_int(n))
        }),
        leader_card("Most Popular Vehicle Class", summary.top_vehicle_class.as_ref(), |n| {
            format!("{:.1}% share", percentage(n as f64, total as f64))
        }),
        leader_card("Leading State", summary.top_state.as_ref(), |n| {
            format!("{} registrations", format_int(n))
        }),
    ]
}

fn leader_card(
    title: &str,
    leader: Option<&LabelTotal>,
    detail: impl Fn(u64) -> String,
) -> StatCard {
    StatCard {
        title: title.to_string(),
        value: leader.map_or_else(|| NOT_AVAILABLE.to_string(), |l| l.label.clone()),
        detail: leader.map_or_else(|| "No data".to_string(), |l| detail(l.total)),
        trend: Trend::Neutral,
    }
}
