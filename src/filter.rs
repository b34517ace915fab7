use crate::types::{FilterCriteria, Record};
use std::borrow::Borrow;
use std::collections::BTreeSet;

/// `true` when `set` is empty (unconstrained) or contains `value`.
fn accepts<K, T>(set: &BTreeSet<K>, value: &T) -> bool
where
    K: Borrow<T> + Ord,
    T: Ord + ?Sized,
{
    set.is_empty() || set.contains(value)
}

/// Whether a single record passes every dimension of `criteria`.
pub fn matches(record: &Record, criteria: &FilterCriteria) -> bool {
    accepts(&criteria.years, &record.year)
        && accepts(&criteria.months, &record.month)
        && accepts(&criteria.states, record.state.as_str())
        && accepts(&criteria.fuel_types, record.fuel.as_str())
        && accepts(&criteria.vehicle_classes, record.vehicle_class.as_str())
        && criteria
            .electric_only
            .map_or(true, |electric| record.is_electric() == electric)
}

/// Single pass over `records`, keeping those that match `criteria`.
///
/// Dimensions are AND-ed, values within a dimension are OR-ed. Values the
/// data never contains simply match nothing.
pub fn filter_records(records: &[Record], criteria: &FilterCriteria) -> Vec<Record> {
    records
        .iter()
        .filter(|r| matches(r, criteria))
        .cloned()
        .collect()
}
