//! Filter state store.
//!
//! Holds the current [`FilterCriteria`] and applies field-scoped updates.
//! The store is an ordinary owned value: the front end keeps it and hands
//! `criteria()` to the filter engine, so aggregation never reaches for
//! global state.

use crate::error::{Error, Result};
use crate::types::{FilterCriteria, FilterUpdate};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

type Listener = Box<dyn FnMut(&FilterCriteria)>;

#[derive(Default)]
pub struct FilterState {
    criteria: FilterCriteria,
    revision: u64,
    listeners: Vec<Listener>,
}

impl fmt::Debug for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterState")
            .field("criteria", &self.criteria)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Bumped on every mutation; lets callers tell whether derived views
    /// are stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a callback invoked with the new criteria after each change.
    pub fn subscribe(&mut self, listener: impl FnMut(&FilterCriteria) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Merge `update` into the current criteria, replacing only the fields it
    /// carries. Last writer wins per field.
    pub fn set_filters(&mut self, update: FilterUpdate) {
        let FilterUpdate {
            years,
            months,
            states,
            fuel_types,
            vehicle_classes,
            electric_only,
        } = update;
        let c = &mut self.criteria;
        if let Some(v) = years {
            c.years = v;
        }
        if let Some(v) = months {
            c.months = v;
        }
        if let Some(v) = states {
            c.states = v;
        }
        if let Some(v) = fuel_types {
            c.fuel_types = v;
        }
        if let Some(v) = vehicle_classes {
            c.vehicle_classes = v;
        }
        if let Some(v) = electric_only {
            c.electric_only = v;
        }
        self.changed();
    }

    /// Restore the all-unconstrained defaults.
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.changed();
    }

    pub fn toggle_year(&mut self, year: i32) {
        let years = toggled(&self.criteria.years, year);
        self.set_filters(FilterUpdate { years: Some(years), ..Default::default() });
    }

    pub fn toggle_month(&mut self, month: u32) {
        let months = toggled(&self.criteria.months, month);
        self.set_filters(FilterUpdate { months: Some(months), ..Default::default() });
    }

    pub fn toggle_state(&mut self, state: &str) {
        let states = toggled(&self.criteria.states, state.to_string());
        self.set_filters(FilterUpdate { states: Some(states), ..Default::default() });
    }

    pub fn toggle_fuel(&mut self, fuel: &str) {
        let fuel_types = toggled(&self.criteria.fuel_types, fuel.to_string());
        self.set_filters(FilterUpdate { fuel_types: Some(fuel_types), ..Default::default() });
    }

    pub fn toggle_vehicle_class(&mut self, class: &str) {
        let vehicle_classes = toggled(&self.criteria.vehicle_classes, class.to_string());
        self.set_filters(FilterUpdate {
            vehicle_classes: Some(vehicle_classes),
            ..Default::default()
        });
    }

    pub fn set_electric_only(&mut self, electric_only: Option<bool>) {
        self.set_filters(FilterUpdate {
            electric_only: Some(electric_only),
            ..Default::default()
        });
    }

    fn changed(&mut self) {
        self.revision += 1;
        debug!(revision = self.revision, criteria = ?self.criteria, "Filters changed");
        for listener in &mut self.listeners {
            listener(&self.criteria);
        }
    }
}

fn toggled<T: Ord + Clone>(set: &BTreeSet<T>, value: T) -> BTreeSet<T> {
    let mut next = set.clone();
    if !next.remove(&value) {
        next.insert(value);
    }
    next
}

impl FilterUpdate {
    /// Parse a `key=v1,v2` assignment typed into the terminal front end.
    ///
    /// An empty value list clears the dimension. `electric` takes `only`,
    /// `exclude` or `all`.
    pub fn parse_assignment(input: &str) -> Result<FilterUpdate> {
        let (key, values) = input
            .split_once('=')
            .ok_or_else(|| Error::InvalidFilter(format!("expected key=values, got '{}'", input)))?;
        let key = key.trim().to_ascii_lowercase();
        let items: Vec<&str> = values
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let mut update = FilterUpdate::default();
        match key.as_str() {
            "year" | "years" => update.years = Some(parse_numbers(&key, &items)?),
            "month" | "months" => update.months = Some(parse_numbers(&key, &items)?),
            "state" | "states" => update.states = Some(to_labels(&items)),
            "fuel" | "fuels" => update.fuel_types = Some(to_labels(&items)),
            "class" | "classes" => update.vehicle_classes = Some(to_labels(&items)),
            "electric" => {
                let mode = items.first().map(|s| s.to_ascii_lowercase());
                update.electric_only = Some(match mode.as_deref() {
                    None | Some("all") => None,
                    Some("only") => Some(true),
                    Some("exclude") => Some(false),
                    Some(other) => {
                        return Err(Error::InvalidFilter(format!(
                            "electric expects only, exclude or all, got '{}'",
                            other
                        )))
                    }
                });
            }
            other => {
                return Err(Error::InvalidFilter(format!("unknown filter '{}'", other)));
            }
        }
        Ok(update)
    }
}

fn parse_numbers<T: std::str::FromStr + Ord>(key: &str, items: &[&str]) -> Result<BTreeSet<T>> {
    items
        .iter()
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| Error::InvalidFilter(format!("{} expects numbers, got '{}'", key, s)))
        })
        .collect()
}

fn to_labels(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Case-insensitive substring search over an option list, as used by the
/// state picker. An empty query returns every option.
pub fn search_options<'a>(options: &'a [String], query: &str) -> Vec<&'a String> {
    let needle = query.trim().to_lowercase();
    options
        .iter()
        .filter(|o| o.to_lowercase().contains(&needle))
        .collect()
}
