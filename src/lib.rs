//! Vehicle-registration analytics: load a registration CSV once, filter it
//! along year, month, state, fuel and vehicle class, and derive the totals,
//! trends, cross-tabs and insight sentences a dashboard renders.
pub mod aggregate;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod insights;
pub mod loader;
pub mod output;
pub mod state;
pub mod types;
pub mod util;

pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use state::FilterState;
pub use types::{FilterCriteria, FilterUpdate, Record};
