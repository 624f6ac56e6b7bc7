//! # Epidemic History Builder
//!
//! A library for reconciling free-text place names from daily epidemic
//! case-count feeds against a canonical administrative-region hierarchy and
//! accumulating a per-region time series of confirmed case counts.
//!
//! ## Core Concepts
//!
//! - **Region tree**: a two-level hierarchy (provinces owning child regions)
//!   built once from the canonical region list
//! - **Matching heuristics**: exact name, administrative-suffix guessing,
//!   autonomous-area prefix search, and a manual correction table, tried in
//!   order until one resolves a raw report row to a canonical node
//! - **Priming / Continuing**: the first processed day creates a series entry
//!   per matched region; every later day only appends to existing entries
//! - **Countdown**: the walk runs backward in calendar time, from yesterday
//!   (UTC+8) down to the fixed origin date `2020-01-23`
//!
//! All I/O goes through the injected [`DataSource`] trait; the matching and
//! accumulation core is pure and synchronous.
//!
//! ## Example
//!
//! ```rust,ignore
//! use epidemic_history_builder::{build_history, HistoryBuilder};
//! use epidemic_history_builder::fetch::HttpSource;
//!
//! // one-shot: walk all the way back to the origin date
//! let store = build_history(HttpSource::new())?;
//! assert!(store.ready);
//!
//! // or advance day by day, e.g. between UI updates
//! let mut builder = HistoryBuilder::initialize(HttpSource::new())?;
//! while builder.advance()? {
//!     let store = builder.store();
//!     println!("{} days, {} regions", store.dates.len(), store.data.len());
//! }
//! ```

pub mod driver;
pub mod error;
pub mod ingestion;
pub mod matcher;
pub mod region_tree;
pub mod schema;
pub mod store;
pub mod translate;
pub mod walker;

#[cfg(feature = "http")]
pub mod fetch;

pub use driver::{build_history, DataSource, HistoryBuilder};
pub use error::{EpidemicHistoryError, Result};
pub use ingestion::*;
pub use matcher::{match_child, match_province, MatchOutcome};
pub use region_tree::{RegionNode, RegionTree};
pub use schema::*;
pub use store::{CaseStore, SeriesEntry, StoreEvent};
pub use translate::*;
pub use walker::{origin_date, to_iso, Countdown, ORIGIN_DATE};

#[cfg(feature = "http")]
pub use fetch::HttpSource;
