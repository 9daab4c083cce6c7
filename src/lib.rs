//! # sitaware
//!
//! Situational awareness reports for threat-intelligence event feeds.
//!
//! A feed is a series of events, each owning a list of attributes and a list
//! of tags. sitaware flattens those nested lists into keyed tables, keeps the
//! events of a date window, counts attributes by category and type, and
//! renders the counts as a treemap with a matching HTML breakdown table.
//!
//! ## Pipeline
//!
//! - [`core`] parses the feed into [`core::Event`]s
//! - [`window`] validates the date window and filters dated rows
//! - [`flatten`] turns event children into [`flatten::FlatTable`]s
//! - [`aggregation`] counts rows per key tuple in first-seen order
//! - [`labels`] rebuilds the category → type nesting from the counts
//! - [`report`] renders the treemap and the table
//!
//! ## Example
//!
//! ```rust
//! use sitaware::aggregation::count_attributes_per_event_category_type;
//! use sitaware::core::parse_feed;
//! use sitaware::flatten::attributes_list_build;
//!
//! fn example() -> sitaware::Result<()> {
//!     let events = parse_feed(r#"{"response": {"1": {"id": "1", "Attribute": [
//!         {"category": "Network", "type": "ip"}]}}}"#)?;
//!     let attributes = attributes_list_build(&events);
//!     let counts = count_attributes_per_event_category_type(&attributes)?;
//!     assert_eq!(counts.get(&["1", "Network", "ip"]), Some(1));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::return_self_not_must_use)]

/// Feed records and the row abstraction shared by every table
pub mod core;

/// Report configuration
pub mod config;

/// Error types and result definitions
pub mod error;

/// Nested children into keyed tables
pub mod flatten;

/// Date parsing, window validation and range filtering
pub mod window;

/// Grouped counts
pub mod aggregation;

/// Category → type nesting for the treemap
pub mod labels;

/// Treemap and HTML table rendering
pub mod report;

/// End-to-end report runs
pub mod pipeline;

// Re-export commonly used types
pub use error::{DateError, Error, Result};
