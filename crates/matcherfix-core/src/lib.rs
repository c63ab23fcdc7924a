//! Typed configuration model and semantic equivalence for Alertmanager
//! configurations.
//!
//! This crate provides:
//! - [`Config`], an order-blind parse of a configuration document
//! - the [`Diff`] trait, a deep comparator that reports every differing path
//! - [`equivalent`], which compares two descriptors without looking at how
//!   their YAML is laid out
//!
//! Core invariants:
//! - Mapping key order, quoting style and matcher order never matter
//! - A `null` field, an empty list and an absent field are the same
//! - A document that fails to parse is reported as an error, never as a diff
//!
#![deny(missing_docs)]

/// Typed configuration sections.
pub mod config;
/// Deep comparison with path reporting.
pub mod diff;
/// Equivalence checking between two configurations.
pub mod equivalence;
/// Error types for configuration loading and comparison.
pub mod errors;
/// Time interval definitions.
pub mod timeinterval;
/// Order-blind generic values.
pub mod value;

pub use config::{Config, GlobalConfig, Receiver};
pub use diff::{Diff, Difference, Path};
pub use equivalence::{equivalent, equivalent_text, Equivalence};
pub use errors::{ConfigError, Document, EquivalenceError};
pub use timeinterval::{
    DayOfMonthRange, MonthRange, TimeInterval, TimeIntervalSpec, TimeRange, WeekdayRange,
    YearRange,
};
pub use value::Value;
