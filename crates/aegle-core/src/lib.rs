//! # aegle-core
//!
//! Core value model and comparison primitives shared by the Aegle policy
//! engine crates.
//!
//! This crate provides:
//! - [`Value`] - the closed set of runtime attribute types
//! - [`compare`] - encoding-tolerant equality and domain-checked ordering,
//!   string, and time comparisons
//! - [`time`] - instant parsing for the supported date/time encodings

pub mod compare;
pub mod time;
pub mod value;

pub use compare::{
    CompareError, Operand, StringOp, TimeOp, as_instant, as_uuid, compare_numbers,
    compare_strings, compare_times, robust_eq,
};
pub use time::{TimeError, format_instant, from_unix_seconds, parse_instant};
pub use value::Value;
