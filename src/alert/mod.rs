//! Alert rules evaluated against the normalized forecast.
//!
//! Both rules are pure functions of their input table. Neither keeps state
//! between runs, and an empty result is a normal outcome rather than an
//! error: callers simply get `None` and skip reporting.

pub mod flood;
pub mod overseed;
