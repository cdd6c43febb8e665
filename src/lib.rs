//! Statistics CSV Library
//!
//! Formats decoder sampling statistics (shots, errors, discards, elapsed
//! time, decoder name, task identifier, JSON metadata and custom counters)
//! as deterministic, injection-safe CSV lines with a matching header.

pub mod csv_handler;
pub mod error;
