//! Per-kind symbol extraction.
//!
//! Each extractor follows the same protocol: count the candidate, apply the
//! ignore filter, race for the ID through the database's reserve gate,
//! populate the symbol, publish it. Losers of the reservation race skip
//! silently; the match counters keep counting either way.

pub mod aliases;
pub mod enums;
pub mod functions;
pub mod namespaces;
pub mod records;
