//! Work timer for a single desk: track elapsed time through the day, pin
//! slices of it onto named orders, get warned when the day runs long and pull
//! day-by-order reports out of the local store.
//!

pub mod cli;
pub mod config;
pub mod ledger;
pub mod report;
pub mod tracker;
pub mod utils;
