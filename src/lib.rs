//! Noor Al-Huda Library
//!
//! Prayer times with a live countdown to the next prayer, plus Quran lookups.
//! The binary wires these modules into a terminal dashboard and a set of
//! print modes; integration tests use them directly.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod countdown;
pub mod data;
pub mod logging;
pub mod report;
pub mod ui;
