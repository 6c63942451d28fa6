//! Pinpoint - batch geocoding for provider address tables
//!
//! This library provides shared types and modules for the geocode binary.

pub mod batch;
pub mod census;
pub mod models;
pub mod table;

pub use census::{CensusClient, Geocoder};
pub use models::{BatchReport, Outcome};
