//! Census geocoder client.

mod client;

pub use client::{CensusClient, Geocoder};
