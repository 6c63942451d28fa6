//! One-line address lookups against the Census geocoding service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::models::Outcome;

const CENSUS_ENDPOINT: &str =
    "https://geocoding.geo.census.gov/geocoder/locations/onelineaddress";
const BENCHMARK: &str = "Public_AR_Current";

/// Resolves one free-text address to an [`Outcome`].
///
/// Implementations must fold every failure into the outcome; `resolve`
/// never errors past this boundary.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address: &str) -> Outcome;
}

/// Client for the Census one-line-address geocoder.
///
/// One attempt per address, no caching; identical addresses are each
/// resolved independently.
pub struct CensusClient {
    client: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct CensusResponse {
    result: CensusResult,
}

#[derive(Debug, Deserialize)]
struct CensusResult {
    #[serde(rename = "addressMatches", default)]
    address_matches: Vec<AddressMatch>,
}

#[derive(Debug, Deserialize)]
struct AddressMatch {
    coordinates: Coordinates,
}

/// Census reports longitude as `x` and latitude as `y`.
#[derive(Debug, Deserialize)]
struct Coordinates {
    x: f64,
    y: f64,
}

impl CensusClient {
    pub fn new() -> Self {
        Self::with_endpoint(
            CENSUS_ENDPOINT
                .parse()
                .expect("Census endpoint URL is valid"),
        )
    }

    /// Build a client against a non-default endpoint (test servers).
    pub fn with_endpoint(endpoint: Url) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Pinpoint/0.1 (batch geocoder)")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            endpoint,
        }
    }
}

impl Default for CensusClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for CensusClient {
    async fn resolve(&self, address: &str) -> Outcome {
        let response = match self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("address", address),
                ("benchmark", BENCHMARK),
                ("format", "json"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Geocode request failed: {}", e);
                return Outcome::ServiceError;
            }
        };

        if !response.status().is_success() {
            warn!("Geocoder returned status {}", response.status());
            return Outcome::ServiceError;
        }

        let data: CensusResponse = match response.json().await {
            Ok(d) => d,
            Err(e) => {
                warn!("Failed to parse geocoder response: {}", e);
                return Outcome::ServiceError;
            }
        };

        match data.result.address_matches.first() {
            Some(m) => Outcome::Matched {
                latitude: m.coordinates.y,
                longitude: m.coordinates.x,
            },
            None => Outcome::NoMatch,
        }
    }
}
