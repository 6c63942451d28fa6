//! Scripted, instrumented geocoder for pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::census::Geocoder;
use crate::models::Outcome;

/// Maps exact addresses to canned outcomes (unmapped addresses resolve to
/// `NoMatch`) and records the maximum number of concurrently in-flight
/// resolves it ever observed.
pub(crate) struct ScriptedGeocoder {
    responses: HashMap<String, Outcome>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGeocoder {
    pub(crate) fn new(responses: &[(&str, Outcome)]) -> Self {
        Self::with_delay(responses, Duration::ZERO)
    }

    pub(crate) fn with_delay(responses: &[(&str, Outcome)], delay: Duration) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(address, outcome)| (address.to_string(), *outcome))
                .collect(),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn resolve(&self, address: &str) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.responses
            .get(address)
            .copied()
            .unwrap_or(Outcome::NoMatch)
    }
}
