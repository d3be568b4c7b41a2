// src/arrivals/oba.rs

//! HTTP arrival source for OneBusAway-style servers.
//!
//! Only the fields the poll loop needs are decoded:
//! `data.entry.arrivalsAndDepartures[].{tripId, predictedArrivalTime,
//! scheduledArrivalTime, routeShortName}`.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::{ArrivalRecord, ArrivalSource, ArrivalsFuture};
use crate::config::ArrivalsSection;
use crate::errors::{Result, TripwatchError};

const OBA_OK: i32 = 200;

#[derive(Debug, Clone)]
pub struct ObaArrivalSource {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl ObaArrivalSource {
    pub fn new(cfg: &ArrivalsSection) -> Result<Self> {
        let base_url = Url::parse(&cfg.base_url).map_err(|e| {
            TripwatchError::ConfigError(format!("invalid arrivals.base_url '{}': {e}", cfg.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TripwatchError::ConfigError(format!(
                "arrivals.base_url '{}' cannot be used as a base URL",
                cfg.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| TripwatchError::ArrivalsError(format!("building HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: cfg.api_key.clone(),
        })
    }

    fn endpoint(&self, stop_id: &str) -> Result<Url> {
        let file = format!("{stop_id}.json");
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TripwatchError::ArrivalsError(format!("base URL {} has no path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "where", "arrivals-and-departures-for-stop", file.as_str()]);
        Ok(url)
    }

    async fn fetch(&self, stop_id: &str) -> Result<Vec<ArrivalRecord>> {
        let url = self.endpoint(stop_id)?;
        debug!(stop_id, %url, "querying arrivals");

        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TripwatchError::ArrivalsError(format!("stop {stop_id}: {e}")))?;

        let body: ObaResponse = response
            .json()
            .await
            .map_err(|e| TripwatchError::ArrivalsError(format!("stop {stop_id}: decoding body: {e}")))?;

        if body.code != OBA_OK {
            return Err(TripwatchError::ArrivalsError(format!(
                "stop {stop_id}: server returned code {} ({})",
                body.code, body.text
            )));
        }

        let arrivals = body
            .data
            .map(|d| d.entry.arrivals_and_departures)
            .unwrap_or_default();

        Ok(arrivals
            .into_iter()
            .map(|a| ArrivalRecord {
                trip_id: a.trip_id,
                predicted_ms: a.predicted_arrival_time,
                scheduled_ms: a.scheduled_arrival_time,
                route_short_name: a.route_short_name.filter(|s| !s.is_empty()),
            })
            .collect())
    }
}

impl ArrivalSource for ObaArrivalSource {
    fn query<'a>(&'a self, stop_id: &'a str) -> ArrivalsFuture<'a> {
        Box::pin(self.fetch(stop_id))
    }
}

#[derive(Debug, Deserialize)]
struct ObaResponse {
    code: i32,
    #[serde(default)]
    text: String,
    #[serde(default)]
    data: Option<ObaData>,
}

#[derive(Debug, Deserialize)]
struct ObaData {
    entry: ObaEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObaEntry {
    #[serde(default)]
    arrivals_and_departures: Vec<ObaArrival>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObaArrival {
    trip_id: String,
    #[serde(default)]
    predicted_arrival_time: i64,
    #[serde(default)]
    scheduled_arrival_time: i64,
    #[serde(default)]
    route_short_name: Option<String>,
}
