//! Forward geocoding: turn a free-text address into coordinates.
//! Uses the Google Maps Geocoding API.

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::http::{get_json, non_blank};
use crate::retry::RetryConfig;
use crate::types::{ConditionsError, Coordinates, LocationError};

pub const GOOGLE_MAPS_URL: &str = "https://maps.googleapis.com/maps/api";

const GEOCODE_PATH: &str = "/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// A resolved address.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub coordinates: Coordinates,
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl Geocoder {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: non_blank(api_key),
            retry,
        }
    }

    /// Resolve an address to the coordinates of its best match.
    #[instrument(skip(self), level = "info")]
    pub async fn geocode(&self, address: &str) -> Result<Place, ConditionsError> {
        let address = address.split_whitespace().collect::<Vec<_>>().join(" ");
        if address.is_empty() {
            return Err(LocationError::BlankAddress.into());
        }
        let key = self
            .api_key
            .as_deref()
            .ok_or(ConditionsError::MissingApiKey("Google geocoding"))?;

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), GEOCODE_PATH);
        let body: GeocodeResponse = get_json(&self.retry, || {
            self.client
                .get(&url)
                .query(&[("address", address.as_str()), ("key", key)])
        })
        .await?;

        match body.status.as_deref() {
            Some("OK") | None => {}
            Some("ZERO_RESULTS") => return Err(LocationError::NotFound(address).into()),
            Some(status) => {
                return Err(ConditionsError::Api {
                    status: 200,
                    message: body
                        .error_message
                        .unwrap_or_else(|| status.to_string()),
                })
            }
        }

        let best = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::NotFound(address.clone()))?;
        let coordinates = Coordinates::new(best.geometry.location.lat, best.geometry.location.lng)?;

        tracing::info!("Geocoded {:?} to {}", address, coordinates);
        Ok(Place {
            coordinates,
            formatted_address: best.formatted_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder_for(server: &MockServer) -> Geocoder {
        Geocoder::new(
            Client::new(),
            server.uri(),
            Some("maps-key".to_string()),
            RetryConfig::none(),
        )
    }

    #[tokio::test]
    async fn test_geocode_first_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .and(query_param("address", "1600 Amphitheatre Pkwy"))
            .and(query_param("key", "maps-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [
                    {
                        "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
                        "geometry": {"location": {"lat": 37.422, "lng": -122.084}}
                    },
                    {
                        "formatted_address": "Elsewhere",
                        "geometry": {"location": {"lat": 1.0, "lng": 1.0}}
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let place = geocoder_for(&mock_server)
            .geocode("  1600   Amphitheatre Pkwy ")
            .await
            .unwrap();

        assert_eq!(place.coordinates.latitude(), 37.422);
        assert_eq!(place.coordinates.longitude(), -122.084);
        assert!(place.formatted_address.unwrap().contains("Mountain View"));
    }

    #[tokio::test]
    async fn test_geocode_zero_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ZERO_RESULTS",
                "results": []
            })))
            .mount(&mock_server)
            .await;

        let result = geocoder_for(&mock_server).geocode("nowhere at all").await;
        assert!(matches!(
            result,
            Err(ConditionsError::Location(LocationError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_geocode_request_denied() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "results": []
            })))
            .mount(&mock_server)
            .await;

        let result = geocoder_for(&mock_server).geocode("Paris").await;
        match result {
            Err(ConditionsError::Api { message, .. }) => assert!(message.contains("API key")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_address_skips_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let result = geocoder_for(&mock_server).geocode("   ").await;
        assert!(matches!(
            result,
            Err(ConditionsError::Location(LocationError::BlankAddress))
        ));
    }
}
