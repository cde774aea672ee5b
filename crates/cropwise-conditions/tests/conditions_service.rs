//! Integration tests for ConditionsService using wiremock.

use cropwise_conditions::{
    ConditionsError, ConditionsService, Coordinates, MissingFieldError, RetryConfig, SoilClient,
    WeatherClient,
};
use cropwise_match::Measurement;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOIL_PATH: &str = "/soilgrids/v2.0/properties/query";
const WEATHER_PATH: &str = "/weather/history/daily/by-lat-lng";

fn soil_body(mean: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "properties": {"layers": [{
            "name": "phh2o",
            "unit_measure": {"d_factor": 10},
            "depths": [{"label": "0-5cm", "values": {"mean": mean}}]
        }]}
    })
}

fn weather_body(temperature: serde_json::Value, humidity: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "data": {"history": [{"temperature": temperature, "humidity": humidity}]}
    })
}

fn service_for(server: &MockServer) -> ConditionsService {
    let client = reqwest::Client::new();
    ConditionsService::new(
        SoilClient::new(
            client.clone(),
            format!("{}{}", server.uri(), SOIL_PATH),
            RetryConfig::none(),
        ),
        WeatherClient::new(
            client,
            server.uri(),
            Some("test-key".to_string()),
            RetryConfig::none(),
        ),
    )
}

async fn mount(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_complete_conditions() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, SOIL_PATH, soil_body(serde_json::json!(62))).await;
    mount(
        &mock_server,
        WEATHER_PATH,
        weather_body(serde_json::json!(25.5), serde_json::json!(0.8)),
    )
    .await;

    let coords = Coordinates::new(20.59, 78.96).unwrap();
    let site = service_for(&mock_server).fetch(&coords).await.unwrap();

    assert_eq!(site.coordinates, coords);
    assert_eq!(site.ph, Some(6.2));
    assert_eq!(site.temperature, Some(25.5));
    assert_eq!(site.humidity, Some(80.0));

    let obs = site.to_observation().unwrap();
    assert_eq!(obs.features(), [25.5, 80.0, 6.2]);
}

#[tokio::test]
async fn test_missing_ph_still_fetches_weather() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, SOIL_PATH, soil_body(serde_json::Value::Null)).await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(
            serde_json::json!(30.0),
            serde_json::Value::Null,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coords = Coordinates::new(0.0, -30.0).unwrap();
    let site = service_for(&mock_server).fetch(&coords).await.unwrap();

    assert_eq!(site.temperature, Some(30.0));
    assert_eq!(
        site.missing_fields(),
        vec![
            MissingFieldError(Measurement::Ph),
            MissingFieldError(Measurement::Humidity)
        ]
    );
    assert!(matches!(
        site.to_observation(),
        Err(ConditionsError::MissingField(MissingFieldError(Measurement::Ph)))
    ));
}

#[tokio::test]
async fn test_soil_outage_aborts_lookup() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SOIL_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let coords = Coordinates::new(10.0, 10.0).unwrap();
    let result = service_for(&mock_server).fetch(&coords).await;

    assert!(matches!(result, Err(ConditionsError::Api { status: 503, .. })));
}

#[test]
fn test_invalid_coordinates_never_reach_clients() {
    // Clients only accept validated Coordinates, so these fail before any request.
    assert!(Coordinates::new(95.0, 0.0).is_err());
    assert!(Coordinates::new(0.0, -200.0).is_err());
    assert!(Coordinates::parse("95", "0").is_err());
}
