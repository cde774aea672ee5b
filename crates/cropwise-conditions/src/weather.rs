//! Recent temperature and humidity from the Ambee daily weather history API.

use chrono::{Days, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::http::{get_json, non_blank};
use crate::retry::RetryConfig;
use crate::types::{ConditionsError, Coordinates};

pub const AMBEE_URL: &str = "https://api.ambeedata.com";

const HISTORY_PATH: &str = "/weather/history/daily/by-lat-lng";
const DATE_FORMAT: &str = "%Y-%m-%d 00:00:00";

#[derive(Debug, Deserialize)]
struct AmbeeResponse {
    data: Option<AmbeeData>,
}

#[derive(Debug, Deserialize)]
struct AmbeeData {
    #[serde(default)]
    history: Vec<AmbeeDay>,
}

#[derive(Debug, Deserialize)]
struct AmbeeDay {
    temperature: Option<f64>,
    /// Fraction in [0, 1]
    humidity: Option<f64>,
}

/// Yesterday's weather at a location. Absent values mean no coverage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeatherReading {
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
}

impl From<AmbeeResponse> for WeatherReading {
    fn from(resp: AmbeeResponse) -> Self {
        let day = resp.data.and_then(|d| d.history.into_iter().next());
        match day {
            Some(day) => Self {
                temperature: day.temperature,
                humidity: day.humidity.map(|h| h * 100.0),
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl WeatherClient {
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

    /// Daily summary for the day before today (UTC).
    pub async fn daily_history(&self, coordinates: &Coordinates) -> Result<WeatherReading, ConditionsError> {
        self.daily_history_until(coordinates, Utc::now().date_naive())
            .await
    }

    /// Daily summary for the 24 hours ending at midnight starting `today`.
    #[instrument(skip(self), level = "info")]
    pub async fn daily_history_until(
        &self,
        coordinates: &Coordinates,
        today: NaiveDate,
    ) -> Result<WeatherReading, ConditionsError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ConditionsError::MissingApiKey("Ambee weather"))?;

        let yesterday = today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| ConditionsError::Parse(format!("no day before {}", today)))?;
        let from = yesterday.format(DATE_FORMAT).to_string();
        let to = today.format(DATE_FORMAT).to_string();
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), HISTORY_PATH);

        let body: AmbeeResponse = get_json(&self.retry, || {
            self.client
                .get(&url)
                .header("x-api-key", api_key)
                .query(&[("lat", coordinates.latitude()), ("lng", coordinates.longitude())])
                .query(&[("from", from.as_str()), ("to", to.as_str()), ("units", "si")])
        })
        .await?;

        let reading = WeatherReading::from(body);
        if reading.temperature.is_none() || reading.humidity.is_none() {
            tracing::warn!("Incomplete weather history at {}: {:?}", coordinates, reading);
        }
        Ok(reading)
    }
}
