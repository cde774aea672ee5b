use chrono::{DateTime, Utc};
use cropwise_match::{InvalidObservationError, Measurement, Observation};
use serde::Serialize;
use std::fmt;

/// Latitude/longitude that passed range validation.
///
/// Clients only accept this type, so an out-of-range position never
/// reaches a remote service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse coordinates typed by a user.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, LocationError> {
        let lat = parse_degrees(latitude)?;
        let lng = parse_degrees(longitude)?;
        Self::new(lat, lng)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

fn parse_degrees(raw: &str) -> Result<f64, LocationError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| LocationError::NotANumber(raw.to_string()))
}

/// Soil and weather measured for one location.
///
/// A `None` field means the upstream dataset had no coverage there; it is
/// never replaced by a default.
#[derive(Debug, Clone, Serialize)]
pub struct SiteConditions {
    pub coordinates: Coordinates,
    pub ph: Option<f64>,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl SiteConditions {
    /// Order in which fields are looked up and reported.
    pub const LOOKUP_ORDER: [Measurement; 3] =
        [Measurement::Ph, Measurement::Temperature, Measurement::Humidity];

    pub fn get(&self, field: Measurement) -> Option<f64> {
        match field {
            Measurement::Ph => self.ph,
            Measurement::Temperature => self.temperature,
            Measurement::Humidity => self.humidity,
        }
    }

    /// Every field the upstream services could not supply.
    pub fn missing_fields(&self) -> Vec<MissingFieldError> {
        Self::LOOKUP_ORDER
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .map(MissingFieldError)
            .collect()
    }

    /// Convert to an observation, failing on the first missing field.
    pub fn to_observation(&self) -> Result<Observation, ConditionsError> {
        let value = |field: Measurement| self.get(field).ok_or(MissingFieldError(field));
        let ph = value(Measurement::Ph)?;
        let temperature = value(Measurement::Temperature)?;
        let humidity = value(Measurement::Humidity)?;

        Ok(Observation::new(temperature, humidity, ph)?)
    }
}

/// An upstream dataset had no value for one measurement at this location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no {0} data for this location")]
pub struct MissingFieldError(pub Measurement);

impl MissingFieldError {
    pub fn field(&self) -> Measurement {
        self.0
    }

    pub fn user_message(&self) -> &'static str {
        match self.0 {
            Measurement::Ph => "No pH data for this region!",
            Measurement::Temperature => "No temperature data for this region!",
            Measurement::Humidity => "No humidity data for this region!",
        }
    }
}

/// Location resolution errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("{0:?} is not a number")]
    NotANumber(String),
    #[error("address is blank")]
    BlankAddress,
    #[error("no location found for {0:?}")]
    NotFound(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::LatitudeOutOfRange(_)
            | Self::LongitudeOutOfRange(_)
            | Self::NotANumber(_) => "Invalid coordinates. Try again.",
            Self::BlankAddress => "Enter an address.",
            Self::NotFound(_) => "Invalid address, please try again!",
        }
    }
}

/// Soil, weather and geocoding lookup errors
#[derive(Debug, thiserror::Error)]
pub enum ConditionsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    #[error("Measured value rejected: {0}")]
    InvalidReading(#[from] InvalidObservationError),
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
}

impl ConditionsError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) if e.is_timeout() => "The request timed out. Please try again.",
            Self::Network(_) => "Unable to connect. Check your internet connection.",
            Self::Api { status, .. } if *status >= 500 => {
                "A data service is experiencing issues. Please try again later."
            }
            Self::Api { .. } => "A data service rejected the request.",
            Self::Parse(_) => "Received an unexpected response. Please try again.",
            Self::MissingApiKey(_) => "An API key is missing. Check your settings.",
            Self::MissingField(e) => e.user_message(),
            Self::InvalidReading(_) => "The measured conditions for this location look wrong.",
            Self::Location(e) => e.user_message(),
        }
    }
}
