use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::InvalidObservationError;

/// One of the three measured growing conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measurement {
    Temperature,
    Humidity,
    Ph,
}

impl Measurement {
    /// Feature order shared by observations and the reference matrix.
    pub const ALL: [Measurement; 3] = [Self::Temperature, Self::Humidity, Self::Ph];

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Ph => "pH",
        }
    }

    /// Physically meaningful range, if the measurement has one.
    pub fn valid_range(&self) -> Option<RangeInclusive<f64>> {
        match self {
            Self::Temperature => None,
            Self::Humidity => Some(0.0..=100.0),
            Self::Ph => Some(0.0..=14.0),
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Measured conditions at one location, compared against the reference table.
///
/// Temperature is in °C, humidity is relative humidity in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
}

impl Observation {
    /// Build a validated observation.
    pub fn new(temperature: f64, humidity: f64, ph: f64) -> Result<Self, InvalidObservationError> {
        let observation = Self {
            temperature,
            humidity,
            ph,
        };
        observation.validate()?;
        Ok(observation)
    }

    /// Reject non-finite values and values outside their physical range.
    pub fn validate(&self) -> Result<(), InvalidObservationError> {
        for field in Measurement::ALL {
            let value = self.get(field);
            if !value.is_finite() {
                return Err(InvalidObservationError::NonFinite { field, value });
            }
            if let Some(range) = field.valid_range() {
                if !range.contains(&value) {
                    return Err(InvalidObservationError::OutOfRange { field, value });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, field: Measurement) -> f64 {
        match field {
            Measurement::Temperature => self.temperature,
            Measurement::Humidity => self.humidity,
            Measurement::Ph => self.ph,
        }
    }

    /// Values in matrix column order (temperature, humidity, ph)
    pub fn features(&self) -> [f64; 3] {
        [self.temperature, self.humidity, self.ph]
    }
}

/// A crop that made the cut, with the record it qualified through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCrop {
    pub label: String,
    /// Mean squared difference to the closest record carrying this label.
    pub score: f64,
    /// Row of that record in the reference table.
    pub record_index: usize,
}

/// Distinct crop labels ordered best match first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    crops: Vec<RankedCrop>,
}

impl Recommendation {
    pub(crate) fn new(crops: Vec<RankedCrop>) -> Self {
        Self { crops }
    }

    pub fn crops(&self) -> &[RankedCrop] {
        &self.crops
    }

    pub fn labels(&self) -> Vec<&str> {
        self.crops.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn into_labels(self) -> Vec<String> {
        self.crops.into_iter().map(|c| c.label).collect()
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedCrop> {
        self.crops.iter()
    }
}

impl<'a> IntoIterator for &'a Recommendation {
    type Item = &'a RankedCrop;
    type IntoIter = std::slice::Iter<'a, RankedCrop>;

    fn into_iter(self) -> Self::IntoIter {
        self.crops.iter()
    }
}
