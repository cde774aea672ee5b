use chrono::Utc;

use crate::soil::SoilClient;
use crate::types::{ConditionsError, Coordinates, SiteConditions};
use crate::weather::WeatherClient;

/// Looks up soil and weather for a location and collects them into
/// [`SiteConditions`].
#[derive(Debug, Clone)]
pub struct ConditionsService {
    soil: SoilClient,
    weather: WeatherClient,
}

impl ConditionsService {
    pub fn new(soil: SoilClient, weather: WeatherClient) -> Self {
        Self { soil, weather }
    }

    /// Fetch every measurement for `coordinates`.
    ///
    /// A dataset with no coverage leaves its field `None` and the remaining
    /// lookups still run, so the caller can report every gap at once.
    /// Transport and API failures abort the whole lookup.
    pub async fn fetch(&self, coordinates: &Coordinates) -> Result<SiteConditions, ConditionsError> {
        let ph = self.soil.topsoil_ph(coordinates).await?;
        let weather = self.weather.daily_history(coordinates).await?;

        Ok(SiteConditions {
            coordinates: *coordinates,
            ph,
            temperature: weather.temperature,
            humidity: weather.humidity,
            fetched_at: Utc::now(),
        })
    }
}
