use anyhow::Result;
use std::sync::Arc;

use cropwise_conditions::{
    ConditionsService, Coordinates, Geocoder, MissingFieldError, Place, SiteConditions, SoilClient,
    WeatherClient,
};
use cropwise_match::{load_path, recommend, Observation, Recommendation, ReferenceTable};

use crate::{AppError, Config, ConfigError};

/// Everything one advisory request produced.
#[derive(Debug, Clone)]
pub struct Advice {
    pub conditions: SiteConditions,
    /// `None` when a measurement is missing; see `conditions.missing_fields()`.
    pub recommendation: Option<Recommendation>,
}

impl Advice {
    pub fn missing_fields(&self) -> Vec<MissingFieldError> {
        self.conditions.missing_fields()
    }
}

/// Application state: configuration, the reference table loaded once at
/// startup, and the upstream clients.
///
/// The table sits behind an `Arc` and is never mutated, so request handlers
/// on any thread can share it without locking.
pub struct App {
    config: Arc<Config>,
    table: Arc<ReferenceTable>,
    conditions: ConditionsService,
    geocoder: Geocoder,
}

impl App {
    /// Load and validate the user configuration, then the reference table.
    pub fn new() -> Result<Self> {
        let (config, _) = Config::load_validated()?;
        Ok(Self::from_config(config)?)
    }

    /// Build the application from an explicit config, reading the reference
    /// table from `config.data.reference_path`.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let table = load_path(&config.data.reference_path)?;
        Self::with_table(config, Arc::new(table))
    }

    /// Build the application around an already-loaded table.
    pub fn with_table(config: Config, table: Arc<ReferenceTable>) -> Result<Self, AppError> {
        if config.recommend.top_k == 0 {
            return Err(ConfigError::Invalid("recommend.top_k must be at least 1".into()).into());
        }

        let settings = config.network.client_settings();
        let client = settings.build_client()?;

        let conditions = ConditionsService::new(
            SoilClient::new(client.clone(), &config.soil.api_url, settings.retry.clone()),
            WeatherClient::new(
                client.clone(),
                &config.weather.api_url,
                config.weather.api_key.clone(),
                settings.retry.clone(),
            ),
        );
        let geocoder = Geocoder::new(
            client,
            &config.geocode.api_url,
            config.geocode.api_key.clone(),
            settings.retry,
        );

        tracing::info!(
            "Cropwise ready with {} reference records",
            table.len()
        );

        Ok(Self {
            config: Arc::new(config),
            table,
            conditions,
            geocoder,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared read-only handle to the reference table.
    pub fn table(&self) -> Arc<ReferenceTable> {
        Arc::clone(&self.table)
    }

    /// Resolve a free-text address.
    pub async fn locate(&self, address: &str) -> Result<Place, AppError> {
        Ok(self.geocoder.geocode(address).await?)
    }

    /// Fetch soil and weather for a location. Missing measurements stay
    /// `None`; check `missing_fields()` before building an observation.
    pub async fn site_conditions(&self, coordinates: &Coordinates) -> Result<SiteConditions, AppError> {
        Ok(self.conditions.fetch(coordinates).await?)
    }

    /// Rank crops for an observation. `top_k` overrides the configured count.
    pub fn recommend(&self, observation: &Observation, top_k: Option<usize>) -> Result<Recommendation, AppError> {
        let k = top_k.unwrap_or(self.config.recommend.top_k);
        Ok(recommend(&self.table, observation, k)?)
    }

    /// Full pipeline for one location. Missing measurements are not an
    /// error here: the conditions come back without a recommendation.
    pub async fn advise(&self, coordinates: &Coordinates, top_k: Option<usize>) -> Result<Advice, AppError> {
        let conditions = self.site_conditions(coordinates).await?;

        let recommendation = if conditions.missing_fields().is_empty() {
            let observation = conditions.to_observation()?;
            Some(self.recommend(&observation, top_k)?)
        } else {
            tracing::warn!(
                "Incomplete conditions at {}, skipping recommendation",
                conditions.coordinates
            );
            None
        };

        Ok(Advice {
            conditions,
            recommendation,
        })
    }
}
