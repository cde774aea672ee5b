//! Topsoil pH from the ISRIC SoilGrids properties API.

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::http::get_json;
use crate::retry::RetryConfig;
use crate::types::{ConditionsError, Coordinates};

pub const SOILGRIDS_URL: &str = "https://rest.isric.org/soilgrids/v2.0/properties/query";

const PH_PROPERTY: &str = "phh2o";
const TOP_DEPTH: &str = "0-5cm";
/// SoilGrids reports pH multiplied by this unless the layer says otherwise.
const DEFAULT_PH_FACTOR: f64 = 10.0;

#[derive(Debug, Deserialize)]
struct SoilResponse {
    properties: Option<SoilProperties>,
}

#[derive(Debug, Deserialize)]
struct SoilProperties {
    #[serde(default)]
    layers: Vec<SoilLayer>,
}

#[derive(Debug, Deserialize)]
struct SoilLayer {
    name: String,
    unit_measure: Option<UnitMeasure>,
    #[serde(default)]
    depths: Vec<SoilDepth>,
}

#[derive(Debug, Deserialize)]
struct UnitMeasure {
    d_factor: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SoilDepth {
    label: Option<String>,
    values: SoilValues,
}

#[derive(Debug, Deserialize)]
struct SoilValues {
    mean: Option<f64>,
}

impl SoilResponse {
    /// Mean topsoil pH, or `None` where SoilGrids has no coverage.
    fn topsoil_ph(&self) -> Option<f64> {
        let layer = self
            .properties
            .as_ref()?
            .layers
            .iter()
            .find(|l| l.name == PH_PROPERTY)?;

        let depth = layer
            .depths
            .iter()
            .find(|d| d.label.as_deref() == Some(TOP_DEPTH))
            .or_else(|| layer.depths.first())?;

        let factor = layer
            .unit_measure
            .as_ref()
            .and_then(|u| u.d_factor)
            .filter(|f| *f > 0.0)
            .unwrap_or(DEFAULT_PH_FACTOR);

        depth.values.mean.map(|mean| mean / factor)
    }
}

#[derive(Debug, Clone)]
pub struct SoilClient {
    client: Client,
    base_url: String,
    retry: RetryConfig,
}

impl SoilClient {
    pub fn new(client: Client, base_url: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry,
        }
    }

    /// Mean pH (in water) of the top 5 cm of soil.
    #[instrument(skip(self), level = "info")]
    pub async fn topsoil_ph(&self, coordinates: &Coordinates) -> Result<Option<f64>, ConditionsError> {
        let body: SoilResponse = get_json(&self.retry, || {
            self.client
                .get(&self.base_url)
                .header("Content-type", "application/json")
                .query(&[("lat", coordinates.latitude()), ("lon", coordinates.longitude())])
                .query(&[("property", PH_PROPERTY), ("depth", TOP_DEPTH), ("value", "mean")])
        })
        .await?;

        let ph = body.topsoil_ph();
        match ph {
            Some(ph) => tracing::debug!("Topsoil pH at {}: {}", coordinates, ph),
            None => tracing::warn!("No pH coverage at {}", coordinates),
        }
        Ok(ph)
    }
}
