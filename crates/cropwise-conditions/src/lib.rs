//! Site conditions for Cropwise
//!
//! Resolves a location to coordinates and looks up topsoil pH (SoilGrids)
//! and recent weather (Ambee) for it, translating each response into typed,
//! per-field checked values.

pub mod geocode;
pub mod http;
pub mod retry;
pub mod service;
pub mod soil;
pub mod types;
pub mod weather;

pub use geocode::{Geocoder, Place};
pub use http::ClientSettings;
pub use retry::RetryConfig;
pub use service::ConditionsService;
pub use soil::SoilClient;
pub use types::*;
pub use weather::{WeatherClient, WeatherReading};
