//! Nearest-neighbour crop matching for Cropwise.
//!
//! Loads the historical growing-conditions table once and ranks its crops
//! against a measured (temperature, humidity, pH) observation.

pub mod dataset;
pub mod error;
pub mod recommender;
pub mod types;

pub use dataset::{load, load_path, ReferenceRecord, ReferenceTable, COLUMNS};
pub use error::{DataFormatError, InvalidObservationError, RecommendError};
pub use recommender::{rank, recommend, score, DEFAULT_TOP_K};
pub use types::{Measurement, Observation, RankedCrop, Recommendation};
