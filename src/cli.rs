//! Command-line arguments.

use clap::{ArgGroup, Parser};
use cropwise_conditions::{Coordinates, LocationError};
use cropwise_match::{InvalidObservationError, Observation};
use std::num::NonZeroUsize;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(
    name = "cropwise",
    version,
    about = "Suggest crops from the soil and weather at a location",
    group(ArgGroup::new("mode").required(true).args(["latitude", "address", "observe"]))
)]
pub struct Args {
    /// Latitude in degrees, -90 to 90
    #[arg(requires = "longitude", allow_negative_numbers = true)]
    pub latitude: Option<String>,

    /// Longitude in degrees, -180 to 180
    #[arg(allow_negative_numbers = true)]
    pub longitude: Option<String>,

    /// Look up a free-text address instead of coordinates
    #[arg(long, num_args = 1.., value_name = "TEXT")]
    pub address: Option<Vec<String>>,

    /// Skip the lookups and rank crops for known conditions
    #[arg(
        long,
        num_args = 3,
        value_names = ["TEMPERATURE", "HUMIDITY", "PH"],
        allow_negative_numbers = true
    )]
    pub observe: Option<Vec<f64>>,

    /// How many crops to suggest (default from config)
    #[arg(long)]
    pub top: Option<NonZeroUsize>,
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Coordinates(Coordinates),
    Address(String),
    Observe(Observation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub mode: Mode,
    pub top_k: Option<usize>,
}

#[derive(Debug, Error, PartialEq)]
pub enum UsageError {
    #[error("{0}")]
    Location(#[from] LocationError),
    #[error("{0}")]
    Observation(#[from] InvalidObservationError),
    #[error("give a latitude and a longitude, --address or --observe")]
    MissingMode,
}

impl TryFrom<Args> for Command {
    type Error = UsageError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let mode = if let Some(values) = args.observe {
            match values.as_slice() {
                [temperature, humidity, ph] => {
                    Mode::Observe(Observation::new(*temperature, *humidity, *ph)?)
                }
                _ => return Err(UsageError::MissingMode),
            }
        } else if let Some(words) = args.address {
            Mode::Address(words.join(" "))
        } else {
            match (args.latitude, args.longitude) {
                (Some(lat), Some(lng)) => Mode::Coordinates(Coordinates::parse(&lat, &lng)?),
                _ => return Err(UsageError::MissingMode),
            }
        };

        Ok(Self {
            mode,
            top_k: args.top.map(NonZeroUsize::get),
        })
    }
}
