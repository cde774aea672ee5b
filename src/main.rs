mod cli;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::fmt::Write;
use std::process::ExitCode;

use cli::{Args, Command, Mode};
use cropwise_conditions::{MissingFieldError, SiteConditions};
use cropwise_core::{App, AppError};
use cropwise_match::{Measurement, Recommendation};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let command = match Command::try_from(Args::parse()) {
        Ok(command) => command,
        Err(e) => Args::command()
            .error(clap::error::ErrorKind::ValueValidation, e)
            .exit(),
    };

    cropwise_core::init()?;
    let app = App::new()?;
    tracing::info!("Cropwise started");

    match run(&app, &command).await {
        Ok(code) => Ok(code),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(app: &App, command: &Command) -> Result<ExitCode, AppError> {
    let coordinates = match &command.mode {
        Mode::Observe(observation) => {
            print!("{}", render_recommendation(&app.recommend(observation, command.top_k)?));
            return Ok(ExitCode::SUCCESS);
        }
        Mode::Coordinates(coordinates) => *coordinates,
        Mode::Address(address) => {
            let place = app.locate(address).await?;
            match &place.formatted_address {
                Some(name) => println!("{} ({})", name, place.coordinates),
                None => println!("{}", place.coordinates),
            }
            place.coordinates
        }
    };

    let advice = app.advise(&coordinates, command.top_k).await?;
    print!("{}", render_conditions(&advice.conditions));

    match &advice.recommendation {
        Some(recommendation) => {
            print!("{}", render_recommendation(recommendation));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprint!("{}", render_missing(&advice.missing_fields()));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn render_conditions(conditions: &SiteConditions) -> String {
    let mut out = String::from("Average soil info:\n");
    for field in SiteConditions::LOOKUP_ORDER {
        let label = match field {
            Measurement::Ph => "pH",
            Measurement::Temperature => "Temperature (°C)",
            Measurement::Humidity => "Relative humidity (%)",
        };
        let _ = match conditions.get(field) {
            Some(value) => writeln!(out, "  {}: {:.2}", label, value),
            None => writeln!(out, "  {}: unavailable", label),
        };
    }
    out
}

fn render_recommendation(recommendation: &Recommendation) -> String {
    let mut out = String::from("Suggested crops:\n");
    for (rank, crop) in recommendation.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", rank + 1, crop.label);
    }
    out
}

/// One line per missing measurement, in lookup order.
fn render_missing(missing: &[MissingFieldError]) -> String {
    missing
        .iter()
        .map(|field| format!("{}\n", field.user_message()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cropwise_conditions::Coordinates;
    use cropwise_match::{recommend, Observation, ReferenceRecord, ReferenceTable};

    fn site(ph: Option<f64>, temperature: Option<f64>, humidity: Option<f64>) -> SiteConditions {
        SiteConditions {
            coordinates: Coordinates::new(20.59, 78.96).unwrap(),
            ph,
            temperature,
            humidity,
            fetched_at: Utc::now(),
        }
    }

    fn record(temperature: f64, humidity: f64, ph: f64, label: &str) -> ReferenceRecord {
        ReferenceRecord {
            temperature,
            humidity,
            ph,
            crop_label: label.to_string(),
        }
    }

    #[test]
    fn test_conditions_rounded_to_two_decimals() {
        let out = render_conditions(&site(Some(6.456), Some(25.0), Some(81.23456)));
        assert_eq!(
            out,
            "Average soil info:\n  pH: 6.46\n  Temperature (°C): 25.00\n  Relative humidity (%): 81.23\n"
        );
    }

    #[test]
    fn test_conditions_mark_missing_fields() {
        let out = render_conditions(&site(None, Some(30.0), None));
        assert!(out.contains("  pH: unavailable\n"));
        assert!(out.contains("  Temperature (°C): 30.00\n"));
        assert!(out.contains("  Relative humidity (%): unavailable\n"));
    }

    #[test]
    fn test_every_missing_field_reported() {
        let conditions = site(None, Some(30.0), None);
        assert_eq!(
            render_missing(&conditions.missing_fields()),
            "No pH data for this region!\nNo humidity data for this region!\n"
        );
    }

    #[test]
    fn test_suggestions_numbered_by_rank() {
        let table = ReferenceTable::from_records(vec![
            record(20.0, 80.0, 6.5, "rice"),
            record(25.0, 60.0, 6.0, "corn"),
            record(15.0, 40.0, 7.0, "wheat"),
        ])
        .unwrap();
        let observation = Observation::new(20.5, 79.0, 6.4).unwrap();
        let recommendation = recommend(&table, &observation, 3).unwrap();

        assert_eq!(
            render_recommendation(&recommendation),
            "Suggested crops:\n  1. rice\n  2. corn\n  3. wheat\n"
        );
    }
}
