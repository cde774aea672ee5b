//! Nearest-neighbour crop ranking.
//!
//! Every reference record is scored against the observation by mean squared
//! difference over (temperature, humidity, ph). A crop qualifies through its
//! single closest record, so the result is the first `k` distinct labels of
//! the ranked table.

use std::collections::HashSet;

use crate::dataset::ReferenceTable;
use crate::error::RecommendError;
use crate::types::{Observation, RankedCrop, Recommendation};

/// Number of crops suggested when the caller does not say otherwise.
pub const DEFAULT_TOP_K: usize = 3;

/// Mean squared difference between an observation and one reference row.
/// Lower is more similar; identical values score 0.
pub fn score(observation: &Observation, row: &[f64; 3]) -> f64 {
    let sum: f64 = observation
        .features()
        .iter()
        .zip(row)
        .map(|(o, r)| (o - r).powi(2))
        .sum();
    sum / row.len() as f64
}

/// Score every record and order them best first.
///
/// Returns `(record_index, score)` pairs. Records with equal scores keep
/// their table order.
pub fn rank(
    table: &ReferenceTable,
    observation: &Observation,
) -> Result<Vec<(usize, f64)>, RecommendError> {
    observation.validate()?;
    Ok(rank_unchecked(table, observation))
}

fn rank_unchecked(table: &ReferenceTable, observation: &Observation) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = table
        .features()
        .iter()
        .map(|row| score(observation, row))
        .enumerate()
        .collect();
    // sort_by is stable; scores are finite so total_cmp matches numeric order
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

/// Suggest up to `k` distinct crops whose historical conditions best match
/// the observation.
///
/// The result holds `min(k, distinct labels in table)` crops. A table with
/// fewer than `k` different crops yields a shorter list, not an error.
/// Raising `k` only appends to the list; earlier entries never move.
///
/// # Errors
/// `ZeroK` if `k` is 0, `InvalidObservation` if any observed value is
/// non-finite or out of range. Both are checked before the table is read.
pub fn recommend(
    table: &ReferenceTable,
    observation: &Observation,
    k: usize,
) -> Result<Recommendation, RecommendError> {
    if k == 0 {
        return Err(RecommendError::ZeroK);
    }
    let ranked = rank(table, observation)?;

    let labels = table.labels();
    let mut seen: HashSet<&str> = HashSet::with_capacity(k);
    let mut crops = Vec::with_capacity(k);

    for (record_index, score) in ranked {
        let label = labels[record_index].as_str();
        if !seen.insert(label) {
            continue;
        }
        crops.push(RankedCrop {
            label: label.to_string(),
            score,
            record_index,
        });
        if crops.len() == k {
            break;
        }
    }

    tracing::debug!(
        "Matched {:?} from {} reference records",
        crops.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
        table.len()
    );
    Ok(Recommendation::new(crops))
}
