//! Reference dataset loading.
//!
//! The reference table is the historical record of conditions each crop was
//! grown under. It is parsed once, validated, and never mutated afterwards;
//! callers share it behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::DataFormatError;
use crate::types::Measurement;

/// Fixed column positions of the reference CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    /// Feature columns in matrix order (temperature, humidity, ph)
    pub features: [usize; 3],
    pub label: usize,
}

impl Columns {
    /// Fewest fields a row may have and still cover every column.
    pub const fn min_width(&self) -> usize {
        let mut max = self.label;
        let mut i = 0;
        while i < self.features.len() {
            if self.features[i] > max {
                max = self.features[i];
            }
            i += 1;
        }
        max + 1
    }
}

/// Layout of `Crop_recommendation.csv`:
/// `N,P,K,temperature,humidity,ph,rainfall,label`.
///
/// Columns are addressed by position, not header name, so files with
/// renamed headers still load. Changing this table breaks compatibility
/// with existing reference files.
pub const COLUMNS: Columns = Columns {
    features: [3, 4, 5],
    label: 7,
};

/// One historical observation of a crop's growing conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub crop_label: String,
}

impl ReferenceRecord {
    pub fn features(&self) -> [f64; 3] {
        [self.temperature, self.humidity, self.ph]
    }
}

/// Immutable [N, 3] feature matrix with a parallel label column.
///
/// Row `i` of the matrix and label `i` always describe the same record;
/// the two are only ever built together.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    features: Vec<[f64; 3]>,
    labels: Vec<String>,
}

impl ReferenceTable {
    /// Build a table from already-parsed records.
    pub fn from_records(records: Vec<ReferenceRecord>) -> Result<Self, DataFormatError> {
        let mut features = Vec::with_capacity(records.len());
        let mut labels = Vec::with_capacity(records.len());

        for (i, record) in records.into_iter().enumerate() {
            let line = i as u64 + 1;
            let row = record.features();
            for (field, value) in Measurement::ALL.into_iter().zip(row) {
                if !value.is_finite() {
                    return Err(DataFormatError::InvalidNumber {
                        line,
                        column: field,
                        value: value.to_string(),
                    });
                }
            }
            let label = record.crop_label.trim();
            if label.is_empty() {
                return Err(DataFormatError::EmptyLabel { line });
            }
            features.push(row);
            labels.push(label.to_string());
        }

        Self::from_parts(features, labels)
    }

    fn from_parts(features: Vec<[f64; 3]>, labels: Vec<String>) -> Result<Self, DataFormatError> {
        debug_assert_eq!(features.len(), labels.len());
        if features.is_empty() {
            return Err(DataFormatError::Empty);
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature rows in (temperature, humidity, ph) order.
    pub fn features(&self) -> &[[f64; 3]] {
        &self.features
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn record(&self, index: usize) -> Option<ReferenceRecord> {
        let [temperature, humidity, ph] = *self.features.get(index)?;
        Some(ReferenceRecord {
            temperature,
            humidity,
            ph,
            crop_label: self.labels[index].clone(),
        })
    }

    /// Rows paired with their labels, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64; 3], &str)> + '_ {
        self.features
            .iter()
            .zip(self.labels.iter().map(String::as_str))
    }

    /// Number of different crop labels in the table.
    pub fn distinct_labels(&self) -> usize {
        self.labels
            .iter()
            .map(String::as_str)
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Parse the reference table from CSV text. The first row is a header.
pub fn load<R: Read>(source: R) -> Result<ReferenceTable, DataFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let min_width = COLUMNS.min_width();
    let mut features = Vec::new();
    let mut labels = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() < min_width {
            return Err(DataFormatError::TooFewColumns {
                line,
                expected: min_width,
                found: record.len(),
            });
        }

        let mut row = [0.0; 3];
        for ((slot, field), column) in row.iter_mut().zip(Measurement::ALL).zip(COLUMNS.features) {
            let raw = record.get(column).unwrap_or_default();
            *slot = parse_number(raw).ok_or_else(|| DataFormatError::InvalidNumber {
                line,
                column: field,
                value: raw.to_string(),
            })?;
        }

        let label = record.get(COLUMNS.label).unwrap_or_default();
        if label.is_empty() {
            return Err(DataFormatError::EmptyLabel { line });
        }

        features.push(row);
        labels.push(label.to_string());
    }

    ReferenceTable::from_parts(features, labels)
}

/// Read and parse the reference table from a file.
pub fn load_path(path: impl AsRef<Path>) -> Result<ReferenceTable, DataFormatError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = load(file)?;

    tracing::info!(
        "Loaded {} reference records ({} crops) from {}",
        table.len(),
        table.distinct_labels(),
        path.display()
    );
    Ok(table)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
