//! Record store: the ordered list of named values behind the chart.
//!
//! Records have no stable id; a record is identified by its position. Anything
//! holding an index into the store must drop it when the list shrinks (see
//! [`crate::editor::EditController::on_removed`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// One data point plotted on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub value: f64,
}

impl Record {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Why an add or update was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("'{0}' is not a finite number")]
    InvalidValue(String),

    #[error("index {index} out of range for {len} records")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Parse user-entered value text. Surrounding whitespace is ignored; NaN and
/// infinities are rejected.
pub fn parse_value(text: &str) -> Result<f64, RecordError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(RecordError::InvalidValue(trimmed.to_string())),
    }
}

fn validate(name: &str, value: &str) -> Result<Record, RecordError> {
    if name.is_empty() {
        return Err(RecordError::EmptyName);
    }
    let value = parse_value(value)?;
    Ok(Record::new(name, value))
}

/// Ordered sequence of records. Insertion order is display order and chart order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the four sample months shown on first start.
    pub fn with_samples() -> Self {
        Self::from_records(sample_records())
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.records.iter().map(|r| r.value).sum()
    }

    /// Append a record. Nothing changes when the name is empty or the value
    /// does not parse to a finite number.
    pub fn add(&mut self, name: &str, value: &str) -> Result<(), RecordError> {
        let record = validate(name, value)?;
        debug!(name = %record.name, value = record.value, "record added");
        self.records.push(record);
        Ok(())
    }

    /// Replace the record at `index` in place. Same validation as [`Self::add`].
    pub fn update(&mut self, index: usize, name: &str, value: &str) -> Result<(), RecordError> {
        let len = self.records.len();
        if index >= len {
            return Err(RecordError::IndexOutOfRange { index, len });
        }
        let record = validate(name, value)?;
        debug!(index, name = %record.name, value = record.value, "record updated");
        self.records[index] = record;
        Ok(())
    }

    /// Remove and return the record at `index`; `None` when out of range.
    pub fn remove(&mut self, index: usize) -> Option<Record> {
        if index >= self.records.len() {
            return None;
        }
        let removed = self.records.remove(index);
        debug!(index, name = %removed.name, "record removed");
        Some(removed)
    }

    /// Install a whole new list at once.
    pub fn replace_all(&mut self, records: Vec<Record>) {
        debug!(count = records.len(), "records replaced");
        self.records = records;
    }
}

pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new("Janvier", 65.0),
        Record::new("Février", 78.0),
        Record::new("Mars", 82.0),
        Record::new("Avril", 71.0),
    ]
}
