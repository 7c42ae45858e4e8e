//! JSON documents: export of {chart kind, records} and lenient-shape import.
//!
//! ```json
//! { "chartType": "line", "data": [{"name": "Janvier", "value": 65}], "exportDate": "2024-01-01T00:00:00.000Z" }
//! ```
//!
//! Import requires `data` to be an array of `{name, value}` objects. `chartType`
//! is optional and `exportDate` is ignored, as is any other field.

use chrono::{DateTime, SecondsFormat, Utc};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::chart_data::ChartKind;
use crate::editor::EditController;
use crate::record::{Record, RecordStore};

/// Prefix of exported file names: `graphique-<unix millis>.json`.
pub const EXPORT_FILE_PREFIX: &str = "graphique";

/// A complete export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDocument {
    pub chart_type: ChartKind,
    pub data: Vec<Record>,
    pub export_date: String,
}

impl ChartDocument {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What a successful import yields. `chart_type` is `None` when the document
/// has no recognized `chartType`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDocument {
    pub chart_type: Option<ChartKind>,
    pub data: Vec<Record>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("document has no \"data\" array")]
    MissingData,

    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-05-01T10:20:30.123Z`.
pub fn export_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("{}-{}.json", EXPORT_FILE_PREFIX, now.timestamp_millis())
}

pub fn export(chart_type: ChartKind, records: &[Record], now: DateTime<Utc>) -> ChartDocument {
    ChartDocument {
        chart_type,
        data: records.to_vec(),
        export_date: export_timestamp(now),
    }
}

/// Write an export document into `dir` and return the file's path.
pub fn write_export(
    dir: &Path,
    chart_type: ChartKind,
    records: &[Record],
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let doc = export(chart_type, records, now);
    let json = doc.to_json_pretty()?;
    if !dir.as_os_str().is_empty() && !dir.exists() {
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("Failed to create export directory {}", dir.display()))?;
    }
    let path = dir.join(export_file_name(now));
    std::fs::write(&path, json)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), kind = chart_type.key(), "exported");
    Ok(path)
}

pub fn read_import_file(path: &Path) -> Result<String, ImportError> {
    std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse an import document without touching any state.
pub fn import(raw: &str) -> Result<ImportedDocument, ImportError> {
    let doc: Value = serde_json::from_str(raw)?;
    let Some(obj) = doc.as_object() else {
        return Err(ImportError::MissingData);
    };
    let Some(items) = obj.get("data").and_then(Value::as_array) else {
        return Err(ImportError::MissingData);
    };

    let data = items
        .iter()
        .enumerate()
        .map(|(index, item)| record_from_value(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    let chart_type = obj
        .get("chartType")
        .and_then(Value::as_str)
        .and_then(ChartKind::from_key);

    Ok(ImportedDocument { chart_type, data })
}

fn record_from_value(index: usize, item: &Value) -> Result<Record, ImportError> {
    let invalid = |reason: &str| ImportError::InvalidRecord {
        index,
        reason: reason.to_string(),
    };
    let obj = item.as_object().ok_or_else(|| invalid("not an object"))?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing string \"name\""))?;
    if name.is_empty() {
        return Err(invalid("empty \"name\""));
    }
    let value = obj
        .get("value")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid("missing numeric \"value\""))?;
    Ok(Record::new(name, value))
}

/// Import `raw` into the store. All or nothing: on any error the store, the
/// editor and the chart kind are left exactly as they were.
pub fn apply_import(
    raw: &str,
    store: &mut RecordStore,
    editor: &mut EditController,
    chart_type: &mut ChartKind,
) -> Result<usize, ImportError> {
    let imported = import(raw).inspect_err(|e| warn!(error = %e, "import rejected"))?;
    let count = imported.data.len();
    store.replace_all(imported.data);
    editor.on_replaced();
    if let Some(kind) = imported.chart_type {
        *chart_type = kind;
    }
    info!(records = count, kind = chart_type.key(), "imported");
    Ok(count)
}
