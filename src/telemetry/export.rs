use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::telemetry::types::TelemetryRecord;

const KEY_SEPARATOR: char = '_';

/// Structured export: one JSON array of record objects, optional fields
/// present only when the hardware reported them.
pub fn to_json(records: &[TelemetryRecord]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn write_json(records: &[TelemetryRecord], path: &Path) -> Result<(), ExportError> {
    let body = to_json(records)?;
    fs::write(path, body).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Flattened export. Records of different types have different field sets,
/// so the header is the union of every field seen across the whole buffer —
/// which forces a full pass before any row is written. Absent fields render
/// as empty cells.
pub fn to_csv(records: &[TelemetryRecord]) -> Result<String, ExportError> {
    // first pass: flatten everything and build the union header
    let rows: Vec<BTreeMap<String, String>> = records
        .iter()
        .map(flatten_record)
        .collect::<Result<_, _>>()?;
    let mut columns: BTreeSet<String> = BTreeSet::new();
    for row in &rows {
        columns.extend(row.keys().cloned());
    }

    // second pass: emit header and rows
    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| csv_field(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');
    for row in &rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| row.get(column).map(|v| csv_field(v)).unwrap_or_default())
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    Ok(out)
}

pub fn write_csv(records: &[TelemetryRecord], path: &Path) -> Result<(), ExportError> {
    let body = to_csv(records)?;
    fs::write(path, body).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Flatten one record to `key -> rendered value`, joining nested keys with
/// `_`. Arrays collapse to their JSON text in a single cell.
pub fn flatten_record(record: &TelemetryRecord) -> Result<BTreeMap<String, String>, ExportError> {
    let value = serde_json::to_value(record)?;
    let mut out = BTreeMap::new();
    flatten_value("", &value, &mut out);
    Ok(out)
}

fn flatten_value(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let joined = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}{}{}", prefix, KEY_SEPARATOR, key)
                };
                flatten_value(&joined, nested, out);
            }
        }
        Value::Array(_) => {
            out.insert(prefix.to_string(), value.to_string());
        }
        // absent stays absent; an empty CSV cell, not a zero
        Value::Null => {}
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// RFC-4180 quoting: only fields containing a comma, quote or line break
/// need escaping.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// `report.csv` + sample 3 -> `report_3.csv`; used by continuous mode so
/// each sample lands in its own file.
pub fn numbered_path(path: &Path, sample: u64) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, sample, ext.to_string_lossy()),
        None => format!("{}_{}", stem, sample),
    };
    path.with_file_name(name)
}
