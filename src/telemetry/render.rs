use std::fmt::Write;

use crate::error::ExportError;
use crate::telemetry::collector::CollectionResult;
use crate::telemetry::export::flatten_record;

const BANNER_WIDTH: usize = 60;
const RULE_WIDTH: usize = 40;

/// Plain-text console rendering: a fixed-width banner per category, one
/// field per line in stable order, a dash rule between records, and a
/// trailing summary of any categories that failed.
pub fn render(result: &CollectionResult) -> Result<String, ExportError> {
    let mut out = String::new();

    let mut current_category = None;
    for record in &result.records {
        if current_category != Some(record.category) {
            banner(&mut out, &format!("{} TELEMETRY", record.category.as_str().to_uppercase()));
            current_category = Some(record.category);
        }

        let mut fields = flatten_record(record)?;
        // category is already in the banner
        fields.remove("category");
        // lead with the common identity fields, then the rest in sorted order
        for key in ["timestamp", "host", "type"] {
            if let Some(value) = fields.remove(key) {
                line(&mut out, key, &value);
            }
        }
        for (key, value) in &fields {
            line(&mut out, key, value);
        }
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
    }

    if result.records.is_empty() && result.errors.is_empty() {
        out.push_str("No telemetry data available\n");
    }

    if !result.errors.is_empty() {
        banner(&mut out, "FAILED CATEGORIES");
        for (category, err) in &result.errors {
            let _ = writeln!(out, "{}: {}", category, err);
        }
    }

    Ok(out)
}

fn banner(out: &mut String, title: &str) {
    let rule = "=".repeat(BANNER_WIDTH);
    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, " {}", title);
    let _ = writeln!(out, "{}", rule);
}

fn line(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{}: {}", key, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, TransportError};
    use crate::telemetry::types::{
        Category, RecordData, SystemRecord, TelemetryRecord, TemperatureRecord,
    };
    use chrono::{TimeZone, Utc};
    use reqwest::StatusCode;

    fn result_with_one_record() -> CollectionResult {
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        CollectionResult {
            records: vec![TelemetryRecord::new(
                timestamp,
                "bmc01",
                Category::Thermal,
                RecordData::Temperature(TemperatureRecord {
                    sensor_name: Some("CPU1 Temp".to_string()),
                    reading_celsius: Some(60.0),
                    ..Default::default()
                }),
            )],
            errors: Default::default(),
        }
    }

    #[test]
    fn banner_fields_and_rule() {
        let text = render(&result_with_one_record()).unwrap();
        assert!(text.contains(" THERMAL TELEMETRY"));
        assert!(text.contains("type: temperature"));
        assert!(text.contains("sensor_name: CPU1 Temp"));
        assert!(text.contains("reading_celsius: 60"));
        assert!(text.contains(&"-".repeat(40)));
    }

    #[test]
    fn failed_categories_are_listed() {
        let mut result = result_with_one_record();
        result.errors.insert(
            Category::Storage,
            ExtractionError::Transport(TransportError::Status {
                method: "GET",
                url: "https://bmc01/redfish/v1/Systems/1/Storage".to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
            }),
        );

        let text = render(&result).unwrap();
        assert!(text.contains("FAILED CATEGORIES"));
        assert!(text.contains("storage:"));
        // the successful category still rendered in full
        assert!(text.contains("sensor_name: CPU1 Temp"));
    }

    #[test]
    fn one_banner_per_category() {
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut result = result_with_one_record();
        result.records.insert(
            0,
            TelemetryRecord::new(
                timestamp,
                "bmc01",
                Category::System,
                RecordData::System(SystemRecord::default()),
            ),
        );

        let text = render(&result).unwrap();
        assert_eq!(text.matches("SYSTEM TELEMETRY").count(), 1);
        assert_eq!(text.matches("THERMAL TELEMETRY").count(), 1);
    }
}
