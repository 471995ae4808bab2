use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::Path;

use crate::telemetry::discovery::EndpointMap;
use crate::telemetry::export;
use crate::telemetry::extract;
use crate::telemetry::types::{RecordData, TelemetryRecord};
use crate::transport::RedfishTransport;

/// Storage inventory is the storage extractor's output worn as a listing;
/// no second traversal of the controller/drive graph.
pub async fn get_inventory(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<TelemetryRecord>> {
    extract::collect_storage(transport, endpoints)
        .await
        .context("failed to read storage inventory")
}

pub fn render_inventory(records: &[TelemetryRecord]) -> String {
    let mut out = String::from("\n=== Storage Inventory ===\n");

    let controllers: Vec<_> = records
        .iter()
        .filter_map(|r| match &r.data {
            RecordData::Controller(c) => Some(c),
            _ => None,
        })
        .collect();
    if !controllers.is_empty() {
        out.push_str("\nStorage Controllers:\n");
        for controller in controllers {
            field(&mut out, "ID", controller.controller_id.as_deref());
            field(&mut out, "Name", controller.name.as_deref());
            field(&mut out, "Manufacturer", controller.manufacturer.as_deref());
            field(&mut out, "Model", controller.model.as_deref());
            field(&mut out, "Firmware", controller.firmware_version.as_deref());
            out.push('\n');
        }
    }

    let drives: Vec<_> = records
        .iter()
        .filter_map(|r| match &r.data {
            RecordData::Drive(d) => Some(d),
            _ => None,
        })
        .collect();
    if !drives.is_empty() {
        out.push_str("Storage Drives:\n");
        for drive in drives {
            field(&mut out, "ID", drive.drive_id.as_deref());
            field(&mut out, "Name", drive.name.as_deref());
            field(&mut out, "Manufacturer", drive.manufacturer.as_deref());
            field(&mut out, "Model", drive.model.as_deref());
            field(&mut out, "Serial", drive.serial_number.as_deref());
            if let Some(bytes) = drive.capacity_bytes {
                let _ = writeln!(out, "  Capacity: {} GB", bytes_to_gb(bytes));
            }
            field(&mut out, "Media Type", drive.media_type.as_deref());
            field(&mut out, "Protocol", drive.protocol.as_deref());
            field(&mut out, "Location", drive.location.as_deref());
            out.push('\n');
        }
    }

    out
}

/// Drive records only, flattened the same way as the telemetry CSV export.
pub fn export_csv(records: &[TelemetryRecord], path: &Path) -> Result<()> {
    let drives: Vec<TelemetryRecord> = records
        .iter()
        .filter(|r| matches!(r.data, RecordData::Drive(_)))
        .cloned()
        .collect();
    export::write_csv(&drives, path).context("failed to export storage inventory")
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    let _ = writeln!(out, "  {}: {}", label, value.unwrap_or("Unknown"));
}

fn bytes_to_gb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0 * 1024.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::types::{Category, DriveRecord};
    use chrono::Utc;

    #[test]
    fn capacity_renders_in_gb() {
        assert_eq!(bytes_to_gb(8001563222016), 7452.04);
        assert_eq!(bytes_to_gb(0), 0.0);
    }

    #[test]
    fn inventory_lists_drive_fields() {
        let record = TelemetryRecord::new(
            Utc::now(),
            "bmc01",
            Category::Storage,
            RecordData::Drive(DriveRecord {
                drive_id: Some("0".to_string()),
                model: Some("ST8000NM".to_string()),
                capacity_bytes: Some(8001563222016),
                ..Default::default()
            }),
        );

        let text = render_inventory(&[record]);
        assert!(text.contains("Storage Drives:"));
        assert!(text.contains("Capacity: 7452.04 GB"));
        // fields the BMC never reported fall back to Unknown in the listing
        assert!(text.contains("Serial: Unknown"));
    }
}
