use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, Collection, ODataId, Status};
use crate::error::ExtractionError;
use crate::telemetry::discovery::EndpointMap;
use crate::telemetry::types::{
    Category, ControllerRecord, DriveRecord, RecordData, TelemetryRecord,
};
use crate::transport::RedfishTransport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageResource {
    id: Option<String>,
    name: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    firmware_version: Option<String>,
    #[serde(default)]
    supported_device_protocols: Vec<String>,
    #[serde(default)]
    drives: Vec<ODataId>,
    #[serde(default)]
    status: Status,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DriveResource {
    id: Option<String>,
    name: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    serial_number: Option<String>,
    capacity_bytes: Option<u64>,
    media_type: Option<String>,
    protocol: Option<String>,
    #[serde(rename = "RotationSpeedRPM")]
    rotation_speed_rpm: Option<i64>,
    failure_predicted: Option<bool>,
    #[serde(rename = "IndicatorLED")]
    indicator_led: Option<String>,
    physical_location: Option<PhysicalLocation>,
    #[serde(default)]
    status: Status,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PhysicalLocation {
    part_location: Option<PartLocation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PartLocation {
    service_label: Option<String>,
}

/// Storage collection GET, then per controller one GET plus one GET per
/// referenced drive. Emits one controller record and one drive record per
/// physical drive.
pub async fn collect_storage(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<TelemetryRecord>, ExtractionError> {
    let url = format!("{}/Storage", endpoints.system);
    let body = transport.get_json(&url).await?;
    let collection: Collection = decode(&url, body)?;

    let timestamp = Utc::now();
    let mut records = Vec::new();
    for member in collection.members {
        let controller_url = transport.url(&member.odata_id);
        let body = transport.get_json(&controller_url).await?;
        let controller: StorageResource = decode(&controller_url, body)?;

        let drive_links = controller.drives.clone();
        records.push(controller_record(transport.host(), timestamp, controller));

        for link in drive_links {
            let drive_url = transport.url(&link.odata_id);
            let body = transport.get_json(&drive_url).await?;
            let drive: DriveResource = decode(&drive_url, body)?;
            records.push(drive_record(transport.host(), timestamp, drive));
        }
    }
    Ok(records)
}

fn controller_record(
    host: &str,
    timestamp: DateTime<Utc>,
    resource: StorageResource,
) -> TelemetryRecord {
    let data = ControllerRecord {
        controller_id: resource.id,
        name: resource.name,
        manufacturer: resource.manufacturer,
        model: resource.model,
        firmware_version: resource.firmware_version,
        supported_protocols: resource.supported_device_protocols,
        health: resource.status.health,
        state: resource.status.state,
    };
    TelemetryRecord::new(timestamp, host, Category::Storage, RecordData::Controller(data))
}

fn drive_record(host: &str, timestamp: DateTime<Utc>, resource: DriveResource) -> TelemetryRecord {
    let data = DriveRecord {
        drive_id: resource.id,
        name: resource.name,
        manufacturer: resource.manufacturer,
        model: resource.model,
        serial_number: resource.serial_number,
        capacity_bytes: resource.capacity_bytes,
        media_type: resource.media_type,
        protocol: resource.protocol,
        rotation_speed_rpm: resource.rotation_speed_rpm,
        failure_predicted: resource.failure_predicted,
        indicator_led: resource.indicator_led,
        location: resource
            .physical_location
            .and_then(|location| location.part_location)
            .and_then(|part| part.service_label),
        health: resource.status.health,
        state: resource.status.state,
    };
    TelemetryRecord::new(timestamp, host, Category::Storage, RecordData::Drive(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn controller_and_drive_records() {
        let controller: StorageResource = decode(
            "http://test",
            json!({
                "Id": "1",
                "Name": "RAID Controller",
                "Manufacturer": "Broadcom",
                "Model": "MegaRAID 9460",
                "FirmwareVersion": "51.16.0",
                "SupportedDeviceProtocols": ["SAS", "SATA"],
                "Drives": [{"@odata.id": "/redfish/v1/Systems/1/Storage/1/Drives/0"}],
                "Status": {"Health": "OK", "State": "Enabled"}
            }),
        )
        .unwrap();
        let rec = controller_record("bmc01", Utc::now(), controller);
        let RecordData::Controller(data) = rec.data else {
            panic!("expected controller record");
        };
        assert_eq!(data.model.as_deref(), Some("MegaRAID 9460"));
        assert_eq!(data.supported_protocols, ["SAS", "SATA"]);

        let drive: DriveResource = decode(
            "http://test",
            json!({
                "Id": "0",
                "Name": "Drive 0",
                "Model": "ST8000NM",
                "SerialNumber": "ZA1234",
                "CapacityBytes": 8001563222016u64,
                "MediaType": "HDD",
                "Protocol": "SAS",
                "RotationSpeedRPM": 7200,
                "FailurePredicted": false,
                "IndicatorLED": "Off",
                "PhysicalLocation": {"PartLocation": {"ServiceLabel": "Slot 0"}},
                "Status": {"Health": "OK", "State": "Enabled"}
            }),
        )
        .unwrap();
        let rec = drive_record("bmc01", Utc::now(), drive);
        let RecordData::Drive(data) = rec.data else {
            panic!("expected drive record");
        };
        assert_eq!(data.capacity_bytes, Some(8001563222016));
        assert_eq!(data.failure_predicted, Some(false));
        assert_eq!(data.location.as_deref(), Some("Slot 0"));
    }

    #[test]
    fn predictive_failure_flag_stays_absent_when_unreported() {
        let drive: DriveResource = decode("http://test", json!({"Id": "1"})).unwrap();
        let rec = drive_record("bmc01", Utc::now(), drive);
        let RecordData::Drive(data) = rec.data else {
            panic!("expected drive record");
        };
        assert_eq!(data.failure_predicted, None);
    }
}
