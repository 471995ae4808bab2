use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, Collection, ODataId, Status};
use crate::error::ExtractionError;
use crate::telemetry::discovery::EndpointMap;
use crate::telemetry::types::{Category, DimmRecord, RecordData, TelemetryRecord};
use crate::transport::RedfishTransport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MemoryResource {
    id: Option<String>,
    device_locator: Option<String>,
    memory_type: Option<String>,
    memory_device_type: Option<String>,
    #[serde(rename = "CapacityMiB")]
    capacity_mib: Option<u64>,
    operating_speed_mhz: Option<u64>,
    #[serde(default, rename = "AllowedSpeedsMHz")]
    allowed_speeds_mhz: Vec<u64>,
    manufacturer: Option<String>,
    part_number: Option<String>,
    serial_number: Option<String>,
    rank_count: Option<u64>,
    data_width_bits: Option<u64>,
    bus_width_bits: Option<u64>,
    #[serde(default)]
    status: Status,
    memory_metrics: Option<ODataId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MemoryMetrics {
    temperature_celsius: Option<f64>,
    consumed_power_watts: Option<f64>,
}

/// Collection GET plus one GET per DIMM (the documented N+1 cost of this
/// extractor), following the optional MemoryMetrics link when present.
pub async fn collect_memory(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<TelemetryRecord>, ExtractionError> {
    let url = format!("{}/Memory", endpoints.system);
    let body = transport.get_json(&url).await?;
    let collection: Collection = decode(&url, body)?;

    let timestamp = Utc::now();
    let mut records = Vec::with_capacity(collection.members.len());
    for member in collection.members {
        let member_url = transport.url(&member.odata_id);
        let body = transport.get_json(&member_url).await?;
        let resource: MemoryResource = decode(&member_url, body)?;

        let metrics = match &resource.memory_metrics {
            Some(link) => {
                let metrics_url = transport.url(&link.odata_id);
                let body = transport.get_json(&metrics_url).await?;
                Some(decode::<MemoryMetrics>(&metrics_url, body)?)
            }
            None => None,
        };

        records.push(record(transport.host(), timestamp, resource, metrics));
    }
    Ok(records)
}

fn record(
    host: &str,
    timestamp: DateTime<Utc>,
    resource: MemoryResource,
    metrics: Option<MemoryMetrics>,
) -> TelemetryRecord {
    let mut data = DimmRecord {
        memory_id: resource.id,
        device_locator: resource.device_locator,
        memory_type: resource.memory_type,
        memory_device_type: resource.memory_device_type,
        capacity_mib: resource.capacity_mib,
        operating_speed_mhz: resource.operating_speed_mhz,
        allowed_speeds_mhz: resource.allowed_speeds_mhz,
        manufacturer: resource.manufacturer,
        part_number: resource.part_number,
        serial_number: resource.serial_number,
        rank_count: resource.rank_count,
        data_width_bits: resource.data_width_bits,
        bus_width_bits: resource.bus_width_bits,
        health: resource.status.health,
        state: resource.status.state,
        ..Default::default()
    };

    if let Some(metrics) = metrics {
        data.temperature_celsius = metrics.temperature_celsius;
        data.consumed_power_watts = metrics.consumed_power_watts;
    }

    TelemetryRecord::new(timestamp, host, Category::Memory, RecordData::Dimm(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_record_per_dimm() {
        let resource: MemoryResource = decode(
            "http://test",
            json!({
                "Id": "DIMM_A1",
                "DeviceLocator": "A1",
                "MemoryType": "DRAM",
                "MemoryDeviceType": "DDR4",
                "CapacityMiB": 32768,
                "OperatingSpeedMhz": 3200,
                "AllowedSpeedsMHz": [2933, 3200],
                "Manufacturer": "Samsung",
                "RankCount": 2,
                "DataWidthBits": 64,
                "BusWidthBits": 72,
                "Status": {"Health": "OK", "State": "Enabled"}
            }),
        )
        .unwrap();

        let rec = record("bmc01", Utc::now(), resource, None);
        assert_eq!(rec.category, Category::Memory);
        let RecordData::Dimm(data) = rec.data else {
            panic!("expected dimm record");
        };
        assert_eq!(data.device_locator.as_deref(), Some("A1"));
        assert_eq!(data.capacity_mib, Some(32768));
        assert_eq!(data.allowed_speeds_mhz, [2933, 3200]);
    }

    #[test]
    fn absent_capacity_is_not_zero() {
        let resource: MemoryResource = decode("http://test", json!({"Id": "DIMM_B1"})).unwrap();
        let rec = record("bmc01", Utc::now(), resource, None);
        let RecordData::Dimm(data) = rec.data else {
            panic!("expected dimm record");
        };
        assert_eq!(data.capacity_mib, None);
        assert!(data.allowed_speeds_mhz.is_empty());
    }
}
