use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, Collection, ODataId, Status};
use crate::error::ExtractionError;
use crate::telemetry::discovery::EndpointMap;
use crate::telemetry::types::{Category, CpuRecord, RecordData, TelemetryRecord};
use crate::transport::RedfishTransport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProcessorResource {
    id: Option<String>,
    socket: Option<String>,
    processor_type: Option<String>,
    #[serde(rename = "ProcessorArchitecture")]
    architecture: Option<String>,
    instruction_set: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    #[serde(rename = "MaxSpeedMHz")]
    max_speed_mhz: Option<u64>,
    total_cores: Option<u64>,
    total_threads: Option<u64>,
    #[serde(default)]
    status: Status,
    processor_metrics: Option<ODataId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProcessorMetrics {
    #[serde(rename = "OperatingSpeedMHz")]
    operating_speed_mhz: Option<u64>,
    temperature_celsius: Option<f64>,
    consumed_power_watts: Option<f64>,
}

/// Collection GET plus one GET per socket (the documented N+1 cost of this
/// extractor), following the optional ProcessorMetrics link for live
/// readings when the BMC exposes one.
pub async fn collect_processors(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<TelemetryRecord>, ExtractionError> {
    let url = format!("{}/Processors", endpoints.system);
    let body = transport.get_json(&url).await?;
    let collection: Collection = decode(&url, body)?;

    let timestamp = Utc::now();
    let mut records = Vec::with_capacity(collection.members.len());
    for member in collection.members {
        let member_url = transport.url(&member.odata_id);
        let body = transport.get_json(&member_url).await?;
        let resource: ProcessorResource = decode(&member_url, body)?;

        let metrics = match &resource.processor_metrics {
            Some(link) => {
                let metrics_url = transport.url(&link.odata_id);
                let body = transport.get_json(&metrics_url).await?;
                Some(decode::<ProcessorMetrics>(&metrics_url, body)?)
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
    resource: ProcessorResource,
    metrics: Option<ProcessorMetrics>,
) -> TelemetryRecord {
    let mut data = CpuRecord {
        processor_id: resource.id,
        socket: resource.socket,
        processor_type: resource.processor_type,
        architecture: resource.architecture,
        instruction_set: resource.instruction_set,
        manufacturer: resource.manufacturer,
        model: resource.model,
        max_speed_mhz: resource.max_speed_mhz,
        total_cores: resource.total_cores,
        total_threads: resource.total_threads,
        health: resource.status.health,
        state: resource.status.state,
        ..Default::default()
    };

    if let Some(metrics) = metrics {
        data.operating_speed_mhz = metrics.operating_speed_mhz;
        data.temperature_celsius = metrics.temperature_celsius;
        data.consumed_power_watts = metrics.consumed_power_watts;
    }

    TelemetryRecord::new(timestamp, host, Category::Processor, RecordData::Cpu(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::types::Health;
    use serde_json::json;

    #[test]
    fn one_record_per_socket_with_metrics_merged() {
        let resource: ProcessorResource = decode(
            "http://test",
            json!({
                "Id": "CPU0",
                "Socket": "CPU 0",
                "ProcessorType": "CPU",
                "ProcessorArchitecture": "x86",
                "InstructionSet": "x86-64",
                "Manufacturer": "Intel",
                "Model": "Xeon Gold 6326",
                "MaxSpeedMHz": 3500,
                "TotalCores": 16,
                "TotalThreads": 32,
                "Status": {"Health": "OK", "State": "Enabled"},
                "ProcessorMetrics": {"@odata.id": "/redfish/v1/Systems/1/Processors/CPU0/Metrics"}
            }),
        )
        .unwrap();
        let metrics: ProcessorMetrics = decode(
            "http://test",
            json!({"OperatingSpeedMHz": 2900, "TemperatureCelsius": 54.0}),
        )
        .unwrap();

        let rec = record("bmc01", Utc::now(), resource, Some(metrics));
        let RecordData::Cpu(data) = rec.data else {
            panic!("expected cpu record");
        };
        assert_eq!(data.socket.as_deref(), Some("CPU 0"));
        assert_eq!(data.total_cores, Some(16));
        assert_eq!(data.operating_speed_mhz, Some(2900));
        assert_eq!(data.temperature_celsius, Some(54.0));
        assert_eq!(data.health, Some(Health::Ok));
    }

    #[test]
    fn metrics_fields_stay_absent_without_metrics_resource() {
        let resource: ProcessorResource =
            decode("http://test", json!({"Id": "CPU0"})).unwrap();
        let rec = record("bmc01", Utc::now(), resource, None);
        let RecordData::Cpu(data) = rec.data else {
            panic!("expected cpu record");
        };
        assert!(data.operating_speed_mhz.is_none());
        assert!(data.consumed_power_watts.is_none());
    }
}
