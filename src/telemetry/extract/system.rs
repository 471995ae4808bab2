use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, Status};
use crate::error::ExtractionError;
use crate::telemetry::discovery::EndpointMap;
use crate::telemetry::types::{
    BootOverrideInfo, Category, MemorySummary, PowerState, ProcessorSummary, RecordData,
    SystemRecord, TelemetryRecord,
};
use crate::transport::RedfishTransport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ComputerSystem {
    power_state: Option<PowerState>,
    #[serde(default)]
    status: Status,
    manufacturer: Option<String>,
    model: Option<String>,
    serial_number: Option<String>,
    part_number: Option<String>,
    bios_version: Option<String>,
    #[serde(rename = "UUID")]
    uuid: Option<String>,
    boot: Option<Boot>,
    processor_summary: Option<ProcessorSummaryResource>,
    memory_summary: Option<MemorySummaryResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Boot {
    boot_source_override_enabled: Option<String>,
    boot_source_override_target: Option<String>,
    boot_source_override_mode: Option<String>,
    uefi_target_boot_source_override: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProcessorSummaryResource {
    count: Option<u64>,
    model: Option<String>,
    #[serde(default)]
    status: Status,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MemorySummaryResource {
    #[serde(rename = "TotalSystemMemoryGiB")]
    total_system_memory_gib: Option<f64>,
    #[serde(default)]
    status: Status,
}

/// One GET of the system resource, one record. The processor and memory
/// summaries come from nested fields on the same response; no extra
/// requests.
pub async fn collect_system(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<TelemetryRecord>, ExtractionError> {
    let url = &endpoints.system;
    let body = transport.get_json(url).await?;
    let resource: ComputerSystem = decode(url, body)?;
    Ok(vec![record(transport.host(), Utc::now(), resource)])
}

fn record(host: &str, timestamp: DateTime<Utc>, resource: ComputerSystem) -> TelemetryRecord {
    let data = SystemRecord {
        power_state: resource.power_state,
        health: resource.status.health,
        state: resource.status.state,
        manufacturer: resource.manufacturer,
        model: resource.model,
        serial_number: resource.serial_number,
        part_number: resource.part_number,
        bios_version: resource.bios_version,
        uuid: resource.uuid,
        boot_source: resource.boot.map(|boot| BootOverrideInfo {
            override_enabled: boot.boot_source_override_enabled,
            override_target: boot.boot_source_override_target,
            override_mode: boot.boot_source_override_mode,
            uefi_target: boot.uefi_target_boot_source_override,
        }),
        processor_summary: resource.processor_summary.map(|summary| ProcessorSummary {
            count: summary.count,
            model: summary.model,
            health: summary.status.health,
            state: summary.status.state,
        }),
        memory_summary: resource.memory_summary.map(|summary| MemorySummary {
            total_system_memory_gib: summary.total_system_memory_gib,
            health: summary.status.health,
            state: summary.status.state,
        }),
    };

    TelemetryRecord::new(timestamp, host, Category::System, RecordData::System(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::types::Health;
    use serde_json::json;

    fn sample_system() -> ComputerSystem {
        decode(
            "http://test",
            json!({
                "PowerState": "On",
                "Status": {"Health": "OK", "State": "Enabled"},
                "Manufacturer": "Supermicro",
                "Model": "SYS-620U",
                "SerialNumber": "S123456",
                "BiosVersion": "1.4.2",
                "UUID": "7f3a0c1e-0000-4000-8000-000000000001",
                "Boot": {
                    "BootSourceOverrideEnabled": "Disabled",
                    "BootSourceOverrideTarget": "None"
                },
                "ProcessorSummary": {
                    "Count": 2,
                    "Model": "Intel Xeon Gold 6326",
                    "Status": {"Health": "OK"}
                },
                "MemorySummary": {
                    "TotalSystemMemoryGiB": 256.0,
                    "Status": {"Health": "OK", "State": "Enabled"}
                }
            }),
        )
        .unwrap()
    }

    #[test]
    fn emits_exactly_one_system_record() {
        let before = Utc::now();
        let rec = record("bmc01", Utc::now(), sample_system());
        let after = Utc::now();

        assert_eq!(rec.category, Category::System);
        assert_eq!(rec.host, "bmc01");
        assert!(rec.timestamp >= before && rec.timestamp <= after);

        let RecordData::System(data) = rec.data else {
            panic!("expected system record");
        };
        assert_eq!(data.power_state, Some(PowerState::On));
        assert_eq!(data.health, Some(Health::Ok));
        assert_eq!(data.bios_version.as_deref(), Some("1.4.2"));

        let processors = data.processor_summary.expect("processor summary");
        assert_eq!(processors.count, Some(2));
        assert_eq!(processors.model.as_deref(), Some("Intel Xeon Gold 6326"));

        let memory = data.memory_summary.expect("memory summary");
        assert_eq!(memory.total_system_memory_gib, Some(256.0));
    }

    #[test]
    fn missing_optional_blocks_stay_absent() {
        let resource: ComputerSystem =
            decode("http://test", json!({"PowerState": "Off"})).unwrap();
        let rec = record("bmc01", Utc::now(), resource);
        let RecordData::System(data) = rec.data else {
            panic!("expected system record");
        };
        assert_eq!(data.power_state, Some(PowerState::Off));
        assert!(data.health.is_none());
        assert!(data.boot_source.is_none());
        assert!(data.processor_summary.is_none());
        assert!(data.memory_summary.is_none());
    }
}
