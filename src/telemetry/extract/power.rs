use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, Status};
use crate::error::ExtractionError;
use crate::telemetry::discovery::EndpointMap;
use crate::telemetry::types::{
    Category, PowerControlRecord, PowerSupplyRecord, RecordData, TelemetryRecord, VoltageRecord,
};
use crate::transport::RedfishTransport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PowerResource {
    #[serde(default)]
    power_control: Vec<PowerControlEntry>,
    #[serde(default)]
    voltages: Vec<VoltageSensor>,
    #[serde(default)]
    power_supplies: Vec<PowerSupply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PowerControlEntry {
    member_id: Option<String>,
    name: Option<String>,
    power_consumed_watts: Option<f64>,
    power_requested_watts: Option<f64>,
    power_available_watts: Option<f64>,
    power_capacity_watts: Option<f64>,
    power_allocated_watts: Option<f64>,
    power_limit: Option<PowerLimit>,
    #[serde(default)]
    status: Status,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PowerLimit {
    limit_in_watts: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VoltageSensor {
    member_id: Option<String>,
    name: Option<String>,
    reading_volts: Option<f64>,
    upper_threshold_critical: Option<f64>,
    upper_threshold_fatal: Option<f64>,
    lower_threshold_critical: Option<f64>,
    lower_threshold_fatal: Option<f64>,
    #[serde(default)]
    status: Status,
    physical_context: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PowerSupply {
    member_id: Option<String>,
    name: Option<String>,
    power_capacity_watts: Option<f64>,
    power_input_watts: Option<f64>,
    power_output_watts: Option<f64>,
    efficiency_percent: Option<f64>,
    line_input_voltage: Option<f64>,
    line_input_voltage_type: Option<String>,
    model: Option<String>,
    manufacturer: Option<String>,
    serial_number: Option<String>,
    part_number: Option<String>,
    firmware_version: Option<String>,
    #[serde(default)]
    status: Status,
}

/// One GET of the chassis Power resource; power-control entries, voltage
/// sensors and power supplies each become their own record.
pub async fn collect_power(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<TelemetryRecord>, ExtractionError> {
    let url = format!("{}/Power", endpoints.chassis);
    let body = transport.get_json(&url).await?;
    let resource: PowerResource = decode(&url, body)?;
    Ok(records(transport.host(), Utc::now(), resource))
}

fn records(host: &str, timestamp: DateTime<Utc>, resource: PowerResource) -> Vec<TelemetryRecord> {
    let mut out = Vec::new();

    for entry in resource.power_control {
        let data = PowerControlRecord {
            sensor_id: entry.member_id,
            sensor_name: entry.name,
            power_consumed_watts: entry.power_consumed_watts,
            power_requested_watts: entry.power_requested_watts,
            power_available_watts: entry.power_available_watts,
            power_capacity_watts: entry.power_capacity_watts,
            power_allocated_watts: entry.power_allocated_watts,
            power_limit_watts: entry.power_limit.and_then(|limit| limit.limit_in_watts),
            health: entry.status.health,
            state: entry.status.state,
        };
        out.push(TelemetryRecord::new(
            timestamp,
            host,
            Category::Power,
            RecordData::PowerControl(data),
        ));
    }

    for sensor in resource.voltages {
        let data = VoltageRecord {
            sensor_id: sensor.member_id,
            sensor_name: sensor.name,
            reading_volts: sensor.reading_volts,
            upper_threshold_critical: sensor.upper_threshold_critical,
            upper_threshold_fatal: sensor.upper_threshold_fatal,
            lower_threshold_critical: sensor.lower_threshold_critical,
            lower_threshold_fatal: sensor.lower_threshold_fatal,
            health: sensor.status.health,
            state: sensor.status.state,
            physical_context: sensor.physical_context,
        };
        out.push(TelemetryRecord::new(
            timestamp,
            host,
            Category::Power,
            RecordData::Voltage(data),
        ));
    }

    for psu in resource.power_supplies {
        let efficiency_percent =
            efficiency(psu.efficiency_percent, psu.power_input_watts, psu.power_output_watts);
        let data = PowerSupplyRecord {
            sensor_id: psu.member_id,
            sensor_name: psu.name,
            power_capacity_watts: psu.power_capacity_watts,
            power_input_watts: psu.power_input_watts,
            power_output_watts: psu.power_output_watts,
            efficiency_percent,
            line_input_voltage: psu.line_input_voltage,
            line_input_voltage_type: psu.line_input_voltage_type,
            model: psu.model,
            manufacturer: psu.manufacturer,
            serial_number: psu.serial_number,
            part_number: psu.part_number,
            firmware_version: psu.firmware_version,
            health: psu.status.health,
            state: psu.status.state,
        };
        out.push(TelemetryRecord::new(
            timestamp,
            host,
            Category::Power,
            RecordData::PowerSupply(data),
        ));
    }

    out
}

/// Prefer the BMC-reported efficiency; otherwise derive it from output over
/// input watts. Missing readings or a non-positive input leave it absent.
fn efficiency(reported: Option<f64>, input: Option<f64>, output: Option<f64>) -> Option<f64> {
    if reported.is_some() {
        return reported;
    }
    match (input, output) {
        (Some(input), Some(output)) if input > 0.0 => Some(output / input * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn three_sublists_become_three_record_types() {
        let resource: PowerResource = decode(
            "http://test",
            json!({
                "PowerControl": [
                    {"MemberId": "0", "Name": "Server Power Control",
                     "PowerConsumedWatts": 212.0,
                     "PowerLimit": {"LimitInWatts": 500.0}}
                ],
                "Voltages": [
                    {"MemberId": "0", "Name": "VR P0", "ReadingVolts": 1.78}
                ],
                "PowerSupplies": [
                    {"MemberId": "0", "Name": "PSU1", "PowerInputWatts": 250.0,
                     "PowerOutputWatts": 225.0, "Status": {"Health": "OK"}}
                ]
            }),
        )
        .unwrap();

        let records = records("bmc01", Utc::now(), resource);
        let types: Vec<&str> = records.iter().map(|r| r.type_name()).collect();
        assert_eq!(types, ["power_control", "voltage", "power_supply"]);

        let RecordData::PowerControl(ref control) = records[0].data else {
            panic!("expected power_control record");
        };
        assert_eq!(control.power_limit_watts, Some(500.0));
    }

    #[test]
    fn psu_efficiency_derived_when_not_reported() {
        assert_eq!(efficiency(None, Some(250.0), Some(225.0)), Some(90.0));
    }

    #[test]
    fn reported_efficiency_wins_over_derivation() {
        assert_eq!(efficiency(Some(94.0), Some(250.0), Some(225.0)), Some(94.0));
    }

    #[test]
    fn efficiency_stays_absent_without_enough_data() {
        assert_eq!(efficiency(None, None, Some(225.0)), None);
        assert_eq!(efficiency(None, Some(250.0), None), None);
        // zero input never divides
        assert_eq!(efficiency(None, Some(0.0), Some(225.0)), None);
    }
}
