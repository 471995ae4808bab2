use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, Status};
use crate::error::ExtractionError;
use crate::telemetry::discovery::EndpointMap;
use crate::telemetry::types::{Category, FanRecord, RecordData, TelemetryRecord, TemperatureRecord};
use crate::transport::RedfishTransport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ThermalResource {
    #[serde(default)]
    temperatures: Vec<TemperatureSensor>,
    #[serde(default)]
    fans: Vec<FanSensor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TemperatureSensor {
    member_id: Option<String>,
    name: Option<String>,
    reading_celsius: Option<f64>,
    upper_threshold_critical: Option<f64>,
    upper_threshold_fatal: Option<f64>,
    lower_threshold_critical: Option<f64>,
    #[serde(default)]
    status: Status,
    physical_context: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FanSensor {
    member_id: Option<String>,
    name: Option<String>,
    reading: Option<i64>,
    reading_units: Option<String>,
    upper_threshold_critical: Option<i64>,
    lower_threshold_critical: Option<i64>,
    #[serde(default)]
    status: Status,
    physical_context: Option<String>,
}

/// One GET of the chassis Thermal resource; every temperature sensor and
/// every fan becomes its own record. Missing thresholds stay absent rather
/// than defaulting to zero.
pub async fn collect_thermal(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<TelemetryRecord>, ExtractionError> {
    let url = format!("{}/Thermal", endpoints.chassis);
    let body = transport.get_json(&url).await?;
    let resource: ThermalResource = decode(&url, body)?;
    Ok(records(transport.host(), Utc::now(), resource))
}

fn records(host: &str, timestamp: DateTime<Utc>, resource: ThermalResource) -> Vec<TelemetryRecord> {
    let mut out = Vec::new();

    for sensor in resource.temperatures {
        let data = TemperatureRecord {
            sensor_id: sensor.member_id,
            sensor_name: sensor.name,
            reading_celsius: sensor.reading_celsius,
            upper_threshold_critical: sensor.upper_threshold_critical,
            upper_threshold_fatal: sensor.upper_threshold_fatal,
            lower_threshold_critical: sensor.lower_threshold_critical,
            health: sensor.status.health,
            state: sensor.status.state,
            physical_context: sensor.physical_context,
        };
        out.push(TelemetryRecord::new(
            timestamp,
            host,
            Category::Thermal,
            RecordData::Temperature(data),
        ));
    }

    for fan in resource.fans {
        let data = FanRecord {
            sensor_id: fan.member_id,
            sensor_name: fan.name,
            reading_rpm: fan.reading,
            reading_units: fan.reading_units,
            upper_threshold_critical: fan.upper_threshold_critical,
            lower_threshold_critical: fan.lower_threshold_critical,
            health: fan.status.health,
            state: fan.status.state,
            physical_context: fan.physical_context,
        };
        out.push(TelemetryRecord::new(
            timestamp,
            host,
            Category::Thermal,
            RecordData::Fan(data),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sensors_and_fans_become_separate_records() {
        let resource: ThermalResource = decode(
            "http://test",
            json!({
                "Temperatures": [
                    {"MemberId": "0", "Name": "CPU1 Temp", "ReadingCelsius": 60.0,
                     "UpperThresholdCritical": 90.0, "Status": {"Health": "OK"}},
                    {"MemberId": "1", "Name": "CPU2 Temp", "ReadingCelsius": 90.0}
                ],
                "Fans": [
                    {"MemberId": "0", "Name": "Fan1", "Reading": 3000,
                     "ReadingUnits": "RPM", "Status": {"Health": "OK", "State": "Enabled"}}
                ]
            }),
        )
        .unwrap();

        let records = records("bmc01", Utc::now(), resource);
        assert_eq!(records.len(), 3);

        let types: Vec<&str> = records.iter().map(|r| r.type_name()).collect();
        assert_eq!(types, ["temperature", "temperature", "fan"]);

        let RecordData::Temperature(ref first) = records[0].data else {
            panic!("expected temperature record");
        };
        assert_eq!(first.reading_celsius, Some(60.0));
        let RecordData::Temperature(ref second) = records[1].data else {
            panic!("expected temperature record");
        };
        assert_eq!(second.reading_celsius, Some(90.0));
        // a threshold the BMC did not report stays absent
        assert!(second.upper_threshold_critical.is_none());

        let RecordData::Fan(ref fan) = records[2].data else {
            panic!("expected fan record");
        };
        assert_eq!(fan.reading_rpm, Some(3000));
    }

    #[test]
    fn empty_thermal_resource_yields_no_records() {
        let resource: ThermalResource = decode("http://test", json!({})).unwrap();
        assert!(records("bmc01", Utc::now(), resource).is_empty());
    }
}
