use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Telemetry categories, in the fixed order collection runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    System,
    Thermal,
    Power,
    Processor,
    Memory,
    Network,
    Storage,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::System,
        Category::Thermal,
        Category::Power,
        Category::Processor,
        Category::Memory,
        Category::Network,
        Category::Storage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::System => "system",
            Category::Thermal => "thermal",
            Category::Power => "power",
            Category::Processor => "processor",
            Category::Memory => "memory",
            Category::Network => "network",
            Category::Storage => "storage",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redfish `Status.Health` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
}

/// Redfish `Status.State` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Enabled,
    Disabled,
    StandbyOffline,
    StandbySpare,
    InTest,
    Starting,
    Absent,
    UnavailableOffline,
    Deferring,
    Quiesced,
    Updating,
}

/// Redfish `PowerState` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    On,
    Off,
    Paused,
    PoweringOn,
    PoweringOff,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PowerState::On => "On",
            PowerState::Off => "Off",
            PowerState::Paused => "Paused",
            PowerState::PoweringOn => "PoweringOn",
            PowerState::PoweringOff => "PoweringOff",
        };
        f.write_str(name)
    }
}

/// One normalized telemetry sample. `data` decides the `type` tag and which
/// fields exist; an absent optional field means the hardware did not report
/// it, never that it read zero.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    pub timestamp: DateTime<Utc>,
    pub host: String,
    pub category: Category,
    #[serde(flatten)]
    pub data: RecordData,
}

impl TelemetryRecord {
    pub fn new(timestamp: DateTime<Utc>, host: &str, category: Category, data: RecordData) -> Self {
        Self {
            timestamp,
            host: host.to_string(),
            category,
            data,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.data.type_name()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordData {
    System(SystemRecord),
    Temperature(TemperatureRecord),
    Fan(FanRecord),
    PowerControl(PowerControlRecord),
    Voltage(VoltageRecord),
    PowerSupply(PowerSupplyRecord),
    Cpu(CpuRecord),
    Dimm(DimmRecord),
    Interface(InterfaceRecord),
    Controller(ControllerRecord),
    Drive(DriveRecord),
}

impl RecordData {
    pub fn type_name(&self) -> &'static str {
        match self {
            RecordData::System(_) => "system",
            RecordData::Temperature(_) => "temperature",
            RecordData::Fan(_) => "fan",
            RecordData::PowerControl(_) => "power_control",
            RecordData::Voltage(_) => "voltage",
            RecordData::PowerSupply(_) => "power_supply",
            RecordData::Cpu(_) => "cpu",
            RecordData::Dimm(_) => "dimm",
            RecordData::Interface(_) => "interface",
            RecordData::Controller(_) => "controller",
            RecordData::Drive(_) => "drive",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_state: Option<PowerState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bios_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_source: Option<BootOverrideInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_summary: Option<ProcessorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_summary: Option<MemorySummary>,
}

/// Boot-source override block from the system resource. Values stay as the
/// BMC reports them; writes go through the pxe action, not here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootOverrideInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_enabled: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uefi_target: Option<String>,
}

/// Socket count and model derived from `ProcessorSummary` on the system
/// resource; no extra requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessorSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

/// Total capacity and health derived from `MemorySummary` on the system
/// resource; no extra requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemorySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_system_memory_gib: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TemperatureRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_celsius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_threshold_critical: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_threshold_fatal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_threshold_critical: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_context: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FanRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_rpm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_threshold_critical: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_threshold_critical: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_context: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PowerControlRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_consumed_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_requested_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_available_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_capacity_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_allocated_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_limit_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VoltageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_volts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_threshold_critical: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_threshold_fatal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_threshold_critical: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_threshold_fatal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_context: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PowerSupplyRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_capacity_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_input_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_output_watts: Option<f64>,
    /// Reported by the BMC when available, otherwise derived from
    /// output/input watts; absent when neither source has enough data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_input_voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_input_voltage_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CpuRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed_mhz: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cores: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_threads: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_speed_mhz: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_power_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DimmRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_locator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_mib: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_speed_mhz: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_speeds_mhz: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_width_bits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_width_bits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_power_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InterfaceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ControllerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supported_protocols: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DriveRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_speed_rpm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_predicted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator_led: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_serializes_with_type_tag_and_no_absent_fields() {
        let record = TelemetryRecord::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            "bmc01",
            Category::Thermal,
            RecordData::Temperature(TemperatureRecord {
                sensor_name: Some("CPU1 Temp".to_string()),
                reading_celsius: Some(48.0),
                health: Some(Health::Ok),
                ..Default::default()
            }),
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["category"], "thermal");
        assert_eq!(value["type"], "temperature");
        assert_eq!(value["reading_celsius"], 48.0);
        assert_eq!(value["health"], "OK");
        // absent means absent, not null and not zero
        assert!(value.get("upper_threshold_critical").is_none());
    }

    #[test]
    fn category_order_is_fixed() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            [
                "system",
                "thermal",
                "power",
                "processor",
                "memory",
                "network",
                "storage"
            ]
        );
    }
}
