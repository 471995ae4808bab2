use anyhow::{Context, Result};
use clap::ValueEnum;
use log::info;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Write;

use crate::telemetry::discovery::EndpointMap;
use crate::transport::RedfishTransport;

/// `BootSourceOverrideMode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub enum BootMode {
    #[value(name = "Legacy")]
    #[serde(rename = "Legacy")]
    Legacy,
    #[value(name = "UEFI")]
    #[serde(rename = "UEFI")]
    Uefi,
}

/// `BootSourceOverrideEnabled` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[value(rename_all = "PascalCase")]
pub enum OverrideEnabled {
    Disabled,
    Once,
    Continuous,
}

/// The system resource's `Boot` block as reported.
#[derive(Debug, Default)]
pub struct BootInfo {
    pub override_enabled: Option<String>,
    pub override_target: Option<String>,
    pub override_mode: Option<String>,
    pub uefi_target: Option<String>,
    pub boot_order: Vec<String>,
}

pub async fn get_boot_info(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<BootInfo> {
    let body = transport.get_json(&endpoints.system).await?;
    let boot = body
        .get("Boot")
        .context("system resource reports no Boot configuration")?;

    Ok(BootInfo {
        override_enabled: text_of(boot, "BootSourceOverrideEnabled"),
        override_target: text_of(boot, "BootSourceOverrideTarget"),
        override_mode: text_of(boot, "BootSourceOverrideMode"),
        uefi_target: text_of(boot, "UefiTargetBootSourceOverride"),
        boot_order: boot
            .get("BootOrder")
            .and_then(Value::as_array)
            .map(|order| {
                order
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    })
}

pub fn render_boot_info(info: &BootInfo) -> String {
    let mut out = String::from("\n=== Boot Configuration ===\n");
    let unknown = "Unknown";
    let _ = writeln!(
        out,
        "Boot Override Enabled: {}",
        info.override_enabled.as_deref().unwrap_or(unknown)
    );
    let _ = writeln!(
        out,
        "Boot Override Target: {}",
        info.override_target.as_deref().unwrap_or(unknown)
    );
    let _ = writeln!(
        out,
        "Boot Override Mode: {}",
        info.override_mode.as_deref().unwrap_or(unknown)
    );
    let _ = writeln!(
        out,
        "UEFI Target: {}",
        info.uefi_target.as_deref().unwrap_or(unknown)
    );
    if !info.boot_order.is_empty() {
        let _ = writeln!(out, "Boot Order: {}", info.boot_order.join(", "));
    }
    out
}

/// PXE boot on the next restart only.
pub async fn set_pxe_once(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
    mode: BootMode,
) -> Result<()> {
    set_boot_override(transport, endpoints, "Pxe", OverrideEnabled::Once, mode).await
}

/// PXE boot on every restart until the override is disabled.
pub async fn set_pxe_continuous(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
    mode: BootMode,
) -> Result<()> {
    set_boot_override(transport, endpoints, "Pxe", OverrideEnabled::Continuous, mode).await
}

/// Restore the configured boot order.
pub async fn disable_override(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<()> {
    transport
        .patch_json(
            &endpoints.system,
            &json!({"Boot": {"BootSourceOverrideEnabled": OverrideEnabled::Disabled}}),
        )
        .await
        .context("failed to disable boot override")?;
    info!("boot override disabled on {}", transport.host());
    Ok(())
}

pub async fn set_boot_override(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
    target: &str,
    enabled: OverrideEnabled,
    mode: BootMode,
) -> Result<()> {
    transport
        .patch_json(&endpoints.system, &boot_payload(target, enabled, mode))
        .await
        .with_context(|| format!("failed to set boot target {}", target))?;
    info!(
        "boot override on {}: target={} enabled={:?} mode={:?}",
        transport.host(),
        target,
        enabled,
        mode
    );
    Ok(())
}

pub async fn available_boot_targets(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<String>> {
    let body = transport.get_json(&endpoints.system).await?;
    let targets = body
        .pointer("/Boot/BootSourceOverrideTarget@Redfish.AllowableValues")
        .and_then(Value::as_array)
        .context("system resource lists no allowable boot targets")?;
    Ok(targets
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

fn boot_payload(target: &str, enabled: OverrideEnabled, mode: BootMode) -> Value {
    json!({
        "Boot": {
            "BootSourceOverrideEnabled": enabled,
            "BootSourceOverrideTarget": target,
            "BootSourceOverrideMode": mode,
        }
    })
}

fn text_of(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_redfish_field_values() {
        let payload = boot_payload("Pxe", OverrideEnabled::Once, BootMode::Uefi);
        assert_eq!(
            payload,
            json!({
                "Boot": {
                    "BootSourceOverrideEnabled": "Once",
                    "BootSourceOverrideTarget": "Pxe",
                    "BootSourceOverrideMode": "UEFI",
                }
            })
        );
    }

    #[test]
    fn boot_info_renders_with_order() {
        let info = BootInfo {
            override_enabled: Some("Once".to_string()),
            override_target: Some("Pxe".to_string()),
            boot_order: vec!["Boot0001".to_string(), "Boot0002".to_string()],
            ..Default::default()
        };
        let text = render_boot_info(&info);
        assert!(text.contains("Boot Override Target: Pxe"));
        assert!(text.contains("Boot Order: Boot0001, Boot0002"));
    }
}
