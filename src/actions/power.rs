use anyhow::{Context, Result};
use clap::ValueEnum;
use log::info;
use serde::Serialize;
use serde_json::{json, Value};

use crate::telemetry::discovery::EndpointMap;
use crate::telemetry::types::PowerState;
use crate::transport::RedfishTransport;

/// Redfish `#ComputerSystem.Reset` actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[value(rename_all = "PascalCase")]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    GracefulRestart,
    ForceRestart,
    Nmi,
    ForceOn,
    PushPowerButton,
}

pub async fn get_power_state(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<PowerState> {
    let body = transport.get_json(&endpoints.system).await?;
    let state = body
        .get("PowerState")
        .cloned()
        .context("system resource reports no PowerState")?;
    serde_json::from_value(state).context("unrecognized PowerState value")
}

/// Execute a reset action against the target advertised by the system
/// resource.
pub async fn set_power_state(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
    action: ResetType,
) -> Result<()> {
    let body = transport.get_json(&endpoints.system).await?;
    let target = reset_target(&body).context("system resource exposes no reset action")?;
    let url = transport.url(&target);

    transport
        .post_json(&url, &json!({ "ResetType": action }))
        .await
        .with_context(|| format!("reset action {:?} failed", action))?;
    info!("power action {:?} accepted by {}", action, transport.host());
    Ok(())
}

/// List the reset values this BMC accepts, from the inline allowable-values
/// annotation or the linked ActionInfo resource.
pub async fn available_actions(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<String>> {
    let body = transport.get_json(&endpoints.system).await?;
    let reset = body
        .pointer("/Actions/#ComputerSystem.Reset")
        .context("system resource exposes no reset action")?;

    if let Some(values) = string_list(reset.get("ResetType@Redfish.AllowableValues")) {
        return Ok(values);
    }

    let info_path = reset
        .get("@Redfish.ActionInfo")
        .and_then(Value::as_str)
        .context("reset action advertises no allowable values")?;
    let info = transport.get_json(&transport.url(info_path)).await?;
    let values = info
        .get("Parameters")
        .and_then(Value::as_array)
        .and_then(|params| params.first())
        .and_then(|param| string_list(param.get("AllowableValues")))
        .context("ActionInfo resource lists no allowable values")?;
    Ok(values)
}

fn reset_target(system: &Value) -> Option<String> {
    system
        .pointer("/Actions/#ComputerSystem.Reset/target")?
        .as_str()
        .map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}
