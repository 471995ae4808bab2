use anyhow::{Context, Result};
use clap::ValueEnum;
use log::info;
use serde::Serialize;
use serde_json::{json, Value};

use crate::telemetry::discovery::EndpointMap;
use crate::transport::RedfishTransport;

/// Redfish `IndicatorLED` states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[value(rename_all = "PascalCase")]
pub enum LedState {
    Off,
    Lit,
    Blinking,
}

pub async fn get_led_state(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<String> {
    let body = transport.get_json(&endpoints.system).await?;
    body.get("IndicatorLED")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("system resource reports no IndicatorLED")
}

pub async fn set_led_state(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
    state: LedState,
) -> Result<()> {
    transport
        .patch_json(&endpoints.system, &json!({ "IndicatorLED": state }))
        .await
        .with_context(|| format!("failed to set LED state to {:?}", state))?;
    info!("LED state on {} set to {:?}", transport.host(), state);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn led_state_serializes_to_redfish_names() {
        assert_eq!(
            json!({"IndicatorLED": LedState::Blinking}),
            json!({"IndicatorLED": "Blinking"})
        );
    }
}
