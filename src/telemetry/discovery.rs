use log::{debug, info};
use serde_json::Value;

use crate::error::DiscoveryError;
use crate::transport::RedfishTransport;

pub const SERVICE_ROOT_PATH: &str = "/redfish/v1/";

/// Absolute URLs for the resources everything else hangs off. Built once per
/// run by [`resolve`] and read-only afterwards. `system`, `chassis` and
/// `manager` point at the sole member of their collections.
#[derive(Debug, Clone)]
pub struct EndpointMap {
    pub service_root: String,
    pub system: String,
    pub chassis: String,
    pub manager: String,
    /// Advertised by some BMCs; absence only disables that capability.
    pub telemetry_service: Option<String>,
}

/// Walk the service root down to the managed system, chassis and manager
/// resources. Never returns a partially populated map: any unreachable
/// resource, missing link or unsupported topology fails the whole walk.
pub async fn resolve(transport: &RedfishTransport) -> Result<EndpointMap, DiscoveryError> {
    let root_url = transport.url(SERVICE_ROOT_PATH);
    let root = transport.get_json(&root_url).await?;

    let system = resolve_sole_member(transport, &root_url, &root, "Systems").await?;
    let chassis = resolve_sole_member(transport, &root_url, &root, "Chassis").await?;
    let manager = resolve_sole_member(transport, &root_url, &root, "Managers").await?;

    // absence of a telemetry service is not an error, it just disables
    // that capability
    let telemetry_service = link_of(&root, "TelemetryService").map(|path| transport.url(&path));

    let map = EndpointMap {
        service_root: root_url,
        system,
        chassis,
        manager,
        telemetry_service,
    };
    debug!(
        "{}: system={}, chassis={}, manager={}, telemetry_service={:?}",
        map.service_root, map.system, map.chassis, map.manager, map.telemetry_service
    );
    info!("resolved Redfish endpoints for {}", transport.host());
    Ok(map)
}

/// Follow a collection link off the service root and return its only
/// member's URL. Multi-member collections are an unsupported topology and
/// fail loudly rather than silently picking one.
async fn resolve_sole_member(
    transport: &RedfishTransport,
    root_url: &str,
    root: &Value,
    link: &str,
) -> Result<String, DiscoveryError> {
    let path = link_of(root, link).ok_or_else(|| DiscoveryError::MissingLink {
        url: root_url.to_string(),
        link: link.to_string(),
    })?;

    let collection_url = transport.url(&path);
    let collection = transport.get_json(&collection_url).await?;

    let members = member_links(&collection);
    match members.as_slice() {
        [] => Err(DiscoveryError::EmptyCollection {
            url: collection_url,
        }),
        [only] => Ok(transport.url(only)),
        _ => Err(DiscoveryError::MultipleMembers {
            url: collection_url,
            count: members.len(),
        }),
    }
}

fn link_of(body: &Value, key: &str) -> Option<String> {
    body.get(key)?
        .get("@odata.id")?
        .as_str()
        .map(str::to_string)
}

fn member_links(collection: &Value) -> Vec<String> {
    collection
        .get("Members")
        .and_then(Value::as_array)
        .map(|members| {
            members
                .iter()
                .filter_map(|m| m.get("@odata.id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn link_of_follows_odata_id() {
        let root = json!({"Systems": {"@odata.id": "/redfish/v1/Systems"}});
        assert_eq!(link_of(&root, "Systems").as_deref(), Some("/redfish/v1/Systems"));
        assert_eq!(link_of(&root, "Chassis"), None);
    }

    #[test]
    fn member_links_collects_all_members() {
        let collection = json!({
            "Members": [
                {"@odata.id": "/redfish/v1/Systems/1"},
                {"@odata.id": "/redfish/v1/Systems/2"}
            ]
        });
        assert_eq!(
            member_links(&collection),
            ["/redfish/v1/Systems/1", "/redfish/v1/Systems/2"]
        );
    }

    #[test]
    fn member_links_tolerates_missing_members_key() {
        assert!(member_links(&json!({})).is_empty());
    }
}
