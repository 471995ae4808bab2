use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, Collection, Status};
use crate::error::ExtractionError;
use crate::telemetry::discovery::EndpointMap;
use crate::telemetry::types::{Category, InterfaceRecord, RecordData, TelemetryRecord};
use crate::transport::RedfishTransport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NetworkInterfaceResource {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    status: Status,
    network_ports: Option<PortsLink>,
}

/// The `NetworkPorts` link embedded in an interface body. The port count
/// comes from the inline count annotation; the ports collection itself is
/// never fetched.
#[derive(Debug, Default, Deserialize)]
struct PortsLink {
    #[serde(rename = "Members@odata.count")]
    count: Option<u64>,
}

/// Collection GET plus one GET per interface.
pub async fn collect_network(
    transport: &RedfishTransport,
    endpoints: &EndpointMap,
) -> Result<Vec<TelemetryRecord>, ExtractionError> {
    let url = format!("{}/NetworkInterfaces", endpoints.system);
    let body = transport.get_json(&url).await?;
    let collection: Collection = decode(&url, body)?;

    let timestamp = Utc::now();
    let mut records = Vec::with_capacity(collection.members.len());
    for member in collection.members {
        let member_url = transport.url(&member.odata_id);
        let body = transport.get_json(&member_url).await?;
        let resource: NetworkInterfaceResource = decode(&member_url, body)?;
        records.push(record(transport.host(), timestamp, resource));
    }
    Ok(records)
}

fn record(
    host: &str,
    timestamp: DateTime<Utc>,
    resource: NetworkInterfaceResource,
) -> TelemetryRecord {
    let data = InterfaceRecord {
        interface_id: resource.id,
        name: resource.name,
        description: resource.description,
        port_count: resource.network_ports.and_then(|ports| ports.count),
        health: resource.status.health,
        state: resource.status.state,
    };
    TelemetryRecord::new(timestamp, host, Category::Network, RecordData::Interface(data))
}
