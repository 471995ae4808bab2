//! Subsystem extractors. Each is an independent fetch-then-parse function;
//! a failure in one category never aborts another (the collector enforces
//! that isolation).

pub mod memory;
pub mod network;
pub mod power;
pub mod processor;
pub mod storage;
pub mod system;
pub mod thermal;

pub use memory::collect_memory;
pub use network::collect_network;
pub use power::collect_power;
pub use processor::collect_processors;
pub use storage::collect_storage;
pub use system::collect_system;
pub use thermal::collect_thermal;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ExtractionError;
use crate::telemetry::types::{Health, State};

/// Redfish `Status` sub-object, shared by nearly every resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Status {
    #[serde(default)]
    pub health: Option<Health>,
    #[serde(default)]
    pub state: Option<State>,
}

/// A `{"@odata.id": "..."}` navigation link.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ODataId {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

/// The member list of a Redfish collection resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Collection {
    #[serde(default, rename = "Members")]
    pub members: Vec<ODataId>,
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: Value) -> Result<T, ExtractionError> {
    serde_json::from_value(body).map_err(|source| ExtractionError::Payload {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_deserializes_health_and_state() {
        let status: Status =
            serde_json::from_value(json!({"Health": "OK", "State": "Enabled"})).unwrap();
        assert_eq!(status.health, Some(Health::Ok));
        assert_eq!(status.state, Some(State::Enabled));
    }

    #[test]
    fn status_fields_default_to_absent() {
        let status: Status = serde_json::from_value(json!({})).unwrap();
        assert_eq!(status.health, None);
        assert_eq!(status.state, None);
    }

    #[test]
    fn collection_parses_member_links() {
        let collection: Collection = decode(
            "http://test",
            json!({"Members": [{"@odata.id": "/redfish/v1/Systems/1/Processors/CPU0"}]}),
        )
        .unwrap();
        assert_eq!(collection.members.len(), 1);
        assert_eq!(
            collection.members[0].odata_id,
            "/redfish/v1/Systems/1/Processors/CPU0"
        );
    }
}
