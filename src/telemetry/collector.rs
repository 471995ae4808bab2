use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DiscoveryError, ExtractionError};
use crate::telemetry::discovery::{self, EndpointMap};
use crate::telemetry::extract;
use crate::telemetry::types::{Category, TelemetryRecord};
use crate::transport::RedfishTransport;

/// What one collection pass produced: successful records in fixed category
/// order plus a side map of the categories that failed.
#[derive(Debug, Default)]
pub struct CollectionResult {
    pub records: Vec<TelemetryRecord>,
    pub errors: BTreeMap<Category, ExtractionError>,
}

impl CollectionResult {
    /// At least one category produced records.
    pub fn has_records(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Owns the transport and the endpoint map for the lifetime of one run. The
/// map is resolved on the first collection pass and reused afterwards.
pub struct Collector {
    transport: RedfishTransport,
    endpoints: Option<EndpointMap>,
}

impl Collector {
    pub fn new(transport: RedfishTransport) -> Self {
        Self {
            transport,
            endpoints: None,
        }
    }

    pub fn host(&self) -> &str {
        self.transport.host()
    }

    pub async fn collect_all(&mut self) -> Result<CollectionResult, DiscoveryError> {
        self.collect(&Category::ALL.into_iter().collect()).await
    }

    /// Run the requested extractors in the fixed category order. A failing
    /// category lands in the error map and never aborts the others; only
    /// endpoint resolution is fatal.
    pub async fn collect(
        &mut self,
        categories: &BTreeSet<Category>,
    ) -> Result<CollectionResult, DiscoveryError> {
        let endpoints = match self.endpoints.take() {
            Some(map) => map,
            None => discovery::resolve(&self.transport).await?,
        };

        let mut result = CollectionResult::default();
        for category in Category::ALL {
            if !categories.contains(&category) {
                continue;
            }
            let outcome = match category {
                Category::System => extract::collect_system(&self.transport, &endpoints).await,
                Category::Thermal => extract::collect_thermal(&self.transport, &endpoints).await,
                Category::Power => extract::collect_power(&self.transport, &endpoints).await,
                Category::Processor => {
                    extract::collect_processors(&self.transport, &endpoints).await
                }
                Category::Memory => extract::collect_memory(&self.transport, &endpoints).await,
                Category::Network => extract::collect_network(&self.transport, &endpoints).await,
                Category::Storage => extract::collect_storage(&self.transport, &endpoints).await,
            };
            accumulate(&mut result, category, outcome);
        }

        self.endpoints = Some(endpoints);
        Ok(result)
    }
}

/// Fold one category's outcome into the pass result. Errors land in the
/// side map and leave every other category's records untouched.
fn accumulate(
    result: &mut CollectionResult,
    category: Category,
    outcome: Result<Vec<TelemetryRecord>, ExtractionError>,
) {
    match outcome {
        Ok(mut records) => {
            debug!("{}: {} records", category, records.len());
            result.records.append(&mut records);
        }
        Err(err) => {
            warn!("{} collection failed: {}", category, err);
            result.errors.insert(category, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::telemetry::types::{RecordData, SystemRecord, TelemetryRecord};
    use chrono::Utc;
    use reqwest::StatusCode;

    fn system_record() -> TelemetryRecord {
        TelemetryRecord::new(
            Utc::now(),
            "bmc01",
            Category::System,
            RecordData::System(SystemRecord::default()),
        )
    }

    #[test]
    fn one_failed_category_leaves_the_others_intact() {
        let mut result = CollectionResult::default();

        accumulate(&mut result, Category::System, Ok(vec![system_record()]));
        accumulate(
            &mut result,
            Category::Storage,
            Err(ExtractionError::Transport(TransportError::Status {
                method: "GET",
                url: "https://bmc01/redfish/v1/Systems/1/Storage".to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            })),
        );
        accumulate(&mut result, Category::Thermal, Ok(vec![]));

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].category, Category::System);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors.contains_key(&Category::Storage));
        assert!(result.has_records());
    }
}
