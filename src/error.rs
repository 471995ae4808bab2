use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Network-level failures. Always carries the URL that failed so BMC-side
/// problems can be pinned to a resource.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{method} {url} failed: {source}")]
    Request {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: StatusCode,
    },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Endpoint resolution failures. Fatal: a run never proceeds with a
/// partially populated endpoint map.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{url} has no {link} link")]
    MissingLink { url: String, link: String },

    #[error("collection {url} has no members")]
    EmptyCollection { url: String },

    #[error("collection {url} has {count} members; multi-system topologies are not supported")]
    MultipleMembers { url: String, count: usize },
}

/// A single category's fetch or parse failure. Recorded per category by the
/// collector; never aborts the other categories.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected payload from {url}: {source}")]
    Payload {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialization or file-write failure during export. Reported to the user;
/// the in-memory record buffer is left intact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
