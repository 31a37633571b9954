use interprocess::local_socket::{GenericNamespaced, Name, ToNsName};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use whereami_logic::{AddOutcome, RecordId, RecordListError, RowText};

pub mod prelude {
    pub use anyhow::{Context, anyhow, bail};
    pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
}

pub use prelude::*;

pub fn get_socket_name(base_name: String) -> Result<Name<'static>> {
    base_name
        .to_ns_name::<GenericNamespaced>()
        .context("Failed to parse socket name")
}

/// One JSON message per line on the socket
pub fn encode_line(msg: &impl Serialize) -> Result<Vec<u8>> {
    let mut encoded = serde_json::to_vec(msg).context("Failed to encode")?;
    encoded.push(b'\n');
    Ok(encoded)
}

/// Throw away anything queued for a previous connection, returns how many were dropped
pub fn drain_stale(responses: &mut mpsc::Receiver<TestingResponse>) -> usize {
    let mut dropped = 0;
    while responses.try_recv().is_ok() {
        dropped += 1;
    }
    dropped
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TestingRequest {
    /// Record the current location
    Add,
    /// Delete the row at the given index
    Delete(usize),
    /// Get every row
    Rows,
    /// Get the number of rows
    Count,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TestingResponse {
    Added(RecordId),
    Debounced,
    Stale,
    LocationFailed(String),
    Deleted(RowText),
    Rows(Vec<RowText>),
    Count(usize),
    /// Not a reply, sent whenever the list changes
    ListUpdated,
    Error(String),
}

impl TestingResponse {
    /// Whether this answers a request, as opposed to being a notification
    pub fn is_reply(&self) -> bool {
        !matches!(self, Self::ListUpdated)
    }
}

impl From<AddOutcome> for TestingResponse {
    fn from(value: AddOutcome) -> Self {
        match value {
            AddOutcome::Added(id) => Self::Added(id),
            AddOutcome::Debounced => Self::Debounced,
            AddOutcome::Stale => Self::Stale,
            AddOutcome::LocationFailed(why) => Self::LocationFailed(why),
        }
    }
}

impl From<RecordListError> for TestingResponse {
    fn from(value: RecordListError) -> Self {
        Self::Error(value.to_string())
    }
}

impl From<anyhow::Error> for TestingResponse {
    fn from(value: anyhow::Error) -> Self {
        Self::Error(value.to_string())
    }
}
