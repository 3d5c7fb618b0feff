//! Single-object detail view.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::SyncError;
use crate::normalize::{NormalizedAsteroid, RecordRejection, normalize_value};

/// How many of the latest close approaches a detail view keeps.
pub const APPROACH_WINDOW: usize = 6;

/// The full lookup payload with a capped approach history and a scored
/// assessment of its first Earth approach.
#[derive(Debug, Clone, Serialize)]
pub struct NeoDetail {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    pub assessment: Option<NormalizedAsteroid>,
}

impl NeoDetail {
    pub fn close_approaches(&self) -> &[Value] {
        self.payload
            .get("close_approach_data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Trims `close_approach_data` to the last [`APPROACH_WINDOW`] events and
/// scores the window with the same rules as the feed.
///
/// Non-Earth approaches stay in the window. The assessment is `None` when
/// none of the kept approaches is an Earth approach.
///
/// # Errors
///
/// [`SyncError::MalformedPayload`] when `close_approach_data` is not an array.
pub fn build_detail(mut payload: Map<String, Value>) -> Result<NeoDetail, SyncError> {
    let Some(Value::Array(approaches)) = payload.get_mut("close_approach_data") else {
        return Err(SyncError::MalformedPayload);
    };
    let excess = approaches.len().saturating_sub(APPROACH_WINDOW);
    approaches.drain(..excess);

    let assessment = match normalize_value(&Value::Object(payload.clone())) {
        Ok(asteroid) => Some(asteroid),
        Err(RecordRejection::NoEarthApproach) => None,
        Err(e) => {
            warn!(id = ?payload.get("id"), error = %e, "Detail payload could not be scored");
            None
        }
    };

    Ok(NeoDetail {
        payload,
        assessment,
    })
}
