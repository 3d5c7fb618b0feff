//! Fetch-then-transform pipelines shared by the CLI and the HTTP API.

use tracing::info;

use crate::detail::{NeoDetail, build_detail};
use crate::error::SyncError;
use crate::normalize::{NormalizedAsteroid, normalize_feed};
use crate::services::neo_api::{DateRange, NeoApi};

/// Fetches the feed for `range` and returns every scored Earth approach.
pub async fn sync_feed<A: NeoApi + ?Sized>(
    api: &A,
    range: DateRange,
) -> Result<Vec<NormalizedAsteroid>, SyncError> {
    let feed = api.feed(range).await?;
    let asteroids = normalize_feed(&feed);

    info!(
        start = %range.start(),
        end = %range.end(),
        raw = feed.record_count(),
        normalized = asteroids.len(),
        "Feed synced"
    );
    Ok(asteroids)
}

/// Looks up one object and builds its detail view.
pub async fn sync_detail<A: NeoApi + ?Sized>(api: &A, id: &str) -> Result<NeoDetail, SyncError> {
    let payload = api.lookup(id).await?;
    build_detail(payload)
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use serde_json::{Map, Value};

    use crate::error::SyncError;
    use crate::feed::RawFeed;
    use crate::services::neo_api::{DateRange, NeoApi};

    /// In-memory provider serving one feed and one lookup payload.
    pub struct StaticApi {
        pub feed: Value,
        pub lookup: Value,
    }

    #[async_trait]
    impl NeoApi for StaticApi {
        async fn feed(&self, _range: DateRange) -> Result<RawFeed, SyncError> {
            serde_json::from_value(self.feed.clone()).map_err(|_| SyncError::MalformedPayload)
        }

        async fn lookup(&self, id: &str) -> Result<Map<String, Value>, SyncError> {
            match &self.lookup {
                Value::Object(map) if map.get("id").and_then(Value::as_str) == Some(id) => {
                    Ok(map.clone())
                }
                _ => Err(SyncError::Upstream {
                    status: 404,
                    message: "Not Found".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticApi;
    use super::*;
    use serde_json::json;

    fn api() -> StaticApi {
        let earth = json!({
            "close_approach_date": "2024-05-01",
            "relative_velocity": {"kilometers_per_second": "30"},
            "miss_distance": {"kilometers": "0"},
            "orbiting_body": "Earth"
        });
        let record = json!({
            "id": "54016",
            "name": "(2020 AB)",
            "estimated_diameter": {"meters": {"estimated_diameter_min": 200.0, "estimated_diameter_max": 500.0}},
            "is_potentially_hazardous_asteroid": true,
            "close_approach_data": [earth]
        });
        StaticApi {
            feed: json!({"near_earth_objects": {"2024-05-01": [record.clone()]}}),
            lookup: record,
        }
    }

    fn range() -> DateRange {
        DateRange::parse("2024-05-01", "2024-05-02").unwrap()
    }

    #[tokio::test]
    async fn test_sync_feed_scores_records() {
        let asteroids = sync_feed(&api(), range()).await.unwrap();
        assert_eq!(asteroids.len(), 1);
        assert_eq!(asteroids[0].risk_score, 100);
    }

    #[tokio::test]
    async fn test_sync_detail_found_and_missing() {
        let detail = sync_detail(&api(), "54016").await.unwrap();
        assert_eq!(detail.assessment.unwrap().id, "54016");

        let err = sync_detail(&api(), "1").await.unwrap_err();
        assert_eq!(err.status(), 404);
    }
}
