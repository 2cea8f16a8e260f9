use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared::{
    domain::{DetailItem, ListItem},
    error::FetchError,
    protocol::{MealRecord, MealsEnvelope},
};
use tracing::{debug, warn};

use crate::{FetchResult, MealClient};

pub const MOCK_DETAIL_UNAVAILABLE: &str = "detail lookup is not available from the mock client";
const BUNDLED_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/meal_list_sample.json");

/// Serves the list from a canned JSON envelope on disk. Detail lookups always
/// fail.
#[derive(Debug, Clone)]
pub struct MockMealClient {
    fixture_path: PathBuf,
}

impl MockMealClient {
    pub fn new(fixture_path: impl Into<PathBuf>) -> Self {
        Self {
            fixture_path: fixture_path.into(),
        }
    }

    /// The sample fixture shipped with this crate. The path is absolute and
    /// fixed at build time, so it only resolves where the source tree exists;
    /// installed binaries should pass their own fixture to [`Self::new`].
    pub fn bundled() -> Self {
        Self::new(BUNDLED_FIXTURE)
    }

    pub fn fixture_path(&self) -> &Path {
        &self.fixture_path
    }
}

#[async_trait]
impl MealClient for MockMealClient {
    async fn fetch_list(&self) -> FetchResult<Vec<ListItem>> {
        debug!(path = %self.fixture_path.display(), "reading meal list fixture");
        let raw = tokio::fs::read(&self.fixture_path).await.map_err(|err| {
            warn!(path = %self.fixture_path.display(), error = %err, "meal list fixture unreadable");
            FetchError::File {
                path: self.fixture_path.display().to_string(),
                reason: err.to_string(),
            }
        })?;
        let envelope: MealsEnvelope<MealRecord> =
            serde_json::from_slice(&raw).map_err(|err| FetchError::decode(err.to_string()))?;
        Ok(envelope
            .into_records()
            .into_iter()
            .map(ListItem::from)
            .collect())
    }

    async fn fetch_detail(&self, _id: &str) -> FetchResult<DetailItem> {
        Err(FetchError::invalid_request(MOCK_DETAIL_UNAVAILABLE))
    }
}
