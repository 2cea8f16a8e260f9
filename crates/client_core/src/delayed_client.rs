use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use shared::domain::{DetailItem, ListItem};

use crate::{ClientConfig, FetchResult, LiveMealClient, MealClient};

pub const DEFAULT_ARTIFICIAL_DELAY: Duration = Duration::from_secs(3);

/// Sleeps before delegating each call, so loading states stay visible.
pub struct DelayedMealClient {
    inner: Arc<dyn MealClient>,
    delay: Duration,
}

impl DelayedMealClient {
    pub fn new(inner: Arc<dyn MealClient>, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn live(config: ClientConfig, delay: Duration) -> FetchResult<Self> {
        Ok(Self::new(Arc::new(LiveMealClient::new(config)?), delay))
    }
}

#[async_trait]
impl MealClient for DelayedMealClient {
    async fn fetch_list(&self) -> FetchResult<Vec<ListItem>> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_list().await
    }

    async fn fetch_detail(&self, id: &str) -> FetchResult<DetailItem> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch_detail(id).await
    }
}
