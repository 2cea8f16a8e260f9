use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{DetailItem, ListItem},
    error::FetchError,
    protocol::{MealDetailRecord, MealRecord, MealsEnvelope},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{FetchResult, MealClient};

pub const DEFAULT_BASE_URL: &str = "https://themealdb.com";
pub const DEFAULT_CATEGORY: &str = "Dessert";
const LIST_PATH: &str = "/api/json/v1/1/filter.php";
const DETAIL_PATH: &str = "/api/json/v1/1/lookup.php";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub category: String,
    /// Transport-level timeout per request. The controller enforces none.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            category: DEFAULT_CATEGORY.into(),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// HTTP client for the TheMealDB JSON API.
#[derive(Debug, Clone)]
pub struct LiveMealClient {
    http: Client,
    base_url: Url,
    category: String,
}

impl LiveMealClient {
    pub fn new(config: ClientConfig) -> FetchResult<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|err| {
            FetchError::invalid_request(format!("invalid base url '{}': {err}", config.base_url))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(FetchError::invalid_request(format!(
                "base url must start with http:// or https://, got '{base_url}'"
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| FetchError::network(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            category: config.category,
        })
    }

    fn endpoint(&self, path: &str, key: &str, value: &str) -> FetchResult<Url> {
        let mut url = self.base_url.join(path).map_err(|err| {
            FetchError::invalid_request(format!("failed to build url for {path}: {err}"))
        })?;
        url.query_pairs_mut().clear().append_pair(key, value);
        Ok(url)
    }

    pub fn list_url(&self) -> FetchResult<Url> {
        self.endpoint(LIST_PATH, "c", &self.category)
    }

    pub fn detail_url(&self, id: &str) -> FetchResult<Url> {
        self.endpoint(DETAIL_PATH, "i", id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?
            .error_for_status()
            .map_err(|err| FetchError::network(err.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        serde_json::from_slice(&body).map_err(|err| FetchError::decode(err.to_string()))
    }
}

#[async_trait]
impl MealClient for LiveMealClient {
    async fn fetch_list(&self) -> FetchResult<Vec<ListItem>> {
        let url = self.list_url()?;
        debug!(%url, "fetching meal list");
        let envelope: MealsEnvelope<MealRecord> = self.get_json(url).await.map_err(|err| {
            warn!(error = %err, "meal list request failed");
            err
        })?;
        let items: Vec<ListItem> = envelope
            .into_records()
            .into_iter()
            .map(ListItem::from)
            .collect();
        info!(count = items.len(), category = %self.category, "fetched meal list");
        Ok(items)
    }

    async fn fetch_detail(&self, id: &str) -> FetchResult<DetailItem> {
        if id.trim().is_empty() {
            return Err(FetchError::invalid_request("meal id must not be empty"));
        }
        let url = self.detail_url(id)?;
        debug!(%url, id, "fetching meal detail");
        let envelope: MealsEnvelope<MealDetailRecord> =
            self.get_json(url).await.map_err(|err| {
                warn!(id, error = %err, "meal detail request failed");
                err
            })?;
        let record = envelope
            .into_records()
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::not_found(id))?;
        info!(id, title = %record.title, "fetched meal detail");
        Ok(DetailItem::from(record))
    }
}
