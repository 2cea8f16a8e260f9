use async_trait::async_trait;
use shared::{
    domain::{DetailItem, ListItem},
    error::FetchError,
};

pub mod controller;
mod delayed_client;
mod live_client;
mod mock_client;
pub mod state;

pub use controller::{ControllerEvent, MealsController};
pub use delayed_client::{DelayedMealClient, DEFAULT_ARTIFICIAL_DELAY};
pub use live_client::{ClientConfig, LiveMealClient, DEFAULT_BASE_URL, DEFAULT_CATEGORY};
pub use mock_client::{MockMealClient, MOCK_DETAIL_UNAVAILABLE};
pub use state::{AsyncState, DetailState, ListState};

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Remote operations against the recipe catalog.
///
/// Implementations keep no mutable state between calls and are shared behind
/// an `Arc` by every in-flight fetch.
#[async_trait]
pub trait MealClient: Send + Sync {
    /// Summary records for the configured category, in response order.
    async fn fetch_list(&self) -> FetchResult<Vec<ListItem>>;

    async fn fetch_detail(&self, id: &str) -> FetchResult<DetailItem>;
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
