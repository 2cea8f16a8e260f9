use shared::{
    domain::{DetailItem, ListItem},
    error::FetchError,
};

/// Progress of one fetch. Transitions replace the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncState<T> {
    Loading,
    Loaded(T),
    Failed(FetchError),
}

pub type ListState = AsyncState<Vec<ListItem>>;
pub type DetailState = AsyncState<DetailItem>;

impl<T> AsyncState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
