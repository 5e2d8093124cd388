use alloc::string::{String, ToString};

/// Invalid windowing or loading parameters.
///
/// These indicate a caller bug, so they are reported immediately instead of being degraded.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("item height must be greater than zero")]
    ZeroItemHeight,
    #[error("scroll threshold must be within (0, 1], got {0}")]
    InvalidScrollThreshold(f32),
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,
    #[error("items per page must be greater than zero")]
    ZeroItemsPerPage,
}

/// A failed page fetch, carried as a human-readable message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub const DEFAULT_MESSAGE: &'static str = "Failed to load more items";

    pub fn new(message: impl core::fmt::Display) -> Self {
        let message = message.to_string();
        if message.is_empty() {
            return Self::default();
        }
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

impl Default for FetchError {
    fn default() -> Self {
        Self {
            message: Self::DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
