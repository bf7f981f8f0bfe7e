//! Backend access: the HTTP client, its error type, and the response envelope the
//! dashboard API wraps every payload in.

pub mod client;
pub mod errors;

pub use client::{ApiClient, Auth};
pub use errors::ApiError;

use serde::Deserialize;

/// `{ "data": T, "message": "..." }`, or a bare `T` from endpoints that skip the wrapper.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        data: T,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> T {
        match self {
            Self::Wrapped { data, .. } | Self::Bare(data) => data,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Wrapped { message, .. } => message.as_deref(),
            Self::Bare(_) => None,
        }
    }
}
