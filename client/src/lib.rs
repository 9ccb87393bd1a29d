pub mod backoff;
pub mod catalog;
pub mod client;
pub mod credentials;
pub mod orchestrator;
pub mod submitter;

#[cfg(test)]
pub(crate) mod mock;

pub use catalog::CardCatalog;
pub use client::Client;
pub use credentials::{Account, CredentialCursor, Credentials};
pub use orchestrator::{Orchestrator, SessionEnd, TierReport};
pub use submitter::{DeckSubmitter, SubmitPolicy};

use thiserror::Error;

/// Error type for client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
