//! Error types for the inventory pipeline.
//!
//! Every failure the pipeline can hit is a distinct variant so callers can
//! tell them apart. The binary collapses all of them into the empty
//! inventory document at its outermost boundary.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{status} returned by {url}")]
    Status { url: String, status: StatusCode },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("device {device:?} has a non-string ansible_host: {value}")]
    AnsibleHost { device: String, value: String },

    #[error("login succeeded but no token was returned")]
    MissingToken,

    #[error("failed to render output: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}
