//! HTTP client for the gateway's v2.0 REST API.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::{Credentials, Endpoint, IagConfig};
use crate::error::{Error, Result};
use crate::model::{Device, DevicesResponse, LoginResponse};

const APPLICATION_JSON: &str = "application/json";

/// Opaque bearer token returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone)]
pub struct IagClient {
    http: Client,
    endpoint: Endpoint,
}

impl IagClient {
    pub fn new(config: &IagConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| Error::Http {
            url: config.endpoint.base_url(),
            source,
        })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, credentials: &Credentials) -> Result<Token> {
        let url = self.endpoint.login_url();
        debug!(%url, username = %credentials.username, "Logging in");

        let request = self
            .http
            .post(&url)
            .header(ACCEPT, APPLICATION_JSON)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .json(&LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
            });

        let body: LoginResponse = send_json(request, &url).await?;
        body.into_token().map(Token).ok_or(Error::MissingToken)
    }

    /// Fetch every device, in ascending order.
    pub async fn devices(&self, token: &Token) -> Result<Vec<Device>> {
        let url = self.endpoint.devices_url();
        debug!(%url, "Fetching devices");

        let request = self
            .http
            .get(&url)
            .header(ACCEPT, APPLICATION_JSON)
            .header(AUTHORIZATION, token.as_str())
            .query(&[("order", "ascending")]);

        let body: DevicesResponse = send_json(request, &url).await?;
        info!(count = body.data.len(), "Fetched devices");
        Ok(body.data)
    }
}

async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder, url: &str) -> Result<T> {
    let response = request.send().await.map_err(|source| Error::Http {
        url: url.to_string(),
        source,
    })?;
    let response = check_status(response, url)?;

    let bytes = response.bytes().await.map_err(|source| Error::Http {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
        url: url.to_string(),
        source,
    })
}

fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::Status {
            url: url.to_string(),
            status,
        })
    }
}
