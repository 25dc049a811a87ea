//! The Anaplan Integration API client.
//!
//! [`AnaplanClient`] owns a [`Transport`] and knows how to address model
//! resources. The operations themselves live next to their concerns:
//! resource discovery in [`crate::directory`], file transfer in
//! [`crate::transfer`] and task execution in [`crate::action`].

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::{
    configuration::Configuration,
    connection::{AuthToken, Connection},
    error::ApiError,
    http_utils::{
        ApiRequest, ApiResponse, HttpClient, HttpRequestConfig, Transport, DEFAULT_API_BASE_URL,
    },
};

pub const DEFAULT_LOCALE: &str = "en_US";

pub struct AnaplanClient<T: Transport = HttpClient> {
    transport: T,
    base_url: String,
    locale: String,
}

impl AnaplanClient<HttpClient> {
    /// Builds a client talking to the configured API over HTTPS
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ApiError> {
        let transport = HttpClient::new(HttpRequestConfig::from_configuration(configuration))?;
        Ok(AnaplanClient::new(transport, configuration.api_base_url())
            .with_locale(configuration.locale()))
    }
}

impl<T: Transport> AnaplanClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    /// Uses the default public endpoint
    pub fn with_transport(transport: T) -> Self {
        Self::new(transport, DEFAULT_API_BASE_URL)
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// URL of a path below the connection's model, e.g. `/files/113000000001`
    pub(crate) fn model_url(&self, connection: &Connection, path: &str) -> String {
        format!(
            "{}/workspaces/{}/models/{}{}",
            self.base_url,
            connection.workspace_id(),
            connection.model_id(),
            path
        )
    }

    /// URL of a path below the API root, e.g. `/users/me`
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get(&self, token: &AuthToken, url: &str) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::new(Method::GET, url)
            .header("Authorization", token.authorization_header());
        self.transport.execute(request).await
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(
        &self,
        token: &AuthToken,
        url: &str,
    ) -> Result<R, ApiError> {
        let response = self.get(token, url).await?.error_for_status()?;
        parse_json(&response)
    }

    pub(crate) async fn post_json<B: serde::Serialize>(
        &self,
        token: &AuthToken,
        url: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::new(Method::POST, url)
            .header("Authorization", token.authorization_header())
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .json(serde_json::to_value(body)?);
        self.transport.execute(request).await
    }

    pub(crate) async fn put_bytes(
        &self,
        token: &AuthToken,
        url: &str,
        payload: Vec<u8>,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::new(Method::PUT, url)
            .header("Authorization", token.authorization_header())
            .header("Content-Type", mime::APPLICATION_OCTET_STREAM.as_ref())
            .bytes(payload);
        self.transport.execute(request).await
    }
}

/// Deserializes a response body, logging the raw text when it does not match
pub(crate) fn parse_json<R: DeserializeOwned>(response: &ApiResponse) -> Result<R, ApiError> {
    serde_json::from_slice::<R>(&response.body).map_err(|e| {
        error!(
            "Failed to deserialize response: {}. Raw response: {}",
            e,
            response.text()
        );
        ApiError::JsonError(e)
    })
}
