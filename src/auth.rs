//! Token exchange with the identity service.
//!
//! Two credential flows issue a token: HTTP Basic with a username and
//! password, and a CA certificate plus a signed random nonce. Every issued
//! token is checked against `/token/validate` before it is handed out.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    client::parse_json,
    connection::AuthToken,
    error::ApiError,
    http_utils::{ApiRequest, Transport, DEFAULT_AUTH_BASE_URL},
};

/// Size of the random nonce signed during certificate authentication
pub const NONCE_LENGTH: usize = 150;

/// `statusMessage` of a token that passed validation
const TOKEN_VALIDATED: &str = "Token validated";
const STATUS_SUCCESS: &str = "SUCCESS";

/// Signs the authentication nonce with the private key matching the
/// certificate being presented.
///
/// The identity service expects an RSA-PSS signature over the SHA-512 digest
/// of the nonce.
pub trait NonceSigner: Send + Sync {
    fn sign(&self, nonce: &[u8]) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub status: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub token_info: Option<TokenInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub token_value: String,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub refresh_token_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CertificateChallenge {
    encoded_data: String,
    encoded_signed_data: String,
}

pub struct Authenticator<T: Transport> {
    transport: T,
    auth_base_url: String,
}

impl<T: Transport> Authenticator<T> {
    pub fn new(transport: T, auth_base_url: &str) -> Self {
        Self {
            transport,
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_transport(transport: T) -> Self {
        Self::new(transport, DEFAULT_AUTH_BASE_URL)
    }

    pub fn auth_base_url(&self) -> &str {
        &self.auth_base_url
    }

    pub async fn authenticate_basic(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthToken, ApiError> {
        debug!("Authenticating {} with basic credentials", username);
        let credentials = STANDARD.encode(format!("{}:{}", username, password));
        let request = ApiRequest::new(Method::POST, self.url("/token/authenticate"))
            .header("Authorization", format!("Basic {}", credentials));
        self.issue(request).await
    }

    /// Proves possession of the certificate's private key by signing a fresh nonce
    pub async fn authenticate_certificate(
        &self,
        signer: &dyn NonceSigner,
        certificate_pem: &str,
    ) -> Result<AuthToken, ApiError> {
        let mut nonce = vec![0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut nonce);
        let signature = signer.sign(&nonce)?;

        let challenge = CertificateChallenge {
            encoded_data: STANDARD.encode(&nonce),
            encoded_signed_data: STANDARD.encode(&signature),
        };
        debug!("Authenticating with certificate");
        let request = ApiRequest::new(Method::POST, self.url("/token/authenticate"))
            .header(
                "Authorization",
                format!("CACertificate {}", STANDARD.encode(certificate_pem.as_bytes())),
            )
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .json(serde_json::to_value(&challenge)?);
        self.issue(request).await
    }

    /// Checks a token with the identity service
    pub async fn validate(&self, token: &AuthToken) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::GET, self.url("/token/validate"))
            .header("Authorization", token.authorization_header());
        let response = self.transport.execute(request).await?;
        let status: TokenResponse = parse_json(&response)?;
        match status.status_message.as_deref() {
            Some(TOKEN_VALIDATED) => {
                debug!("Token validated");
                Ok(())
            }
            other => {
                let message = other.unwrap_or("token validation failed").to_string();
                error!("Token validation failed: {}", message);
                Err(ApiError::Auth(message))
            }
        }
    }

    /// Exchanges a token nearing expiry for a new one
    pub async fn refresh(&self, token: &AuthToken) -> Result<AuthToken, ApiError> {
        debug!("Refreshing token");
        let request = ApiRequest::new(Method::POST, self.url("/token/refresh"))
            .header("Authorization", token.authorization_header());
        let response = self.transport.execute(request).await?;
        let refreshed: TokenResponse = parse_json(&response)?;
        token_from(refreshed)
    }

    async fn issue(&self, request: ApiRequest) -> Result<AuthToken, ApiError> {
        let response = self.transport.execute(request).await?;
        debug!("Authentication response status: {}", response.status);
        let issued: TokenResponse = parse_json(&response)?;
        if issued.status != STATUS_SUCCESS {
            let message = issued
                .status_message
                .unwrap_or_else(|| issued.status.clone());
            error!("Authentication failed: {}", message);
            return Err(ApiError::Auth(message));
        }

        let token = token_from(issued)?;
        self.validate(&token).await?;
        Ok(token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.auth_base_url, path)
    }
}

fn token_from(response: TokenResponse) -> Result<AuthToken, ApiError> {
    match response.token_info {
        Some(info) => Ok(AuthToken::new(info.token_value)),
        None => Err(ApiError::Auth(
            response
                .status_message
                .unwrap_or_else(|| "no token issued".to_string()),
        )),
    }
}
