//! Execution context shared by the CLI commands.
//!
//! Loads the configuration, builds the HTTP client and obtains a token, either
//! the pre-issued one from `ANAPLAN_TOKEN` or by exchanging the user name and
//! `ANAPLAN_PASSWORD` with the identity service.

use crate::{
    auth::Authenticator,
    client::AnaplanClient,
    commands::params::{
        ENV_PASSWORD, ENV_TOKEN, PARAMETER_MODEL, PARAMETER_USERNAME, PARAMETER_WORKSPACE,
    },
    configuration::Configuration,
    connection::{AuthToken, Connection},
    error::CliError,
    http_utils::{HttpClient, HttpRequestConfig},
};
use clap::ArgMatches;
use tracing::debug;

pub struct ExecutionContext {
    configuration: Configuration,
    client: AnaplanClient<HttpClient>,
    token: AuthToken,
}

impl ExecutionContext {
    /// Builds the context and authenticates.
    pub async fn from_args(sub_matches: &ArgMatches) -> Result<Self, CliError> {
        let configuration = Configuration::load_default()?;
        let client = AnaplanClient::from_configuration(&configuration)?;
        let token = authenticate(&configuration, sub_matches).await?;

        Ok(ExecutionContext {
            configuration,
            client,
            token,
        })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn client(&self) -> &AnaplanClient<HttpClient> {
        &self.client
    }

    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    /// Workspace and model from the arguments, falling back to the configuration
    pub fn connection(&self, sub_matches: &ArgMatches) -> Result<Connection, CliError> {
        let workspace_id = sub_matches
            .get_one::<String>(PARAMETER_WORKSPACE)
            .map(String::as_str)
            .or(self.configuration.workspace_id())
            .ok_or_else(|| CliError::MissingRequiredArgument(format!("--{}", PARAMETER_WORKSPACE)))?;
        let model_id = sub_matches
            .get_one::<String>(PARAMETER_MODEL)
            .map(String::as_str)
            .or(self.configuration.model_id())
            .ok_or_else(|| CliError::MissingRequiredArgument(format!("--{}", PARAMETER_MODEL)))?;

        Ok(Connection::new(self.token.clone(), workspace_id, model_id))
    }
}

async fn authenticate(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<AuthToken, CliError> {
    if let Ok(token) = std::env::var(ENV_TOKEN) {
        if !token.trim().is_empty() {
            debug!("Using the token from {}", ENV_TOKEN);
            return Ok(AuthToken::new(token.trim()));
        }
    }

    let username = sub_matches
        .get_one::<String>(PARAMETER_USERNAME)
        .ok_or_else(|| {
            CliError::MissingCredentials(format!(
                "set {} or pass --{} with {}",
                ENV_TOKEN, PARAMETER_USERNAME, ENV_PASSWORD
            ))
        })?;
    let password = std::env::var(ENV_PASSWORD)
        .map_err(|_| CliError::MissingCredentials(format!("{} is not set", ENV_PASSWORD)))?;

    let transport = HttpClient::new(HttpRequestConfig::from_configuration(configuration))?;
    let authenticator = Authenticator::new(transport, configuration.auth_base_url());
    Ok(authenticator.authenticate_basic(username, &password).await?)
}
