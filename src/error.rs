use thiserror::Error;

use crate::{action::ActionCategory, exit_codes::ExitCode, table::TableError};

/// Error emitted by the Anaplan API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, TLS, timeout)
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The response parsed but did not have the expected shape
    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("chunk of {size} bytes exceeds the limit of {limit} bytes")]
    ChunkTooLarge { size: usize, limit: usize },

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// Some chunks made it to (or from) the server before a chunk failed
    #[error("transfer of file {file_id} stopped at chunk {failed_chunk} after {completed} chunk(s): {reason}")]
    PartialTransfer {
        file_id: String,
        completed: usize,
        failed_chunk: usize,
        reason: String,
    },

    #[error("upload session for file {file_id} is closed")]
    SessionClosed { file_id: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: String, name: String },

    #[error("action ID '{0}' does not belong to a known action category")]
    UnknownActionCategory(String),

    #[error("mapping parameters are not supported for {0} actions")]
    ParametersNotSupported(ActionCategory),

    #[error("giving up after {attempts} attempt(s), last status {status}: {message}")]
    RetriesExhausted {
        attempts: u32,
        status: u16,
        message: String,
    },

    #[error("task {task_id} failed: {reason}")]
    TaskFailed { task_id: String, reason: String },

    #[error("task {task_id} was cancelled on the server")]
    TaskCancelled { task_id: String },

    #[error("task {task_id} did not complete within {elapsed_secs} seconds")]
    PollTimeout { task_id: String, elapsed_secs: u64 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    TableError(#[from] TableError),
}

impl ApiError {
    pub(crate) fn server(status: u16, body: &[u8]) -> ApiError {
        ApiError::Server {
            status,
            message: String::from_utf8_lossy(body).trim().to_string(),
        }
    }
}

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// Error when an unsupported or undefined subcommand is encountered
    #[error("Undefined or unsupported subcommand")]
    UnsupportedSubcommand(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] crate::configuration::ConfigurationError),
    #[error("Formatting error: {0}")]
    FormattingError(#[from] crate::format::FormattingError),
    /// Neither a token nor a username/password pair was supplied
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
    /// Error when a required command-line argument is missing
    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
}

impl CliError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::UnsupportedSubcommand(_)
            | CliError::MissingRequiredArgument(_)
            | CliError::InvalidArgument(_) => ExitCode::UsageError,
            CliError::ConfigurationError(_) => ExitCode::ConfigError,
            CliError::FormattingError(_) => ExitCode::DataError,
            CliError::MissingCredentials(_) => ExitCode::AuthError,
            CliError::ApiError(e) => match e {
                ApiError::Auth(_) => ExitCode::AuthError,
                ApiError::HttpError(_) => ExitCode::NetworkError,
                ApiError::NotFound { .. } => ExitCode::NotFound,
                ApiError::UnknownActionCategory(_)
                | ApiError::ParametersNotSupported(_)
                | ApiError::ChunkTooLarge { .. }
                | ApiError::InvalidChunkSize => ExitCode::UsageError,
                ApiError::IoError(_) => ExitCode::IoError,
                ApiError::RetriesExhausted { .. } | ApiError::PollTimeout { .. } => {
                    ExitCode::TempFail
                }
                ApiError::JsonError(_) | ApiError::Protocol(_) | ApiError::TableError(_) => {
                    ExitCode::DataError
                }
                _ => ExitCode::ApiError,
            },
        }
    }
}
