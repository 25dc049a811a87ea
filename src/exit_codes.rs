//! Custom exit codes for the `anaplan` binary
//!
//! The values follow the BSD sysexits.h conventions (via the `exitcode` crate)
//! where possible, with application-specific codes from 100 upwards.

/// Exit codes reported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed successfully
    Success,
    /// Command line usage error
    UsageError,
    /// Input or response data was malformed
    DataError,
    /// Resource not found by name or ID
    NotFound,
    /// Temporary failure, worth retrying later
    TempFail,
    /// Local file could not be read or written
    IoError,
    /// Application configuration issue
    ConfigError,
    /// Login or token issues
    AuthError,
    /// Connection or communication issues
    NetworkError,
    /// Remote API returned an error
    ApiError,
}

impl ExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        match self {
            ExitCode::Success => exitcode::OK,
            ExitCode::UsageError => exitcode::USAGE,
            ExitCode::DataError => exitcode::DATAERR,
            ExitCode::NotFound => exitcode::NOUSER,
            ExitCode::TempFail => exitcode::TEMPFAIL,
            ExitCode::IoError => exitcode::IOERR,
            ExitCode::ConfigError => exitcode::CONFIG,
            ExitCode::AuthError => 100,
            ExitCode::NetworkError => 101,
            ExitCode::ApiError => 102,
        }
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NotFound => "Resource not found",
            ExitCode::TempFail => "Temporary failure",
            ExitCode::IoError => "Input/output error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::AuthError => "Authentication error",
            ExitCode::NetworkError => "Network communication error",
            ExitCode::ApiError => "Remote API error",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysexits_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::UsageError.code(), 64);
        assert_eq!(ExitCode::DataError.code(), 65);
        assert_eq!(ExitCode::ConfigError.code(), 78);
        assert_eq!(i32::from(ExitCode::ApiError), 102);
    }
}
