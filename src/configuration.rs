use crate::{
    format::{CsvRecordProducer, Formattable, FormattingError, OutputFormat, format_records},
    http_utils::{DEFAULT_API_BASE_URL, DEFAULT_AUTH_BASE_URL},
    transfer::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MIB},
};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use tracing::debug;
use url::Url;

pub const DEFAULT_APPLICATION_ID: &str = "anaplan";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const CONFIG_DIR_ENV: &str = "ANAPLAN_CONFIG_DIR";

const DEFAULT_CHUNK_SIZE_MIB: usize = DEFAULT_CHUNK_SIZE / MIB;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 1800;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load configuration data, because of: {cause:?}")]
    FailedToLoadData { cause: Box<dyn std::error::Error + Send + Sync> },
    #[error("failed to write configuration data to file, because of: {cause:?}")]
    FailedToWriteData { cause: Box<dyn std::error::Error + Send + Sync> },
    #[error("unknown configuration property {name:?}")]
    UnknownProperty { name: String },
    #[error("invalid value {value:?} for property {name:?}")]
    InvalidPropertyValue { name: String, value: String },
    #[error("{cause:?}")]
    FormattingError {
        #[from]
        cause: FormattingError,
    },
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_auth_base_url() -> String {
    DEFAULT_AUTH_BASE_URL.to_string()
}

fn default_locale() -> String {
    crate::client::DEFAULT_LOCALE.to_string()
}

fn default_chunk_size_mib() -> usize {
    DEFAULT_CHUNK_SIZE_MIB
}

fn default_max_retries() -> u32 {
    crate::action::DEFAULT_MAX_RETRIES
}

fn default_poll_interval_secs() -> u64 {
    crate::action::DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default = "default_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_auth_base_url")]
    auth_base_url: String,
    #[serde(default = "default_locale")]
    locale: String,
    #[serde(default = "default_chunk_size_mib")]
    chunk_size_mib: usize,
    #[serde(default = "default_max_retries")]
    max_retries: u32,
    #[serde(default = "default_poll_interval_secs")]
    poll_interval_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    poll_timeout_secs: Option<u64>,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_id: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            auth_base_url: default_auth_base_url(),
            locale: default_locale(),
            chunk_size_mib: DEFAULT_CHUNK_SIZE_MIB,
            max_retries: default_max_retries(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            workspace_id: None,
            model_id: None,
        }
    }
}

/// Names accepted by [`Configuration::set`]
pub const PROPERTY_NAMES: [&str; 10] = [
    "api_base_url",
    "auth_base_url",
    "locale",
    "chunk_size_mib",
    "max_retries",
    "poll_interval_secs",
    "poll_timeout_secs",
    "request_timeout_secs",
    "workspace_id",
    "model_id",
];

impl Configuration {
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn auth_base_url(&self) -> &str {
        &self.auth_base_url
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Upload chunk size in bytes
    pub fn chunk_size(&self) -> usize {
        self.chunk_size_mib.saturating_mul(MIB)
    }

    pub fn chunk_size_mib(&self) -> usize {
        self.chunk_size_mib
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_secs.map(Duration::from_secs)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    /// Sets a property from its textual form. An empty value clears optional properties.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigurationError> {
        let invalid = || ConfigurationError::InvalidPropertyValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        let optional = |value: &str| {
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };

        match name {
            "api_base_url" => self.api_base_url = parse_base_url(value).ok_or_else(invalid)?,
            "auth_base_url" => self.auth_base_url = parse_base_url(value).ok_or_else(invalid)?,
            "locale" => self.locale = value.to_string(),
            "chunk_size_mib" => {
                let mib = usize::from_str(value).map_err(|_| invalid())?;
                if mib == 0 || mib.saturating_mul(MIB) > MAX_CHUNK_SIZE {
                    return Err(invalid());
                }
                self.chunk_size_mib = mib;
            }
            "max_retries" => self.max_retries = u32::from_str(value).map_err(|_| invalid())?,
            "poll_interval_secs" => {
                self.poll_interval_secs = u64::from_str(value).map_err(|_| invalid())?
            }
            "poll_timeout_secs" => {
                self.poll_timeout_secs = match optional(value) {
                    Some(v) => Some(u64::from_str(&v).map_err(|_| invalid())?),
                    None => None,
                }
            }
            "request_timeout_secs" => {
                self.request_timeout_secs = u64::from_str(value).map_err(|_| invalid())?
            }
            "workspace_id" => self.workspace_id = optional(value),
            "model_id" => self.model_id = optional(value),
            _ => {
                return Err(ConfigurationError::UnknownProperty {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }

    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        if let Ok(config_dir_str) = std::env::var(CONFIG_DIR_ENV) {
            let mut config_path = PathBuf::from(config_dir_str);
            config_path.push(DEFAULT_CONFIGURATION_FILE_NAME);
            return Ok(config_path);
        }

        match config_dir() {
            Some(mut path) => {
                path.push(DEFAULT_APPLICATION_ID);
                path.push(DEFAULT_CONFIGURATION_FILE_NAME);
                Ok(path)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    /// Loads the default file, falling back to defaults when it does not exist
    pub fn load_default() -> Result<Configuration, ConfigurationError> {
        let path = Configuration::get_default_configuration_file_path()?;
        debug!("Loading configuration from {}...", path.display());
        if !path.exists() {
            debug!("Configuration file not found, using defaults");
            return Ok(Configuration::default());
        }
        Configuration::load_from_file(&path)
    }

    pub fn load_from_file(path: &Path) -> Result<Configuration, ConfigurationError> {
        let text = fs::read_to_string(path)
            .map_err(|cause| ConfigurationError::FailedToLoadData { cause: Box::new(cause) })?;
        let configuration: Configuration = serde_yaml::from_str(&text)
            .map_err(|cause| ConfigurationError::FailedToLoadData { cause: Box::new(cause) })?;

        for (name, value) in [
            ("api_base_url", &configuration.api_base_url),
            ("auth_base_url", &configuration.auth_base_url),
        ] {
            if parse_base_url(value).is_none() {
                return Err(ConfigurationError::InvalidPropertyValue {
                    name: name.to_string(),
                    value: value.clone(),
                });
            }
        }
        Ok(configuration)
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), ConfigurationError> {
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        // creates the parent directory if it is missing
        match path.parent() {
            Some(parent) => fs::create_dir_all(parent)
                .map_err(|_| ConfigurationError::FailedToFindConfigurationDirectory)?,
            None => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }

        let file = File::create(path)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })?;
        self.write(file)
    }

    pub fn save_to_default(&self) -> Result<(), ConfigurationError> {
        self.save(&Self::get_default_configuration_file_path()?)
    }
}

/// Accepts absolute http(s) URLs, normalised without a trailing slash
fn parse_base_url(value: &str) -> Option<String> {
    let url = Url::parse(value).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.as_str().trim_end_matches('/').to_string()),
        _ => None,
    }
}

impl CsvRecordProducer for Configuration {
    fn csv_header() -> Vec<String> {
        vec!["PROPERTY".to_string(), "VALUE".to_string()]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        let optional = |v: Option<String>| v.unwrap_or_default();
        vec![
            vec!["api_base_url".to_string(), self.api_base_url.clone()],
            vec!["auth_base_url".to_string(), self.auth_base_url.clone()],
            vec!["locale".to_string(), self.locale.clone()],
            vec!["chunk_size_mib".to_string(), self.chunk_size_mib.to_string()],
            vec!["max_retries".to_string(), self.max_retries.to_string()],
            vec!["poll_interval_secs".to_string(), self.poll_interval_secs.to_string()],
            vec![
                "poll_timeout_secs".to_string(),
                optional(self.poll_timeout_secs.map(|v| v.to_string())),
            ],
            vec![
                "request_timeout_secs".to_string(),
                self.request_timeout_secs.to_string(),
            ],
            vec!["workspace_id".to_string(), optional(self.workspace_id.clone())],
            vec!["model_id".to_string(), optional(self.model_id.clone())],
        ]
    }
}

impl Formattable for Configuration {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_records(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let configuration = Configuration::default();
        assert_eq!(configuration.api_base_url(), "https://api.anaplan.com/2/0");
        assert_eq!(configuration.locale(), "en_US");
        assert_eq!(configuration.chunk_size(), 10 * 1024 * 1024);
        assert_eq!(configuration.max_retries(), 3);
        assert_eq!(configuration.poll_interval(), Duration::from_secs(1));
        assert_eq!(configuration.poll_timeout(), None);
        assert_eq!(configuration.request_timeout_secs(), 1800);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let configuration: Configuration =
            serde_yaml::from_str("workspace_id: 8a81b09d\nmax_retries: 5\n").unwrap();
        assert_eq!(configuration.workspace_id(), Some("8a81b09d"));
        assert_eq!(configuration.max_retries(), 5);
        assert_eq!(configuration.locale(), "en_US");
    }

    #[test]
    fn test_set_properties() {
        let mut configuration = Configuration::default();
        configuration.set("chunk_size_mib", "25").unwrap();
        configuration.set("poll_timeout_secs", "600").unwrap();
        configuration.set("model_id", "75A40874").unwrap();
        assert_eq!(configuration.chunk_size_mib(), 25);
        assert_eq!(configuration.poll_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(configuration.model_id(), Some("75A40874"));

        configuration.set("model_id", "").unwrap();
        assert_eq!(configuration.model_id(), None);

        assert!(matches!(
            configuration.set("chunk_size_mib", "51"),
            Err(ConfigurationError::InvalidPropertyValue { .. })
        ));
        assert!(configuration.set("api_base_url", "not a url").is_err());
        configuration.set("api_base_url", "https://eu1a.app.anaplan.com/2/0/").unwrap();
        assert_eq!(configuration.api_base_url(), "https://eu1a.app.anaplan.com/2/0");

        assert!(matches!(
            configuration.set("colour", "blue"),
            Err(ConfigurationError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_CONFIGURATION_FILE_NAME);

        let mut configuration = Configuration::default();
        configuration.set("workspace_id", "8a81b09d").unwrap();
        configuration.save(&path).unwrap();

        let loaded = Configuration::load_from_file(&path).unwrap();
        assert_eq!(loaded, configuration);
    }
}
