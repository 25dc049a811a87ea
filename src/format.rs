//! Output formatting for the command line client.
//!
//! Results are printed either as JSON or as CSV. Types opt in by implementing
//! [`CsvRecordProducer`] and `Serialize`, then [`Formattable`].

use std::str::FromStr;

use csv::Writer;
use serde::Serialize;
use strum::EnumIter;

use crate::{
    model::{FileResource, Model, Resource, User, Workspace},
    report::{TaskOutcome, TaskReport},
};

pub const JSON: &str = "json";
pub const CSV: &str = "csv";

#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    #[error("invalid output format {0}")]
    UnsupportedOutputFormat(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("CSV writer error: {0}")]
    CsvWriterError(String),

    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, PartialOrd)]
pub struct OutputFormatOptions {
    pub with_headers: bool,
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq, PartialOrd, EnumIter)]
pub enum OutputFormat {
    Csv(OutputFormatOptions),
    Json(OutputFormatOptions),
}

impl OutputFormat {
    pub fn names() -> Vec<&'static str> {
        vec![JSON, CSV]
    }

    pub fn from_string_with_options(
        format_str: &str,
        options: OutputFormatOptions,
    ) -> Result<OutputFormat, FormattingError> {
        match format_str.to_lowercase().as_str() {
            JSON => Ok(OutputFormat::Json(options)),
            CSV => Ok(OutputFormat::Csv(options)),
            other => Err(FormattingError::UnsupportedOutputFormat(other.to_string())),
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Json(OutputFormatOptions::default())
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OutputFormat::Csv(_) => write!(f, "csv"),
            OutputFormat::Json(_) => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = FormattingError;

    fn from_str(format_str: &str) -> Result<OutputFormat, FormattingError> {
        Self::from_string_with_options(format_str, OutputFormatOptions::default())
    }
}

/// Flattens a value into CSV rows
pub trait CsvRecordProducer {
    fn csv_header() -> Vec<String>;

    fn as_csv_records(&self) -> Vec<Vec<String>>;

    fn to_csv(&self, with_header: bool) -> Result<String, FormattingError> {
        let mut wtr = Writer::from_writer(Vec::new());
        if with_header {
            wtr.write_record(Self::csv_header())?;
        }
        for record in self.as_csv_records() {
            wtr.write_record(&record)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| FormattingError::CsvWriterError(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

pub trait Formattable {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError>;
}

/// JSON through serde, CSV through the record producer
pub fn format_records<T>(value: &T, f: &OutputFormat) -> Result<String, FormattingError>
where
    T: CsvRecordProducer + Serialize,
{
    match f {
        OutputFormat::Json(options) => {
            if options.pretty {
                Ok(serde_json::to_string_pretty(value)?)
            } else {
                Ok(serde_json::to_string(value)?)
            }
        }
        OutputFormat::Csv(options) => value.to_csv(options.with_headers),
    }
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

impl CsvRecordProducer for Vec<Resource> {
    fn csv_header() -> Vec<String> {
        headers(&["ID", "NAME"])
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|r| vec![r.id.clone(), r.name.clone()])
            .collect()
    }
}

impl Formattable for Vec<Resource> {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_records(self, f)
    }
}

impl CsvRecordProducer for Vec<FileResource> {
    fn csv_header() -> Vec<String> {
        headers(&["ID", "NAME", "CHUNK_COUNT", "FORMAT", "ENCODING", "SEPARATOR"])
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|file| {
                vec![
                    file.id.clone(),
                    file.name.clone(),
                    file.chunk_count.to_string(),
                    optional(&file.format),
                    optional(&file.encoding),
                    optional(&file.separator),
                ]
            })
            .collect()
    }
}

impl Formattable for Vec<FileResource> {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_records(self, f)
    }
}

impl CsvRecordProducer for Vec<Workspace> {
    fn csv_header() -> Vec<String> {
        headers(&["ID", "NAME", "ACTIVE", "SIZE_ALLOWANCE", "CURRENT_SIZE"])
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|ws| {
                vec![
                    ws.id.clone(),
                    ws.name.clone(),
                    ws.active.to_string(),
                    optional(&ws.size_allowance),
                    optional(&ws.current_size),
                ]
            })
            .collect()
    }
}

impl Formattable for Vec<Workspace> {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_records(self, f)
    }
}

impl CsvRecordProducer for Vec<Model> {
    fn csv_header() -> Vec<String> {
        headers(&["ID", "NAME", "STATE", "WORKSPACE_ID", "WORKSPACE_NAME"])
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|m| {
                vec![
                    m.id.clone(),
                    m.name.clone(),
                    optional(&m.active_state),
                    optional(&m.current_workspace_id),
                    optional(&m.current_workspace_name),
                ]
            })
            .collect()
    }
}

impl Formattable for Vec<Model> {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_records(self, f)
    }
}

impl CsvRecordProducer for User {
    fn csv_header() -> Vec<String> {
        headers(&["ID", "EMAIL", "FIRST_NAME", "LAST_NAME"])
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.id.clone(),
            optional(&self.email),
            optional(&self.first_name),
            optional(&self.last_name),
        ]]
    }
}

impl Formattable for User {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_records(self, f)
    }
}

/// One row per contained step; single actions produce one row
impl CsvRecordProducer for TaskReport {
    fn csv_header() -> Vec<String> {
        headers(&[
            "ACTION_ID",
            "TASK_ID",
            "OBJECT_ID",
            "SUCCESSFUL",
            "FAILURE_DUMP_AVAILABLE",
        ])
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        match &self.outcome {
            TaskOutcome::Single { .. } => vec![vec![
                self.action_id.clone(),
                self.task_id.clone(),
                self.action_id.clone(),
                self.successful.to_string(),
                self.failure_dump_available.to_string(),
            ]],
            TaskOutcome::Process { steps } => steps
                .iter()
                .map(|step| {
                    vec![
                        self.action_id.clone(),
                        self.task_id.clone(),
                        step.object_id.clone(),
                        step.successful.to_string(),
                        step.failure_dump_available.to_string(),
                    ]
                })
                .collect(),
        }
    }
}

impl Formattable for TaskReport {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_records(self, f)
    }
}
