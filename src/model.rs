//! Data models for Anaplan API payloads.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Collections that can be listed below a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Files,
    Imports,
    Exports,
    Processes,
    Actions,
}

impl ResourceKind {
    /// Path segment of the collection, which is also the key of the JSON array
    pub fn as_path(&self) -> &'static str {
        match self {
            ResourceKind::Files => "files",
            ResourceKind::Imports => "imports",
            ResourceKind::Exports => "exports",
            ResourceKind::Processes => "processes",
            ResourceKind::Actions => "actions",
        }
    }
}

/// Any named resource in a model listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: String,
    pub name: String,
    /// Number of chunks currently stored on the server
    #[serde(default)]
    pub chunk_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_data_row: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_row: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl From<&FileResource> for Resource {
    fn from(file: &FileResource) -> Self {
        Resource {
            id: file.id.clone(),
            name: file.name.clone(),
        }
    }
}

/// Body of the upload start/complete metadata calls
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    /// `-1` while an upload is open
    pub chunk_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub size_allowance: Option<u64>,
    #[serde(default)]
    pub current_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active_state: Option<String>,
    #[serde(default)]
    pub current_workspace_id: Option<String>,
    #[serde(default)]
    pub current_workspace_name: Option<String>,
}

/// Entity selection for imports and processes that declare mapping parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingParameter {
    pub entity_type: String,
    pub entity_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub locale_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mapping_parameters: Vec<MappingParameter>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskEnvelope {
    pub task: Task,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    NotStarted,
    InProgress,
    Complete,
    Cancelling,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: String,
    #[serde(default = "default_task_state")]
    pub task_state: TaskState,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

fn default_task_state() -> TaskState {
    TaskState::Unknown
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    #[serde(default)]
    pub successful: bool,
    #[serde(default)]
    pub failure_dump_available: bool,
    #[serde(default)]
    pub object_id: Option<String>,
    /// `None` when the key is absent, which marks a composite process result
    #[serde(default)]
    pub details: Option<Vec<TaskDetail>>,
    #[serde(default)]
    pub nested_results: Vec<NestedResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedResult {
    pub object_id: String,
    #[serde(default)]
    pub successful: bool,
    #[serde(default)]
    pub failure_dump_available: bool,
    #[serde(default)]
    pub details: Vec<TaskDetail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(rename = "type", default)]
    pub detail_type: String,
    #[serde(default)]
    pub local_message_text: Option<String>,
    #[serde(default)]
    pub occurrences: Option<i64>,
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

impl TaskDetail {
    /// Record-level messages, with nulls rendered as empty lines
    pub fn value_lines(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|value| match value {
                serde_json::Value::Null => String::new(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}
