//! Running imports, exports, processes and generic actions.
//!
//! An action ID's first three digits name its category. Running one is three
//! steps: launch a task (retried with growing delays while the server
//! refuses), poll it until it completes, then turn its result into a
//! [`TaskReport`], fetching failure dumps where the server offers them.

use std::{collections::BTreeMap, time::Duration};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    client::{parse_json, AnaplanClient},
    connection::Connection,
    error::ApiError,
    http_utils::{ApiResponse, Transport},
    model::{LaunchRequest, MappingParameter, NestedResult, Task, TaskEnvelope, TaskState},
    report::{DetailReport, StepReport, TaskOutcome, TaskReport},
};

/// `currentStep` reported by a task that failed as a whole
pub const FAILED_STEP: &str = "Failed.";

/// Prefix of the text recorded in place of a dump that could not be fetched
pub const DUMP_UNAVAILABLE: &str = "Failure dump unavailable: ";

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ActionCategory {
    Import,
    Export,
    Action,
    Process,
}

impl ActionCategory {
    /// Category of an action ID, read from its three-digit prefix
    pub fn classify(action_id: &str) -> Result<Self, ApiError> {
        match action_id.get(..3) {
            Some("112") => Ok(ActionCategory::Import),
            Some("116") => Ok(ActionCategory::Export),
            Some("117") => Ok(ActionCategory::Action),
            Some("118") => Ok(ActionCategory::Process),
            _ => Err(ApiError::UnknownActionCategory(action_id.to_string())),
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            ActionCategory::Import => "112",
            ActionCategory::Export => "116",
            ActionCategory::Action => "117",
            ActionCategory::Process => "118",
        }
    }

    /// Collection segment used in task URLs
    pub fn path(&self) -> &'static str {
        match self {
            ActionCategory::Import => "imports",
            ActionCategory::Export => "exports",
            ActionCategory::Action => "actions",
            ActionCategory::Process => "processes",
        }
    }

    pub fn accepts_parameters(&self) -> bool {
        matches!(self, ActionCategory::Import | ActionCategory::Process)
    }
}

/// Launch retry schedule. Delay `n` (zero based) is `initial_delay * multiplier^n`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Never panics: NaN and negative multipliers count as zero, and a delay
    /// too large to represent saturates at `Duration::MAX`.
    pub fn delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let factor = self.multiplier.max(0.0).powi(exponent);
        Duration::try_from_secs_f64(self.initial_delay.as_secs_f64() * factor)
            .unwrap_or(Duration::MAX)
    }

    /// Every delay the policy may wait, in order
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(|retry| self.delay(retry))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Unbounded when `None`
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

/// Everything [`AnaplanClient::run_action`] needs besides the action ID
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub retry: RetryPolicy,
    pub poll: PollPolicy,
    pub parameters: Vec<MappingParameter>,
    pub cancellation: Option<CancellationToken>,
}

impl RunOptions {
    pub fn new(max_retries: u32) -> Self {
        Self {
            retry: RetryPolicy::new(max_retries),
            ..Self::default()
        }
    }

    /// Mapping parameters as entity type to entity name
    pub fn with_parameters<K, V>(mut self, parameters: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters = parameters
            .into_iter()
            .map(|(entity_type, entity_name)| MappingParameter {
                entity_type: entity_type.into(),
                entity_name: entity_name.into(),
            })
            .collect();
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Parses `KEY=VALUE` pairs into an ordered parameter map
pub fn parse_parameters<'a>(
    pairs: impl IntoIterator<Item = &'a str>,
) -> Result<BTreeMap<String, String>, String> {
    let mut parameters = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Invalid parameter '{}', expected ENTITY=NAME", pair))?;
        if key.trim().is_empty() {
            return Err(format!("Invalid parameter '{}', empty entity type", pair));
        }
        parameters.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(parameters)
}

impl<T: Transport> AnaplanClient<T> {
    /// Launches an action, waits for it and reports its outcome.
    ///
    /// IDs outside the known categories fail before any request is made, as
    /// do mapping parameters for exports and generic actions.
    pub async fn run_action(
        &self,
        connection: &Connection,
        action_id: &str,
        options: &RunOptions,
    ) -> Result<TaskReport, ApiError> {
        let category = ActionCategory::classify(action_id)?;
        if !options.parameters.is_empty() && !category.accepts_parameters() {
            return Err(ApiError::ParametersNotSupported(category));
        }

        let tasks_url = self.model_url(
            connection,
            &format!("/{}/{}/tasks", category.path(), action_id),
        );
        info!("Running {} {}", category, action_id);

        let task_id = self.launch_task(connection, &tasks_url, options).await?;
        let task = self
            .wait_for_task(connection, &tasks_url, &task_id, options)
            .await?;
        self.build_report(connection, &tasks_url, action_id, task)
            .await
    }

    async fn launch_task(
        &self,
        connection: &Connection,
        tasks_url: &str,
        options: &RunOptions,
    ) -> Result<String, ApiError> {
        let request = LaunchRequest {
            locale_name: self.locale().to_string(),
            mapping_parameters: options.parameters.clone(),
        };
        let policy = &options.retry;

        let mut retries = 0u32;
        loop {
            let (status, message) = match self.post_json(connection.token(), tasks_url, &request).await {
                Ok(response) if response.is_success() => {
                    let envelope: TaskEnvelope = parse_json(&response)?;
                    debug!("Task {} launched", envelope.task.task_id);
                    return Ok(envelope.task.task_id);
                }
                Ok(response) => (response.status, response.text().trim().to_string()),
                Err(ApiError::HttpError(e)) => (0, e.to_string()),
                Err(e) => return Err(e),
            };

            if retries >= policy.max_retries {
                warn!("Launch failed after {} attempt(s)", retries + 1);
                return Err(ApiError::RetriesExhausted {
                    attempts: retries + 1,
                    status,
                    message,
                });
            }
            let delay = policy.delay(retries);
            warn!(
                "Launch refused with status {}, retrying in {:.1}s ({}/{})",
                status,
                delay.as_secs_f64(),
                retries + 1,
                policy.max_retries
            );
            pause(delay, options.cancellation.as_ref()).await?;
            retries += 1;
        }
    }

    async fn wait_for_task(
        &self,
        connection: &Connection,
        tasks_url: &str,
        task_id: &str,
        options: &RunOptions,
    ) -> Result<Task, ApiError> {
        let status_url = format!("{}/{}", tasks_url, task_id);
        let started = Instant::now();

        loop {
            if let Some(token) = &options.cancellation {
                if token.is_cancelled() {
                    return Err(ApiError::Cancelled);
                }
            }

            let envelope: TaskEnvelope = self.get_json(connection.token(), &status_url).await?;
            let task = envelope.task;
            match task.task_state.clone() {
                TaskState::Complete => {
                    debug!("Task {} complete", task_id);
                    return Ok(task);
                }
                TaskState::Cancelled => {
                    return Err(ApiError::TaskCancelled {
                        task_id: task_id.to_string(),
                    })
                }
                state => debug!(
                    "Task {} is {:?}, progress {:?}",
                    task_id, state, task.progress
                ),
            }

            if let Some(timeout) = options.poll.timeout {
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    return Err(ApiError::PollTimeout {
                        task_id: task_id.to_string(),
                        elapsed_secs: elapsed.as_secs(),
                    });
                }
            }
            pause(options.poll.interval, options.cancellation.as_ref()).await?;
        }
    }

    async fn build_report(
        &self,
        connection: &Connection,
        tasks_url: &str,
        action_id: &str,
        task: Task,
    ) -> Result<TaskReport, ApiError> {
        let task_id = task.task_id;
        let current_step = task.current_step.unwrap_or_default();
        let result = task.result.ok_or_else(|| {
            ApiError::Protocol(format!("task {} completed without a result", task_id))
        })?;

        if current_step == FAILED_STEP {
            let reason = result
                .details
                .as_ref()
                .and_then(|details| details.first())
                .map(|detail| detail.detail_type.clone())
                .unwrap_or_else(|| "no details reported".to_string());
            return Err(ApiError::TaskFailed { task_id, reason });
        }

        let outcome = match &result.details {
            Some(details) => {
                let failure_dump = if result.failure_dump_available {
                    let url = format!("{}/{}/dump", tasks_url, task_id);
                    Some(self.fetch_dump(connection, &url).await)
                } else {
                    None
                };
                TaskOutcome::Single {
                    details: details.iter().map(DetailReport::from).collect(),
                    failure_dump,
                }
            }
            None => {
                let mut steps = Vec::with_capacity(result.nested_results.len());
                for nested in &result.nested_results {
                    steps.push(
                        self.step_report(connection, tasks_url, &task_id, nested)
                            .await,
                    );
                }
                TaskOutcome::Process { steps }
            }
        };

        Ok(TaskReport {
            action_id: action_id.to_string(),
            task_id,
            current_step,
            successful: result.successful,
            failure_dump_available: result.failure_dump_available,
            outcome,
        })
    }

    async fn step_report(
        &self,
        connection: &Connection,
        tasks_url: &str,
        task_id: &str,
        nested: &NestedResult,
    ) -> StepReport {
        let failure_dump = if nested.failure_dump_available {
            let url = format!("{}/{}/dumps/{}", tasks_url, task_id, nested.object_id);
            Some(self.fetch_dump(connection, &url).await)
        } else {
            None
        };
        StepReport {
            object_id: nested.object_id.clone(),
            successful: nested.successful,
            failure_dump_available: nested.failure_dump_available,
            details: nested.details.iter().map(DetailReport::from).collect(),
            failure_dump,
        }
    }

    /// The dump text, or a note naming why it could not be fetched. The task
    /// itself already finished, so a missing dump never fails the report.
    async fn fetch_dump(&self, connection: &Connection, url: &str) -> String {
        debug!("Fetching failure dump {}", url);
        match self
            .get(connection.token(), url)
            .await
            .and_then(ApiResponse::error_for_status)
        {
            Ok(response) => response.text(),
            Err(e) => {
                warn!("Could not fetch failure dump {}: {}", url, e);
                format!("{}{}", DUMP_UNAVAILABLE, e)
            }
        }
    }
}

/// Sleeps for `duration` unless `cancellation` fires first
async fn pause(duration: Duration, cancellation: Option<&CancellationToken>) -> Result<(), ApiError> {
    match cancellation {
        Some(token) => tokio::select! {
            _ = token.cancelled() => Err(ApiError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        },
        None => {
            tokio::time::sleep(duration).await;
            Ok(())
        }
    }
}
