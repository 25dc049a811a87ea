//! Structured outcome of a completed task.

use std::fmt;

use serde::Serialize;

use crate::model::TaskDetail;

/// Summary of a finished task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub action_id: String,
    pub task_id: String,
    pub current_step: String,
    pub successful: bool,
    pub failure_dump_available: bool,
    pub outcome: TaskOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum TaskOutcome {
    /// An import, export or generic action
    Single {
        details: Vec<DetailReport>,
        failure_dump: Option<String>,
    },
    /// A process, reported per contained action
    Process { steps: Vec<StepReport> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailReport {
    pub detail_type: String,
    pub message: Option<String>,
    pub lines: Vec<String>,
}

impl From<&TaskDetail> for DetailReport {
    fn from(detail: &TaskDetail) -> Self {
        DetailReport {
            detail_type: detail.detail_type.clone(),
            message: detail.local_message_text.clone(),
            lines: detail.value_lines(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub object_id: String,
    pub successful: bool,
    pub failure_dump_available: bool,
    pub details: Vec<DetailReport>,
    pub failure_dump: Option<String>,
}

impl TaskReport {
    /// Steps that reported a failure dump; empty for single actions
    pub fn failed_steps(&self) -> Vec<&StepReport> {
        match &self.outcome {
            TaskOutcome::Process { steps } => {
                steps.iter().filter(|s| s.failure_dump_available).collect()
            }
            TaskOutcome::Single { .. } => Vec::new(),
        }
    }

    /// Every dump fetched for this task
    pub fn failure_dumps(&self) -> Vec<&str> {
        match &self.outcome {
            TaskOutcome::Single { failure_dump, .. } => failure_dump.iter().map(|d| d.as_str()).collect(),
            TaskOutcome::Process { steps } => steps
                .iter()
                .filter_map(|s| s.failure_dump.as_deref())
                .collect(),
        }
    }
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            TaskOutcome::Single {
                details,
                failure_dump,
            } => {
                writeln!(
                    f,
                    "Failure Dump Available: {}, Successful: {}",
                    self.failure_dump_available, self.successful
                )?;
                writeln!(f, "Load details:")?;
                for detail in details {
                    writeln!(f, "{}", detail.detail_type)?;
                    for line in &detail.lines {
                        writeln!(f, "{}", line)?;
                    }
                }
                if let Some(dump) = failure_dump {
                    writeln!(f)?;
                    writeln!(f, "Failure dump:")?;
                    write!(f, "{}", dump)?;
                }
                Ok(())
            }
            TaskOutcome::Process { steps } => {
                for step in steps {
                    writeln!(
                        f,
                        "Process action {} completed. Failure: {}",
                        step.object_id, step.failure_dump_available
                    )?;
                }
                let failed = self.failed_steps();
                if failed.is_empty() {
                    return Ok(());
                }
                writeln!(f)?;
                writeln!(f, "Details:")?;
                for step in &failed {
                    for detail in &step.details {
                        writeln!(f, "{}", detail.detail_type)?;
                        for line in &detail.lines {
                            writeln!(f, "{}", line)?;
                        }
                    }
                }
                writeln!(f)?;
                writeln!(f, "Failure dump(s):")?;
                for step in &failed {
                    writeln!(f, "Error dump for {}", step.object_id)?;
                    if let Some(dump) = &step.failure_dump {
                        writeln!(f, "{}", dump.trim_end())?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(kind: &str, lines: &[&str]) -> DetailReport {
        DetailReport {
            detail_type: kind.to_string(),
            message: None,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_single_action_rendering() {
        let report = TaskReport {
            action_id: "112000000001".to_string(),
            task_id: "T1".to_string(),
            current_step: "Complete.".to_string(),
            successful: true,
            failure_dump_available: true,
            outcome: TaskOutcome::Single {
                details: vec![detail("hierarchyRowsProcessedWithFailures", &["10 rows", "2 failed"])],
                failure_dump: Some("_Line_,_Error_1_\n3,Bad code\n".to_string()),
            },
        };

        let text = report.to_string();
        assert!(text.starts_with("Failure Dump Available: true, Successful: true\n"));
        assert!(text.contains("Load details:\nhierarchyRowsProcessedWithFailures\n10 rows\n2 failed\n"));
        assert!(text.contains("Failure dump:\n_Line_,_Error_1_"));
        assert_eq!(report.failure_dumps().len(), 1);
    }

    #[test]
    fn test_process_rendering_lists_every_step() {
        let report = TaskReport {
            action_id: "118000000001".to_string(),
            task_id: "T2".to_string(),
            current_step: "Complete.".to_string(),
            successful: false,
            failure_dump_available: true,
            outcome: TaskOutcome::Process {
                steps: vec![
                    StepReport {
                        object_id: "112000000001".to_string(),
                        successful: true,
                        failure_dump_available: false,
                        details: vec![],
                        failure_dump: None,
                    },
                    StepReport {
                        object_id: "112000000002".to_string(),
                        successful: false,
                        failure_dump_available: true,
                        details: vec![detail("failedRows", &["row 4"])],
                        failure_dump: Some("dump text\n".to_string()),
                    },
                ],
            },
        };

        let text = report.to_string();
        assert!(text.contains("Process action 112000000001 completed. Failure: false\n"));
        assert!(text.contains("Process action 112000000002 completed. Failure: true\n"));
        assert!(text.contains("Error dump for 112000000002\ndump text\n"));
        assert!(!text.contains("Error dump for 112000000001"));
        assert_eq!(report.failed_steps().len(), 1);
    }

    #[test]
    fn test_clean_process_has_no_dump_section() {
        let report = TaskReport {
            action_id: "118000000001".to_string(),
            task_id: "T3".to_string(),
            current_step: "Complete.".to_string(),
            successful: true,
            failure_dump_available: false,
            outcome: TaskOutcome::Process {
                steps: vec![StepReport {
                    object_id: "116000000001".to_string(),
                    successful: true,
                    failure_dump_available: false,
                    details: vec![],
                    failure_dump: None,
                }],
            },
        };

        assert_eq!(
            report.to_string(),
            "Process action 116000000001 completed. Failure: false\n"
        );
    }
}
