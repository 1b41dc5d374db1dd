use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[cfg(feature = "colorized_output")]
use console::style;

use super::{PipelineError, TaskId};

/// Final state of a task in a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    /// The task produced new output
    Written,
    /// The output already existed
    Skipped,
    /// Handed to an external runner, which did not run it
    Delegated,
    /// The task failed on its last attempt
    Failed {
        /// Error of the last attempt
        error: String,
    },
    /// Not run because a dependency did not succeed
    Blocked {
        /// First dependency that did not succeed
        dependency: TaskId,
    },
}

impl TaskStatus {
    /// Whether dependents may run.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TaskStatus::Written | TaskStatus::Skipped | TaskStatus::Delegated
        )
    }

    fn label(&self) -> &'static str {
        match self {
            TaskStatus::Written => "written",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Delegated => "delegated",
            TaskStatus::Failed { .. } => "failed",
            TaskStatus::Blocked { .. } => "blocked",
        }
    }
}

/// Result of one task in a run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    /// Task identifier
    pub task: TaskId,
    /// Final status
    #[serde(flatten)]
    pub status: TaskStatus,
    /// Attempts made (0 if blocked)
    pub attempts: u32,
    /// Step specific summary, e.g. download counts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Wall time spent on the task, including retry delays
    pub duration_ms: u64,
}

/// Report of a complete pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique identifier of the run
    pub run_id: Uuid,
    /// Start of the run
    pub started_at: DateTime<Utc>,
    /// End of the run
    pub finished_at: DateTime<Utc>,
    /// Per-task results in execution order
    pub tasks: Vec<TaskReport>,
}

impl RunReport {
    /// Status of a task, if it was part of the run.
    pub fn status(&self, id: TaskId) -> Option<&TaskStatus> {
        self.tasks.iter().find(|t| t.task == id).map(|t| &t.status)
    }

    /// Check if any task failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Count the tasks that succeeded
    pub fn success_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.status.is_success()).count()
    }

    /// Count the failed tasks
    pub fn failure_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.status, TaskStatus::Failed { .. }))
            .count()
    }

    /// Count the tasks that were blocked by a failure
    pub fn blocked_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.status, TaskStatus::Blocked { .. }))
            .count()
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();
            output.push_str(&format!("{}\n", style("Pipeline Run Report").bold().cyan()));
            output.push_str(&format!("{}\n", style("===================").cyan()));
            output.push_str(&format!("{}: {}\n\n", style("Run").bold(), self.run_id));

            for task in &self.tasks {
                let label = match &task.status {
                    TaskStatus::Written => style(task.status.label()).green(),
                    TaskStatus::Skipped | TaskStatus::Delegated => style(task.status.label()).dim(),
                    TaskStatus::Failed { .. } => style(task.status.label()).red().bold(),
                    TaskStatus::Blocked { .. } => style(task.status.label()).yellow(),
                };
                output.push_str(&format!("[{}] {}", label, task.task));
                output.push_str(&task_suffix(task));
                output.push('\n');
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} succeeded, {} failed, {} blocked\n",
                style("Summary").bold(),
                style(self.success_count()).green(),
                style(self.failure_count()).red(),
                style(self.blocked_count()).yellow()
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

fn task_suffix(task: &TaskReport) -> String {
    let mut suffix = String::new();
    match &task.status {
        TaskStatus::Failed { error } => {
            suffix.push_str(&format!(" after {} attempts: {}", task.attempts, error))
        }
        TaskStatus::Blocked { dependency } => suffix.push_str(&format!(" (waits for {})", dependency)),
        _ => {}
    }
    if let Some(detail) = &task.detail {
        suffix.push_str(&format!(" - {}", detail));
    }
    suffix
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Run Report")?;
        writeln!(f, "===================")?;
        writeln!(f, "Run: {}", self.run_id)?;
        writeln!(f)?;

        for task in &self.tasks {
            writeln!(f, "[{:>9}] {}{}", task.status.label(), task.task, task_suffix(task))?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} succeeded, {} failed, {} blocked",
            self.success_count(),
            self.failure_count(),
            self.blocked_count()
        )
    }
}
