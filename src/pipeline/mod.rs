//! # Pipeline Orchestration
//!
//! The pipeline is a static graph of typed tasks:
//!
//! ```text
//! convert_metadata ──► split_metadata ──┐
//!                                       ├──► generate_pairs_{positive,negative}_{train,val,test}
//! download_peaks ──► encode_features ───┘                       │
//!                                                               ▼
//!                                 train_model ◄── pairs of train and val
//! ```
//!
//! Tasks run one at a time in topological order. A failing task is retried
//! up to the configured number of times with a fixed pause in between;
//! configuration errors are not retried. When a task finally fails, every
//! task depending on it is reported as blocked and the remaining independent
//! tasks still run.
//!
//! Feature encoding of the raw peak files and model training are not done by
//! this crate. They are handed to an [`ExternalStep`]; the default
//! [`SkipExternal`] logs the resolved task and reports it as delegated.

mod error;
mod graph;
mod report;
mod schedule;


use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::download::{download_library_peaks, Transport};
use crate::metadata::{convert_metadata, split_metadata};
use crate::output::StepOutcome;
use crate::pairs::{generate_pairs_negative, generate_pairs_positive};

pub use error::PipelineError;
pub use graph::{Node, Split, Task, TaskGraph, TaskId, TrainingInputs};
pub use report::{RunReport, TaskReport, TaskStatus};
pub use schedule::Schedule;

/// Runner for the tasks this crate does not implement.
pub trait ExternalStep {
    /// Run `task`. Returns the status to report on success.
    fn run(&self, id: TaskId, task: &Task) -> Result<TaskStatus, PipelineError>;
}

/// External runner that does nothing and reports tasks as delegated.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipExternal;

impl ExternalStep for SkipExternal {
    fn run(&self, id: TaskId, task: &Task) -> Result<TaskStatus, PipelineError> {
        info!("Task {} is run externally, skipping", id);
        debug!("{:?}", task);
        Ok(TaskStatus::Delegated)
    }
}

/// Executes a [`TaskGraph`].
pub struct Pipeline<'a> {
    graph: TaskGraph,
    transport: &'a dyn Transport,
    external: &'a dyn ExternalStep,
    retries: u32,
    retry_delay: Duration,
}

impl<'a> Pipeline<'a> {
    /// Create a runner for `graph` without retries.
    pub fn new(graph: TaskGraph, transport: &'a dyn Transport, external: &'a dyn ExternalStep) -> Self {
        Self {
            graph,
            transport,
            external,
            retries: 0,
            retry_delay: Duration::ZERO,
        }
    }

    /// Create the full pipeline for a configuration, including its retry
    /// policy.
    pub fn from_config(
        config: &Config,
        transport: &'a dyn Transport,
        external: &'a dyn ExternalStep,
    ) -> Result<Self, PipelineError> {
        let graph = TaskGraph::from_config(config)?;
        Ok(Self::new(graph, transport, external)
            .with_retries(config.schedule.retries, config.schedule.retry_delay()))
    }

    /// Retry failing tasks `retries` times, pausing `delay` before each retry.
    pub fn with_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = delay;
        self
    }

    /// The task graph.
    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Run every task once, in order.
    pub fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Pipeline run {} with {} tasks", run_id, self.graph.nodes().len());

        let mut statuses: HashMap<TaskId, bool> = HashMap::new();
        let mut tasks = Vec::with_capacity(self.graph.nodes().len());
        for node in self.graph.nodes() {
            let blocker = node
                .dependencies
                .iter()
                .find(|d| !statuses.get(d).copied().unwrap_or(false))
                .copied();
            let report = match blocker {
                Some(dependency) => {
                    warn!("Task {} blocked by {}", node.id, dependency);
                    TaskReport {
                        task: node.id,
                        status: TaskStatus::Blocked { dependency },
                        attempts: 0,
                        detail: None,
                        duration_ms: 0,
                    }
                }
                None => self.run_with_retries(node),
            };
            statuses.insert(node.id, report.status.is_success());
            tasks.push(report);
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            tasks,
        };
        info!(
            "Pipeline run {} finished: {} succeeded, {} failed, {} blocked",
            run_id,
            report.success_count(),
            report.failure_count(),
            report.blocked_count()
        );
        report
    }

    fn run_with_retries(&self, node: &Node) -> TaskReport {
        let start = Instant::now();
        let mut attempts = 0;
        let (status, detail) = loop {
            attempts += 1;
            info!("Run task {} (attempt {})", node.id, attempts);
            match self.run_task(node) {
                Ok(result) => break result,
                Err(e) if e.is_retryable() && attempts <= self.retries => {
                    warn!(
                        "Task {} failed (attempt {} of {}): {}",
                        node.id,
                        attempts,
                        self.retries + 1,
                        e
                    );
                    std::thread::sleep(self.retry_delay);
                }
                Err(e) => {
                    error!("Task {} failed: {}", node.id, e);
                    break (TaskStatus::Failed { error: e.to_string() }, None);
                }
            }
        };
        TaskReport {
            task: node.id,
            status,
            attempts,
            detail,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn run_task(&self, node: &Node) -> Result<(TaskStatus, Option<String>), PipelineError> {
        match &node.task {
            Task::ConvertMetadata { raw, metadata } => {
                let outcome = convert_metadata(raw, metadata)?;
                Ok((outcome.into(), None))
            }
            Task::SplitMetadata { metadata, config } => {
                let (outcome, _, stats) = split_metadata(metadata, config)?;
                let detail = stats.map(|s| {
                    format!(
                        "{} train, {} val, {} test rows",
                        s.train_rows, s.val_rows, s.test_rows
                    )
                });
                Ok((outcome.into(), detail))
            }
            Task::DownloadPeaks {
                raw,
                peak_dir,
                config,
            } => {
                let stats = download_library_peaks(raw, peak_dir, config, self.transport)?;
                let status = if stats.downloaded > 0 {
                    TaskStatus::Written
                } else {
                    TaskStatus::Skipped
                };
                Ok((status, Some(stats.to_string())))
            }
            Task::PairsPositive { metadata, pairs } => {
                let outcome = generate_pairs_positive(metadata, pairs)?;
                Ok((outcome.into(), None))
            }
            Task::PairsNegative {
                metadata,
                pairs,
                mz_tolerance,
            } => {
                let outcome = generate_pairs_negative(metadata, pairs, *mz_tolerance)?;
                Ok((outcome.into(), None))
            }
            Task::EncodeFeatures { .. } | Task::TrainModel { .. } => {
                Ok((self.external.run(node.id, &node.task)?, None))
            }
        }
    }
}

impl From<StepOutcome> for TaskStatus {
    fn from(outcome: StepOutcome) -> Self {
        match outcome {
            StepOutcome::Written => TaskStatus::Written,
            StepOutcome::Skipped => TaskStatus::Skipped,
        }
    }
}
