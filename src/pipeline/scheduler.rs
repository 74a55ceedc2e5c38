//! Generation Scheduler
//!
//! Dispatches one generation request per finding under two independent
//! concurrency bounds:
//!
//! - **per-tree**: files in flight at once (outer `buffer_unordered`)
//! - **per-file**: symbols in flight within one file (inner `buffer_unordered`)
//!
//! Outcomes land in a `DashMap` keyed by [`SymbolKey`], the only shared
//! mutable structure. A failed task never cancels its siblings unless the
//! failure policy is [`FailurePolicy::FailFast`].
//!
//! Cancellation is cooperative: once the token (or the run deadline) fires,
//! no new task is dispatched and in-flight tasks run to completion.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use dashmap::DashMap;
use futures::StreamExt;
use futures::future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::events::{PipelineEvent, SharedEventSink};
use crate::ai::provider::{SharedGenerator, SymbolRequest};
use crate::ai::timeout::with_task_timeout;
use crate::config::{FailurePolicy, GenerationConfig};
use crate::types::{DocError, Finding, Inventory, LlmError, Result, SymbolKey};

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub per_file_concurrency: usize,
    pub per_tree_concurrency: usize,
    /// Maximum tasks dispatched in total (0 = no limit)
    pub item_limit: usize,
    pub task_timeout: Duration,
    pub deadline: Option<Duration>,
    pub failure_policy: FailurePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for SchedulerConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            per_file_concurrency: config.per_file_concurrency,
            per_tree_concurrency: config.per_tree_concurrency,
            item_limit: config.item_limit,
            task_timeout: Duration::from_secs(config.task_timeout_secs),
            deadline: config.deadline_secs.map(Duration::from_secs),
            failure_policy: config.failure_policy,
        }
    }
}

// =============================================================================
// Tasks and Outcomes
// =============================================================================

/// One unit of work: a finding plus the source it was found in
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub finding: Finding,
    pub source: Arc<str>,
}

impl GenerationTask {
    pub fn key(&self) -> SymbolKey {
        self.finding.key()
    }

    pub fn request(&self) -> SymbolRequest {
        SymbolRequest::for_finding(&self.finding, Arc::clone(&self.source))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// Trimmed, non-empty doc text
    Documented(String),
    Failed(LlmError),
}

impl GenerationOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Documented(text) => Some(text),
            GenerationOutcome::Failed(_) => None,
        }
    }

    pub fn is_documented(&self) -> bool {
        matches!(self, GenerationOutcome::Documented(_))
    }
}

/// Everything the scheduler learned in one run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub outcomes: BTreeMap<SymbolKey, GenerationOutcome>,
    /// Tasks handed to the generator
    pub dispatched: usize,
    /// Planned tasks never dispatched because of cancellation
    pub not_dispatched: usize,
    pub cancelled: bool,
}

impl GenerationReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_documented()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn outcome(&self, key: &SymbolKey) -> Option<&GenerationOutcome> {
        self.outcomes.get(key)
    }

    /// Failed symbols with their errors, in key order
    pub fn failures(&self) -> impl Iterator<Item = (&SymbolKey, &LlmError)> {
        self.outcomes.iter().filter_map(|(key, outcome)| match outcome {
            GenerationOutcome::Failed(err) => Some((key, err)),
            GenerationOutcome::Documented(_) => None,
        })
    }
}

/// Flatten findings in (path, identifier) order, truncate to `item_limit`
/// when it is non-zero, and regroup by file preserving order.
pub fn plan_tasks(inventory: &Inventory, item_limit: usize) -> Vec<(String, Vec<GenerationTask>)> {
    let mut remaining = if item_limit == 0 {
        usize::MAX
    } else {
        item_limit
    };
    let mut plan = Vec::new();

    for (path, findings) in &inventory.findings {
        if remaining == 0 {
            break;
        }
        let Some(source) = inventory.source(path) else {
            continue;
        };

        let take = findings.len().min(remaining);
        remaining -= take;

        let tasks = findings[..take]
            .iter()
            .map(|finding| GenerationTask {
                finding: finding.clone(),
                source: Arc::clone(source),
            })
            .collect();
        plan.push((path.clone(), tasks));
    }

    plan
}

// =============================================================================
// Scheduler
// =============================================================================

/// Shared state of one run; borrowed by every task future
struct RunState {
    token: CancellationToken,
    outcomes: DashMap<SymbolKey, GenerationOutcome>,
    dispatched: AtomicUsize,
    first_failure: OnceLock<String>,
}

pub struct Scheduler {
    config: SchedulerConfig,
    generator: SharedGenerator,
    events: SharedEventSink,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        generator: SharedGenerator,
        events: SharedEventSink,
    ) -> Result<Self> {
        if config.per_file_concurrency == 0 || config.per_tree_concurrency == 0 {
            return Err(DocError::Config(
                "scheduler concurrency bounds must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            config,
            generator,
            events,
        })
    }

    /// Generate documentation for every planned finding
    #[instrument(skip_all, fields(
        files = inventory.file_count(),
        findings = inventory.total_findings(),
        provider = self.generator.name(),
    ))]
    pub async fn run(
        &self,
        inventory: &Inventory,
        cancel: &CancellationToken,
    ) -> Result<GenerationReport> {
        let plan = plan_tasks(inventory, self.config.item_limit);
        let planned: usize = plan.iter().map(|(_, tasks)| tasks.len()).sum();

        info!(
            "Scheduling {} tasks over {} files (per-tree={}, per-file={}, policy={})",
            planned,
            plan.len(),
            self.config.per_tree_concurrency,
            self.config.per_file_concurrency,
            self.config.failure_policy
        );

        let state = RunState {
            token: cancel.child_token(),
            outcomes: DashMap::new(),
            dispatched: AtomicUsize::new(0),
            first_failure: OnceLock::new(),
        };

        let deadline = self.config.deadline.map(|limit| {
            let token = state.token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                debug!("Run deadline of {:?} reached", limit);
                token.cancel();
            })
        });

        futures::stream::iter(plan)
            .map(|(path, tasks)| self.run_file(path, tasks, &state))
            .buffer_unordered(self.config.per_tree_concurrency)
            .for_each(|()| future::ready(()))
            .await;

        if let Some(handle) = deadline {
            handle.abort();
        }

        let dispatched = state.dispatched.load(Ordering::SeqCst);
        let not_dispatched = planned - dispatched;
        let cancelled = state.token.is_cancelled();
        if cancelled {
            self.events.emit(PipelineEvent::Cancelled {
                pending: not_dispatched,
            });
        }

        let report = GenerationReport {
            outcomes: state.outcomes.into_iter().collect(),
            dispatched,
            not_dispatched,
            cancelled,
        };

        info!(
            "Generation finished: {} documented, {} failed, {} not dispatched",
            report.succeeded(),
            report.failed(),
            report.not_dispatched
        );

        self.apply_policy(report, state.first_failure.into_inner(), cancel)
    }

    async fn run_file(&self, path: String, tasks: Vec<GenerationTask>, state: &RunState) {
        debug!("Dispatching {} tasks for {}", tasks.len(), path);

        futures::stream::iter(tasks)
            .map(|task| self.run_task(task, state))
            .buffer_unordered(self.config.per_file_concurrency)
            .for_each(|()| future::ready(()))
            .await;
    }

    async fn run_task(&self, task: GenerationTask, state: &RunState) {
        if state.token.is_cancelled() {
            return;
        }
        state.dispatched.fetch_add(1, Ordering::SeqCst);

        let key = task.key();
        self.events.emit(PipelineEvent::TaskStarted {
            path: key.path.clone(),
            identifier: key.identifier.clone(),
        });

        let request = task.request();
        let operation = format!("generate docs for {}", key);
        let result = with_task_timeout(
            self.config.task_timeout,
            self.generator.summarize(&request),
            &operation,
            self.generator.name(),
        )
        .await
        .and_then(|text| {
            let text = text.trim();
            if text.is_empty() {
                Err(LlmError::invalid_response("generator returned empty text"))
            } else {
                Ok(text.to_string())
            }
        });

        let outcome = match result {
            Ok(text) => {
                self.events.emit(PipelineEvent::TaskSucceeded {
                    path: key.path.clone(),
                    identifier: key.identifier.clone(),
                });
                GenerationOutcome::Documented(text)
            }
            Err(err) => {
                self.events.emit(PipelineEvent::TaskFailed {
                    path: key.path.clone(),
                    identifier: key.identifier.clone(),
                    reason: err.to_string(),
                });
                if self.config.failure_policy == FailurePolicy::FailFast {
                    let _ = state.first_failure.set(format!("{}: {}", key, err));
                    state.token.cancel();
                }
                GenerationOutcome::Failed(err)
            }
        };

        state.outcomes.insert(key, outcome);
    }

    fn apply_policy(
        &self,
        report: GenerationReport,
        first_failure: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<GenerationReport> {
        match self.config.failure_policy {
            FailurePolicy::BestEffort => Ok(report),
            FailurePolicy::RequireAny => {
                if report.dispatched > 0 && report.succeeded() == 0 {
                    return Err(DocError::Generation {
                        message: "no symbol was documented".to_string(),
                        failed: report.failed(),
                        succeeded: 0,
                    });
                }
                Ok(report)
            }
            FailurePolicy::FailFast => {
                if let Some(first) = first_failure {
                    return Err(DocError::Generation {
                        message: format!("stopped at first failure ({})", first),
                        failed: report.failed(),
                        succeeded: report.succeeded(),
                    });
                }
                if cancel.is_cancelled() && report.not_dispatched > 0 {
                    return Err(DocError::Cancelled(format!(
                        "{} tasks not dispatched",
                        report.not_dispatched
                    )));
                }
                Ok(report)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
