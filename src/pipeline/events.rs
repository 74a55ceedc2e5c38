//! Pipeline Progress Events
//!
//! Components report progress through an injected [`EventSink`] instead of
//! writing to shared global state. The host decides what to keep: the default
//! [`TracingSink`] forwards to `tracing`, [`CollectingSink`] buffers events for
//! inspection.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

/// Structured progress event
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    DirectorySkipped { path: String, reason: String },
    FileSkipped { path: String, reason: String },
    FileScanned { path: String, findings: usize },
    TaskStarted { path: String, identifier: String },
    TaskSucceeded { path: String, identifier: String },
    TaskFailed {
        path: String,
        identifier: String,
        reason: String,
    },
    /// Cancellation observed; `pending` tasks will not be dispatched
    Cancelled { pending: usize },
    FileWritten { path: String },
    Committed {
        branch: String,
        commit: Option<String>,
    },
}

/// Receiver of pipeline events. Must tolerate concurrent callers.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

pub type SharedEventSink = Arc<dyn EventSink>;

/// Forwards every event to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::DirectorySkipped { path, reason } => {
                debug!(path = %path, reason = %reason, "directory skipped")
            }
            PipelineEvent::FileSkipped { path, reason } => {
                debug!(path = %path, reason = %reason, "file skipped")
            }
            PipelineEvent::FileScanned { path, findings } => {
                debug!(path = %path, findings, "file scanned")
            }
            PipelineEvent::TaskStarted { path, identifier } => {
                debug!(path = %path, identifier = %identifier, "generating")
            }
            PipelineEvent::TaskSucceeded { path, identifier } => {
                debug!(path = %path, identifier = %identifier, "documented")
            }
            PipelineEvent::TaskFailed {
                path,
                identifier,
                reason,
            } => warn!(path = %path, identifier = %identifier, "generation failed: {}", reason),
            PipelineEvent::Cancelled { pending } => {
                warn!(pending, "cancelled, no further tasks will be dispatched")
            }
            PipelineEvent::FileWritten { path } => info!(path = %path, "file written"),
            PipelineEvent::Committed { branch, commit } => info!(
                branch = %branch,
                commit = commit.as_deref().unwrap_or("none"),
                "committed"
            ),
        }
    }
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}

/// Buffers events in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Default sink for hosts that only want log output
pub fn tracing_sink() -> SharedEventSink {
    Arc::new(TracingSink)
}
