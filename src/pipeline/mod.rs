//! Documentation Pipeline
//!
//! ```text
//! Locator → Scheduler → (DocGenerator) → Assembler → Delivery
//! ```
//!
//! Data flows strictly left to right; no stage depends on a later one.
//! Progress is reported through the injected [`events::EventSink`].
//!
//! ## Modules
//!
//! - `scheduler`: two-level bounded concurrency over generation tasks
//! - `assembler`: bottom-up splicing of doc blocks into captured sources
//! - `delivery`: dry run, apply, or commit on a branch
//! - `vcs`: git plumbing used by commit delivery

pub mod assembler;
pub mod delivery;
pub mod events;
pub mod scheduler;
pub mod vcs;

#[cfg(test)]
pub(crate) mod testing;

pub use assembler::{Patch, PatchAssembler, PatchedFile, format_doc_block};
pub use delivery::{DeliveryMode, DeliveryOutcome, ResultDelivery, render_diff};
pub use events::{
    CollectingSink, EventSink, NullSink, PipelineEvent, SharedEventSink, TracingSink,
    tracing_sink,
};
pub use scheduler::{
    GenerationOutcome, GenerationReport, GenerationTask, Scheduler, SchedulerConfig, plan_tasks,
};
pub use vcs::{GitRepository, VersionControl};

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::ai::provider::SharedGenerator;
use crate::analyzer::{LocatorOptions, SourceTree, SymbolLocator, TreeWriter};
use crate::config::Config;
use crate::types::{Inventory, Result};

/// Everything one invocation produced
#[derive(Debug)]
pub struct RunSummary {
    pub findings: usize,
    pub files: usize,
    pub report: GenerationReport,
    pub patch: Patch,
    pub delivery: DeliveryOutcome,
}

/// Wires the stages together for one batch over a tree snapshot
pub struct Pipeline {
    config: Config,
    generator: SharedGenerator,
    events: SharedEventSink,
}

impl Pipeline {
    /// Rejects invalid configuration before anything touches the tree
    pub fn new(config: Config, generator: SharedGenerator, events: SharedEventSink) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            generator,
            events,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Locate findings without generating anything
    pub fn scan(&self, tree: &dyn SourceTree) -> Result<Inventory> {
        scan_tree(&self.config, tree, self.events.clone())
    }

    /// Locate, generate, assemble and deliver
    pub async fn run<T>(
        &self,
        tree: &T,
        vcs: Option<&dyn VersionControl>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary>
    where
        T: SourceTree + TreeWriter,
    {
        let inventory = self.scan(tree)?;
        info!(
            "Found {} undocumented symbols in {} files",
            inventory.total_findings(),
            inventory.file_count()
        );

        let report = if inventory.is_empty() {
            GenerationReport::default()
        } else {
            let scheduler = Scheduler::new(
                SchedulerConfig::from(&self.config.generation),
                self.generator.clone(),
                self.events.clone(),
            )?;
            scheduler.run(&inventory, cancel).await?
        };

        let patch = PatchAssembler::assemble(&inventory, &report);
        let mode = DeliveryMode::from_config(&self.config.delivery);

        let mut delivery = ResultDelivery::new(tree, self.events.clone());
        if let Some(vcs) = vcs {
            delivery = delivery.with_vcs(vcs);
        }
        let outcome = delivery.deliver(&patch, &mode)?;

        Ok(RunSummary {
            findings: inventory.total_findings(),
            files: inventory.file_count(),
            report,
            patch,
            delivery: outcome,
        })
    }
}

/// Run the locator over `tree` with the configured options
pub fn scan_tree(config: &Config, tree: &dyn SourceTree, events: SharedEventSink) -> Result<Inventory> {
    let options = LocatorOptions::from_config(&config.locator)?;
    SymbolLocator::new(options, events)?.locate(tree)
}
