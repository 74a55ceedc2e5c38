//! docweave - LLM-written doc comments for Go source trees
//!
//! Finds Go declarations that lack a leading `//` doc comment, asks an LLM
//! for one per symbol under bounded concurrency, splices the
//! results back into the sources and hands them to the caller as a diff, a
//! write to disk, or a commit on a branch.
//!
//! ## Core Features
//!
//! - **Symbol Locator**: tree-sitter Go parsing, depth-first deterministic walk
//! - **Scheduler**: per-tree and per-file concurrency bounds, item limit,
//!   cancellation and failure policies
//! - **Patch Assembler**: bottom-up splicing that leaves unrelated bytes alone
//! - **Delivery**: dry run diff, apply, or git commit on a named branch
//!
//! ## Quick Start
//!
//! ```ignore
//! use docweave::{Config, Pipeline, ProviderConfig, create_provider, tracing_sink};
//! use docweave::analyzer::FsTree;
//!
//! let config = Config::default();
//! let generator = create_provider(&ProviderConfig::from_llm_config(&config.llm, None))?;
//! let pipeline = Pipeline::new(config, generator, tracing_sink())?;
//! let summary = pipeline
//!     .run(&FsTree::new("."), None, &CancellationToken::new())
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: generation capability, prompts, providers, retries
//! - [`analyzer`]: Go parsing with tree-sitter, source trees, symbol location
//! - [`pipeline`]: scheduling, assembly, delivery, version control
//! - [`config`]: layered configuration

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, FailurePolicy};

// Error Types
pub use types::error::{DocError, ErrorCategory, LlmError, Result};

// Domain
pub use types::{Finding, Inventory, SymbolKey, SymbolKind};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    DeliveryMode, DeliveryOutcome, EventSink, GenerationReport, Patch, Pipeline, PipelineEvent,
    RunSummary, Scheduler, SchedulerConfig, tracing_sink,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{DocGenerator, ProviderConfig, SharedGenerator, create_provider};
