//! Test doubles shared by pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::ai::provider::{DocGenerator, SymbolRequest};
use crate::analyzer::{LocatorOptions, MemoryTree, SymbolLocator};
use crate::pipeline::events::{NullSink, SharedEventSink};
use crate::types::{ErrorCategory, Inventory, LlmError};

/// Deterministic generator: "`<name>` is documented." for every symbol,
/// with configurable failures and latency. Tracks peak concurrency.
#[derive(Default)]
pub struct MockGenerator {
    pub calls: AtomicU32,
    fail: HashSet<String>,
    empty: HashSet<String>,
    texts: HashMap<String, String>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, identifier: &str) -> Self {
        self.fail.insert(identifier.to_string());
        self
    }

    pub fn empty_for(mut self, identifier: &str) -> Self {
        self.empty.insert(identifier.to_string());
        self
    }

    pub fn with_text(mut self, identifier: &str, text: &str) -> Self {
        self.texts.insert(identifier.to_string(), text.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl DocGenerator for MockGenerator {
    async fn summarize(&self, request: &SymbolRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail.contains(&request.identifier) {
            return Err(LlmError::with_provider(
                ErrorCategory::RateLimit,
                format!("rate limited on {}", request.identifier),
                "mock",
            ));
        }
        if self.empty.contains(&request.identifier) {
            return Ok("   ".to_string());
        }

        if let Some(text) = self.texts.get(&request.identifier) {
            return Ok(text.clone());
        }

        let name = crate::ai::prompt::doc_subject(&request.identifier);
        Ok(format!("{} is documented.", name))
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-1"
    }
}

pub fn null_sink() -> SharedEventSink {
    Arc::new(NullSink)
}

/// Locate findings in an in-memory tree with default options
pub fn inventory_of(tree: &MemoryTree) -> Inventory {
    SymbolLocator::new(LocatorOptions::default(), null_sink())
        .unwrap()
        .locate(tree)
        .unwrap()
}

pub const A_GO: &str = "package a\n\nfunc Foo() {}\n\n// Bar does x.\nfunc Bar() {}\n\ntype T struct{}\n\nfunc (t *T) Baz() {}\n";

/// Five undocumented functions spread over two files
pub fn five_symbol_tree() -> MemoryTree {
    MemoryTree::new()
        .with_file(
            "a.go",
            "package p\n\nfunc A1() {}\n\nfunc A2() {}\n\nfunc A3() {}\n",
        )
        .with_file("b.go", "package p\n\nfunc B1() {}\n\nfunc B2() {}\n")
}
