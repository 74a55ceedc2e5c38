pub mod error;
pub mod finding;

pub use error::{DocError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use finding::{Anchor, Finding, FindingsByFile, Inventory, SymbolKey, SymbolKind};
