//! Cuenta Core Library
//!
//! Transaction auto-categorization for personal finance ledgers:
//! - Description normalization and tokenization
//! - Frequency learning of keyword and (keyword, amount bin) maps
//! - Category hierarchy and merchant defaults derived from history
//! - Ordered rule table for well-known merchants and providers
//! - Suggestion cascade for uncategorized rows
//! - All-or-nothing validation of manual edits
//! - Versioned engine snapshots rebuilt when the corpus changes

pub mod config;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod knowledge;
pub mod merchants;
pub mod models;
pub mod normalize;
pub mod rules;
pub mod structural;
pub mod suggest;
pub mod validate;

#[cfg(test)]
mod test_utils;

pub use config::{EngineConfig, Placeholders, RuleConfig, StructuralType};
pub use engine::{corpus_fingerprint, Engine, Snapshot, SnapshotSummary};
pub use error::{Error, Result};
pub use hierarchy::{category_options, derive_hierarchy, subcategory_options, CategoryHierarchy};
pub use knowledge::{amount_bin, is_learning_eligible, learn, KnowledgeBase, LearnStats};
pub use merchants::{derive_merchant_map, MerchantMap};
pub use models::{CategoryPair, PatternType, Suggestion, SuggestionSource, Transaction};
pub use normalize::{normalize, Tokenizer};
pub use rules::{Rule, RuleSet};
pub use structural::apply_structural;
pub use suggest::{suggest, ApplyResult, Suggester};
pub use validate::{commit_edits, validate, CommitResult, Edit, ValidationResult, Violation};
