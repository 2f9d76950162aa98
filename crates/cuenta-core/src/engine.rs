//! Engine state: configuration plus the current snapshot of derived structures
//!
//! A snapshot bundles the knowledge base, hierarchy and merchant map built from
//! one corpus version. Rebuilding computes a new snapshot and swaps it in; a
//! caller holding an `Arc<Snapshot>` keeps reading the version it pinned.
//! Rebuilds are serialized, so each one publishes exactly the previous
//! version + 1.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::hierarchy::{derive_hierarchy, CategoryHierarchy};
use crate::knowledge::{learn, KnowledgeBase, LearnStats};
use crate::merchants::{derive_merchant_map, MerchantMap};
use crate::models::{Suggestion, Transaction};
use crate::rules::RuleSet;
use crate::suggest::{ApplyResult, Suggester};
use crate::validate::{commit_edits, validate, CommitResult, Edit, ValidationResult};

/// Derived structures from one corpus version
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub version: u64,
    /// Digest of the corpus fields that feed learning
    pub fingerprint: String,
    pub knowledge: KnowledgeBase,
    pub hierarchy: CategoryHierarchy,
    pub merchants: MerchantMap,
    pub stats: LearnStats,
}

/// Summary of a snapshot for display
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub version: u64,
    pub fingerprint: String,
    pub stats: LearnStats,
    pub categories: usize,
    pub merchants: usize,
}

impl Snapshot {
    /// Build every derived structure from a corpus
    pub fn build(corpus: &[Transaction], config: &EngineConfig, version: u64) -> Self {
        let (knowledge, stats) = learn(corpus, config);
        Self {
            version,
            fingerprint: corpus_fingerprint(corpus),
            knowledge,
            hierarchy: derive_hierarchy(corpus, config),
            merchants: derive_merchant_map(corpus, config),
            stats,
        }
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            version: self.version,
            fingerprint: self.fingerprint.clone(),
            stats: self.stats.clone(),
            categories: self.hierarchy.len(),
            merchants: self.merchants.len(),
        }
    }
}

/// Digest of the fields that influence learning, in corpus order
pub fn corpus_fingerprint(corpus: &[Transaction]) -> String {
    let mut hasher = Sha256::new();
    for tx in corpus {
        hasher.update(tx.kind.as_bytes());
        hasher.update([0x1f]);
        hasher.update(tx.category.as_bytes());
        hasher.update([0x1f]);
        hasher.update(tx.subcategory.as_bytes());
        hasher.update([0x1f]);
        hasher.update(tx.merchant.as_bytes());
        hasher.update([0x1f]);
        hasher.update(tx.description_text().as_bytes());
        hasher.update([0x1f]);
        match tx.amount {
            Some(amount) => hasher.update(amount.to_be_bytes()),
            None => hasher.update([0u8]),
        }
        hasher.update([0x1e]);
    }
    hex::encode(hasher.finalize())
}

/// Categorization engine
pub struct Engine {
    config: EngineConfig,
    rules: RuleSet,
    current: RwLock<Arc<Snapshot>>,
    /// Held for the whole build-and-swap of a rebuild
    rebuild_lock: Mutex<()>,
}

impl Engine {
    /// Create an engine with an empty version-0 snapshot
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let rules = RuleSet::compile(&config.rules)?;
        Ok(Self {
            config,
            rules,
            current: RwLock::new(Arc::new(Snapshot::default())),
            rebuild_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Pin the current snapshot
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let guard = self
            .current
            .read()
            .map_err(|_| Error::InvalidData("engine state lock poisoned".into()))?;
        Ok(Arc::clone(&guard))
    }

    fn lock_rebuild(&self) -> Result<MutexGuard<'_, ()>> {
        self.rebuild_lock
            .lock()
            .map_err(|_| Error::InvalidData("engine rebuild lock poisoned".into()))
    }

    /// Rebuild every derived structure from the corpus
    pub fn rebuild(&self, corpus: &[Transaction]) -> Result<Arc<Snapshot>> {
        let _rebuilding = self.lock_rebuild()?;
        self.publish(corpus)
    }

    /// Build and swap in the next version; callers hold the rebuild lock
    fn publish(&self, corpus: &[Transaction]) -> Result<Arc<Snapshot>> {
        let next_version = self.snapshot()?.version + 1;
        let snapshot = Arc::new(Snapshot::build(corpus, &self.config, next_version));

        {
            let mut guard = self
                .current
                .write()
                .map_err(|_| Error::InvalidData("engine state lock poisoned".into()))?;
            *guard = Arc::clone(&snapshot);
        }

        info!(
            "Rebuilt knowledge v{}: {} keywords, {} amount keywords, {} categories, {} merchants ({}/{} rows eligible)",
            snapshot.version,
            snapshot.stats.keywords,
            snapshot.stats.amount_keywords,
            snapshot.hierarchy.len(),
            snapshot.merchants.len(),
            snapshot.stats.rows_eligible,
            snapshot.stats.rows_total
        );

        Ok(snapshot)
    }

    /// Rebuild only when the corpus differs from the one behind the current snapshot.
    /// Returns the current snapshot and whether a rebuild happened.
    pub fn rebuild_if_changed(&self, corpus: &[Transaction]) -> Result<(Arc<Snapshot>, bool)> {
        let _rebuilding = self.lock_rebuild()?;
        let current = self.snapshot()?;
        if current.version > 0 && current.fingerprint == corpus_fingerprint(corpus) {
            return Ok((current, false));
        }
        Ok((self.publish(corpus)?, true))
    }

    /// Suggester bound to a pinned snapshot
    pub fn suggester<'a>(&'a self, snapshot: &'a Snapshot) -> Suggester<'a> {
        Suggester::new(
            &self.config,
            &self.rules,
            &snapshot.knowledge,
            &snapshot.hierarchy,
            &snapshot.merchants,
        )
    }

    pub fn suggest(&self, tx: &Transaction) -> Result<Option<Suggestion>> {
        let snapshot = self.snapshot()?;
        Ok(self.suggester(&snapshot).suggest(tx))
    }

    /// Fill placeholder categories in the corpus using one pinned snapshot
    pub fn apply_suggestions(&self, corpus: &mut [Transaction]) -> Result<ApplyResult> {
        let snapshot = self.snapshot()?;
        let result = self.suggester(&snapshot).apply(corpus);
        info!(
            "Applied suggestions to {}/{} rows (merchant: {}, rule: {}, amount keyword: {}, keyword: {}, none: {})",
            result.rows_updated,
            result.rows_considered,
            result.by_merchant,
            result.by_rule,
            result.by_amount_keyword,
            result.by_keyword,
            result.no_suggestion
        );
        Ok(result)
    }

    pub fn validate(&self, edits: &[Edit]) -> Result<ValidationResult> {
        let snapshot = self.snapshot()?;
        Ok(validate(edits, &snapshot.hierarchy, &self.config.placeholders))
    }

    pub fn commit_edits(&self, corpus: &mut [Transaction], edits: &[Edit]) -> Result<CommitResult> {
        let snapshot = self.snapshot()?;
        commit_edits(corpus, edits, &snapshot.hierarchy, &self.config)
    }
}
