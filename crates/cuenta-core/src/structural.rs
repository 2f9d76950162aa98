//! Fixed assignments for structural transaction types
//!
//! Transfers, card settlements and similar kinds get their category by
//! convention. This pre-pass writes that category before any suggestion runs;
//! such rows are never used for learning either way.

use tracing::debug;

use crate::config::EngineConfig;
use crate::models::Transaction;

/// Tag structural rows with their configured pair, returning the number of rows changed
pub fn apply_structural(corpus: &mut [Transaction], config: &EngineConfig) -> usize {
    let mut changed = 0;

    for tx in corpus.iter_mut() {
        let Some(st) = config.structural_for(&tx.kind) else {
            continue;
        };
        if tx.category == st.category && tx.subcategory == st.subcategory {
            continue;
        }
        debug!(
            "Structural type '{}' on row {}: {} / {}",
            tx.kind, tx.id, st.category, st.subcategory
        );
        tx.category = st.category.clone();
        tx.subcategory = st.subcategory.clone();
        changed += 1;
    }

    changed
}
