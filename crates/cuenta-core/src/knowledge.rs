//! Frequency-based learning from categorized transactions
//!
//! Every token of a learning-eligible row votes for the row's
//! (category, subcategory) pair, once on its own and once together with the
//! row's amount bin. Each key keeps only its most voted pair.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{CategoryPair, Transaction};
use crate::normalize::Tokenizer;

/// Learned keyword maps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    keyword_map: HashMap<String, CategoryPair>,
    amount_keyword_map: HashMap<(String, i64), CategoryPair>,
}

/// Counters describing one learning pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnStats {
    pub rows_total: usize,
    pub rows_eligible: usize,
    /// Eligible rows that only fed the keyword map
    pub rows_without_amount: usize,
    pub keywords: usize,
    pub amount_keywords: usize,
}

impl KnowledgeBase {
    pub fn is_empty(&self) -> bool {
        self.keyword_map.is_empty() && self.amount_keyword_map.is_empty()
    }

    pub fn keyword(&self, token: &str) -> Option<&CategoryPair> {
        self.keyword_map.get(token)
    }

    pub fn amount_keyword(&self, token: &str, bin: i64) -> Option<&CategoryPair> {
        self.amount_keyword_map.get(&(token.to_string(), bin))
    }

    pub fn keyword_map(&self) -> &HashMap<String, CategoryPair> {
        &self.keyword_map
    }

    pub fn amount_keyword_map(&self) -> &HashMap<(String, i64), CategoryPair> {
        &self.amount_keyword_map
    }
}

/// Round an amount to the nearest multiple of `width`.
///
/// Halves go to the even multiple, so 25 bins to 20 and 35 to 40.
pub fn amount_bin(amount: f64, width: u32) -> i64 {
    let width = f64::from(width.max(1));
    ((amount / width).round_ties_even() * width) as i64
}

/// Whether a row may teach the knowledge base and the hierarchy
pub fn is_learning_eligible(tx: &Transaction, config: &EngineConfig) -> bool {
    let category = tx.category.trim();
    let subcategory = tx.subcategory.trim();
    !category.is_empty()
        && !subcategory.is_empty()
        && !config.is_placeholder_category(&tx.category)
        && !config.is_placeholder_subcategory(&tx.subcategory)
        && !config.is_structural(&tx.kind)
}

/// Build a knowledge base from a corpus
pub fn learn(corpus: &[Transaction], config: &EngineConfig) -> (KnowledgeBase, LearnStats) {
    let tokenizer = Tokenizer::from_config(config);
    let mut stats = LearnStats {
        rows_total: corpus.len(),
        ..Default::default()
    };

    let mut keyword_counts: HashMap<String, BTreeMap<CategoryPair, usize>> = HashMap::new();
    let mut amount_counts: HashMap<(String, i64), BTreeMap<CategoryPair, usize>> = HashMap::new();

    for tx in corpus.iter().filter(|tx| is_learning_eligible(tx, config)) {
        stats.rows_eligible += 1;

        let pair = CategoryPair::new(&tx.category, &tx.subcategory);
        let bin = tx
            .finite_amount()
            .map(|a| amount_bin(a, config.amount_bin_width));
        if bin.is_none() {
            stats.rows_without_amount += 1;
        }

        for token in tokenizer.tokens_of(tx.description.as_deref()) {
            if let Some(bin) = bin {
                *amount_counts
                    .entry((token.clone(), bin))
                    .or_default()
                    .entry(pair.clone())
                    .or_insert(0) += 1;
            }
            *keyword_counts
                .entry(token)
                .or_default()
                .entry(pair.clone())
                .or_insert(0) += 1;
        }
    }

    let kb = KnowledgeBase {
        keyword_map: finalize(keyword_counts),
        amount_keyword_map: finalize(amount_counts),
    };
    stats.keywords = kb.keyword_map.len();
    stats.amount_keywords = kb.amount_keyword_map.len();

    debug!(
        "Learned {} keywords and {} amount keywords from {}/{} rows",
        stats.keywords, stats.amount_keywords, stats.rows_eligible, stats.rows_total
    );

    (kb, stats)
}

/// Keep the most frequent pair per key; ties go to the smallest pair
fn finalize<K: std::hash::Hash + Eq>(
    counts: HashMap<K, BTreeMap<CategoryPair, usize>>,
) -> HashMap<K, CategoryPair> {
    counts
        .into_iter()
        .filter_map(|(key, pairs)| most_frequent(pairs).map(|pair| (key, pair)))
        .collect()
}

/// Argmax of a counter ordered by key; the first (smallest) key wins ties
pub(crate) fn most_frequent<T: Ord>(counts: BTreeMap<T, usize>) -> Option<T> {
    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}
