//! Merchant → default category map
//!
//! A merchant maps to the category it was most often filed under. Ties go to
//! the alphabetically first category so the map is stable across corpus order.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::knowledge::most_frequent;
use crate::models::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantMap {
    merchants: BTreeMap<String, String>,
}

impl MerchantMap {
    pub fn is_empty(&self) -> bool {
        self.merchants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.merchants.len()
    }

    /// Category for a merchant, matched on the trimmed name
    pub fn category_for(&self, merchant: &str) -> Option<&str> {
        let merchant = merchant.trim();
        if merchant.is_empty() {
            return None;
        }
        self.merchants.get(merchant).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.merchants.iter()
    }
}

impl<M, C> FromIterator<(M, C)> for MerchantMap
where
    M: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (M, C)>>(iter: I) -> Self {
        Self {
            merchants: iter
                .into_iter()
                .map(|(m, c)| (m.into(), c.into()))
                .collect(),
        }
    }
}

/// Modal category per merchant over rows with an assigned category.
///
/// Only the category has to be assigned; the subcategory may still be the
/// placeholder.
pub fn derive_merchant_map(corpus: &[Transaction], config: &EngineConfig) -> MerchantMap {
    let mut counts: HashMap<&str, BTreeMap<&str, usize>> = HashMap::new();

    for tx in corpus {
        let Some(merchant) = tx.merchant_key() else {
            continue;
        };
        let category = tx.category.as_str();
        if category.trim().is_empty() || config.is_placeholder_category(category) {
            continue;
        }
        *counts
            .entry(merchant)
            .or_default()
            .entry(category)
            .or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter_map(|(merchant, categories)| {
            most_frequent(categories).map(|category| (merchant, category))
        })
        .collect()
}
