//! Category → subcategory hierarchy derived from categorized history

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::knowledge::is_learning_eligible;
use crate::models::Transaction;

/// Subcategories observed with each category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryHierarchy {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl CategoryHierarchy {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Known subcategories of a category, `None` for an unknown category
    pub fn subcategories(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.categories.get(category)
    }

    /// Subcategory used when only the category is known: the smallest known
    /// one, or `fallback` when the category has none
    pub fn default_subcategory(&self, category: &str, fallback: &str) -> String {
        self.categories
            .get(category)
            .and_then(|subs| subs.iter().next())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.categories.iter()
    }

    /// Add an observed pair
    pub fn insert(&mut self, category: impl Into<String>, subcategory: impl Into<String>) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(subcategory.into());
    }
}

impl<C, S> FromIterator<(C, S)> for CategoryHierarchy
where
    C: Into<String>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, S)>>(iter: I) -> Self {
        let mut hierarchy = Self::default();
        for (category, subcategory) in iter {
            hierarchy.insert(category, subcategory);
        }
        hierarchy
    }
}

/// Group learning-eligible rows by category
pub fn derive_hierarchy(corpus: &[Transaction], config: &EngineConfig) -> CategoryHierarchy {
    corpus
        .iter()
        .filter(|tx| is_learning_eligible(tx, config))
        .map(|tx| (tx.category.clone(), tx.subcategory.clone()))
        .collect()
}

/// Distinct assigned categories in the corpus, sorted
pub fn category_options(corpus: &[Transaction], config: &EngineConfig) -> Vec<String> {
    corpus
        .iter()
        .map(|tx| tx.category.as_str())
        .filter(|c| !c.trim().is_empty() && !config.is_placeholder_category(c))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct assigned subcategories in the corpus, sorted
pub fn subcategory_options(corpus: &[Transaction], config: &EngineConfig) -> Vec<String> {
    corpus
        .iter()
        .map(|tx| tx.subcategory.as_str())
        .filter(|s| !s.trim().is_empty() && !config.is_placeholder_subcategory(s))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
