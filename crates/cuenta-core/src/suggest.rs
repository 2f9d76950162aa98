//! Suggestion resolver for uncategorized transactions
//!
//! Priority: merchant default → explicit rules → learned (token, amount bin)
//! → learned token → no suggestion. The first stage with an answer wins.
//!
//! Learned lookups walk the description's tokens in lexicographic order, so a
//! row whose tokens point at different pairs always resolves the same way.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::hierarchy::CategoryHierarchy;
use crate::knowledge::{amount_bin, KnowledgeBase};
use crate::merchants::MerchantMap;
use crate::models::{Suggestion, SuggestionSource, Transaction};
use crate::normalize::Tokenizer;
use crate::rules::RuleSet;

/// Result of applying suggestions to a corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Rows whose category was the placeholder
    pub rows_considered: usize,
    pub rows_updated: usize,
    pub by_merchant: usize,
    pub by_rule: usize,
    pub by_amount_keyword: usize,
    pub by_keyword: usize,
    pub no_suggestion: usize,
}

impl ApplyResult {
    fn record(&mut self, source: SuggestionSource) {
        match source {
            SuggestionSource::Merchant => self.by_merchant += 1,
            SuggestionSource::Rule => self.by_rule += 1,
            SuggestionSource::AmountKeyword => self.by_amount_keyword += 1,
            SuggestionSource::Keyword => self.by_keyword += 1,
        }
    }
}

/// Resolves suggestions against one consistent set of derived structures
pub struct Suggester<'a> {
    config: &'a EngineConfig,
    rules: &'a RuleSet,
    knowledge: &'a KnowledgeBase,
    hierarchy: &'a CategoryHierarchy,
    merchants: &'a MerchantMap,
    tokenizer: Tokenizer,
}

impl<'a> Suggester<'a> {
    pub fn new(
        config: &'a EngineConfig,
        rules: &'a RuleSet,
        knowledge: &'a KnowledgeBase,
        hierarchy: &'a CategoryHierarchy,
        merchants: &'a MerchantMap,
    ) -> Self {
        Self {
            config,
            rules,
            knowledge,
            hierarchy,
            merchants,
            tokenizer: Tokenizer::from_config(config),
        }
    }

    /// Best-guess category/subcategory for a transaction
    pub fn suggest(&self, tx: &Transaction) -> Option<Suggestion> {
        // 1. Merchant default from categorized history
        if let Some(suggestion) = self.from_merchant(tx) {
            debug!(
                "Merchant matched for row {} ('{}'): {} / {}",
                tx.id, tx.merchant, suggestion.category, suggestion.subcategory
            );
            return Some(suggestion);
        }

        // 2. Explicit rule table
        if let Some(suggestion) = self.from_rules(tx) {
            debug!(
                "Rule matched for row {} ('{}'): {} / {}",
                tx.id,
                tx.description_text(),
                suggestion.category,
                suggestion.subcategory
            );
            return Some(suggestion);
        }

        let tokens = self.tokenizer.tokens_of(tx.description.as_deref());
        if tokens.is_empty() {
            debug!("Row {} has no usable tokens", tx.id);
            return None;
        }

        // 3. Learned (token, amount bin)
        if let Some(amount) = tx.finite_amount() {
            let bin = amount_bin(amount, self.config.amount_bin_width);
            for token in &tokens {
                if let Some(pair) = self.knowledge.amount_keyword(token, bin) {
                    debug!(
                        "Amount keyword '{}' @ {} matched for row {}: {}",
                        token, bin, tx.id, pair
                    );
                    return Some(Suggestion::from_pair(pair, SuggestionSource::AmountKeyword));
                }
            }
        }

        // 4. Learned token
        for token in &tokens {
            if let Some(pair) = self.knowledge.keyword(token) {
                debug!("Keyword '{}' matched for row {}: {}", token, tx.id, pair);
                return Some(Suggestion::from_pair(pair, SuggestionSource::Keyword));
            }
        }

        None
    }

    fn from_merchant(&self, tx: &Transaction) -> Option<Suggestion> {
        let merchant = tx.merchant_key()?;
        let category = self.merchants.category_for(merchant)?;
        Some(Suggestion {
            category: category.to_string(),
            subcategory: self
                .hierarchy
                .default_subcategory(category, &self.config.default_subcategory),
            source: SuggestionSource::Merchant,
        })
    }

    fn from_rules(&self, tx: &Transaction) -> Option<Suggestion> {
        let description = tx.description.as_deref()?;
        let rule = self.rules.first_match(description, &tx.subcategory)?;
        Some(Suggestion::from_pair(&rule.assignment, SuggestionSource::Rule))
    }

    /// Fill placeholder categories in place.
    ///
    /// The category is written when it is the placeholder. The subcategory is
    /// written only when it is still the placeholder, so a subcategory the
    /// user already chose is kept.
    pub fn apply(&self, corpus: &mut [Transaction]) -> ApplyResult {
        let mut result = ApplyResult::default();

        for tx in corpus.iter_mut() {
            if !self.config.is_placeholder_category(&tx.category) {
                continue;
            }
            result.rows_considered += 1;

            let Some(suggestion) = self.suggest(tx) else {
                result.no_suggestion += 1;
                continue;
            };

            let mut applied = false;
            if self.config.is_placeholder_category(&tx.category) {
                tx.category = suggestion.category.clone();
                applied = true;
            }
            if self.config.is_placeholder_subcategory(&tx.subcategory)
                && (applied || !self.config.is_placeholder_category(&tx.category))
            {
                tx.subcategory = suggestion.subcategory.clone();
                applied = true;
            }

            if applied {
                result.rows_updated += 1;
                result.record(suggestion.source);
            }
        }

        result
    }

    /// What a bare description would resolve to
    pub fn test_assignment(
        &self,
        description: &str,
        merchant: Option<&str>,
        amount: Option<f64>,
    ) -> Option<Suggestion> {
        let query = Transaction {
            description: Some(description.to_string()),
            merchant: merchant.unwrap_or_default().to_string(),
            amount,
            category: self.config.placeholders.category.clone(),
            subcategory: self.config.placeholders.subcategory.clone(),
            ..Default::default()
        };
        self.suggest(&query)
    }
}

/// One-off suggestion without holding a `Suggester`
pub fn suggest(
    tx: &Transaction,
    knowledge: &KnowledgeBase,
    hierarchy: &CategoryHierarchy,
    merchants: &MerchantMap,
    rules: &RuleSet,
    config: &EngineConfig,
) -> Option<Suggestion> {
    Suggester::new(config, rules, knowledge, hierarchy, merchants).suggest(tx)
}
