//! Domain models for Cuenta

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A financial transaction as handed to the engine by the surrounding application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-assigned row id, used to address edits
    pub id: i64,
    pub date: Option<NaiveDate>,
    /// Negative = expense, positive = income. `None` when the source value was unparseable.
    pub amount: Option<f64>,
    /// Merchant name, may be empty
    pub merchant: String,
    /// Free-text description. `None` when absent or not text.
    pub description: Option<String>,
    pub account: String,
    /// Coarse transaction kind (expense, transfer, bill, ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub subcategory: String,
}

impl Transaction {
    /// The description, or an empty string when absent
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// The amount if it is present and finite
    pub fn finite_amount(&self) -> Option<f64> {
        self.amount.filter(|a| a.is_finite())
    }

    /// Trimmed merchant, or `None` when empty
    pub fn merchant_key(&self) -> Option<&str> {
        let merchant = self.merchant.trim();
        if merchant.is_empty() {
            None
        } else {
            Some(merchant)
        }
    }
}

/// A (category, subcategory) assignment
///
/// Ordering is lexicographic by category, then subcategory. Frequency
/// tie-breaks rely on it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryPair {
    pub category: String,
    pub subcategory: String,
}

impl CategoryPair {
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }
}

impl fmt::Display for CategoryPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.category, self.subcategory)
    }
}

/// Which stage of the suggestion cascade produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Merchant's modal category from categorized history
    Merchant,
    /// Matched an explicit rule from the rule table
    Rule,
    /// Learned (token, amount bin) association
    AmountKeyword,
    /// Learned token association
    Keyword,
}

impl SuggestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merchant => "merchant",
            Self::Rule => "rule",
            Self::AmountKeyword => "amount_keyword",
            Self::Keyword => "keyword",
        }
    }
}

impl fmt::Display for SuggestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A best-guess category/subcategory for one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    pub subcategory: String,
    pub source: SuggestionSource,
}

impl Suggestion {
    pub fn from_pair(pair: &CategoryPair, source: SuggestionSource) -> Self {
        Self {
            category: pair.category.clone(),
            subcategory: pair.subcategory.clone(),
            source,
        }
    }
}

/// Pattern matching type for explicit rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Case-insensitive substring match (supports | for OR)
    #[default]
    Contains,
    /// Case-insensitive prefix match (supports | for OR)
    StartsWith,
    /// Exact string match (case-insensitive)
    Exact,
    /// Regular expression match against the lower-cased description
    Regex,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::Exact => "exact",
            Self::Regex => "regex",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
