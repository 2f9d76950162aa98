//! Fixtures shared by the unit tests

use crate::config::EngineConfig;
use crate::models::Transaction;

/// The embedded default configuration
pub fn test_config() -> EngineConfig {
    EngineConfig::embedded().expect("embedded config parses")
}

/// An expense row with a category already assigned
pub fn categorized(id: i64, description: &str, amount: f64, category: &str, subcategory: &str) -> Transaction {
    Transaction {
        id,
        amount: Some(amount),
        description: Some(description.to_string()),
        account: "ES00 TEST".to_string(),
        kind: "GASTO".to_string(),
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        ..Default::default()
    }
}

/// An expense row still carrying both placeholders
pub fn uncategorized(id: i64, description: &str, amount: f64) -> Transaction {
    categorized(id, description, amount, "SIN CATEGORÍA", "SIN SUBCATEGORÍA")
}
