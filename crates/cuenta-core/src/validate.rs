//! Validation of manual category edits
//!
//! A batch of edits is accepted or rejected as a whole. A rejected batch
//! reports every offending edit together with the subcategories that would
//! have been accepted for its category.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{EngineConfig, Placeholders};
use crate::error::{Error, Result};
use crate::hierarchy::CategoryHierarchy;
use crate::models::Transaction;

/// A proposed category/subcategory change for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub row_id: i64,
    pub category: String,
    pub subcategory: String,
}

impl Edit {
    pub fn new(row_id: i64, category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            row_id,
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }
}

/// An edit whose subcategory doesn't belong to its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub row_id: i64,
    pub category: String,
    pub subcategory: String,
    /// Subcategories known for the category, sorted
    pub valid_subcategories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub violations: Vec<Violation>,
}

/// Outcome of a committed batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub edits_applied: usize,
    /// Category and subcategory values that actually changed
    pub fields_changed: usize,
}

/// Check one edit against the hierarchy
fn check_edit(
    edit: &Edit,
    hierarchy: &CategoryHierarchy,
    placeholders: &Placeholders,
) -> Option<Violation> {
    // A category the hierarchy has never seen is new and always allowed
    let known = hierarchy.subcategories(&edit.category)?;

    if edit.subcategory.is_empty()
        || edit.subcategory == placeholders.subcategory
        || known.contains(&edit.subcategory)
    {
        return None;
    }

    Some(Violation {
        row_id: edit.row_id,
        category: edit.category.clone(),
        subcategory: edit.subcategory.clone(),
        valid_subcategories: known.iter().cloned().collect(),
    })
}

/// Validate a batch of edits; the batch is only `ok` when every edit is
pub fn validate(
    edits: &[Edit],
    hierarchy: &CategoryHierarchy,
    placeholders: &Placeholders,
) -> ValidationResult {
    let violations: Vec<Violation> = edits
        .iter()
        .filter_map(|edit| check_edit(edit, hierarchy, placeholders))
        .collect();

    if !violations.is_empty() {
        debug!(
            "{} of {} edits violate the category hierarchy",
            violations.len(),
            edits.len()
        );
    }

    ValidationResult {
        ok: violations.is_empty(),
        violations,
    }
}

/// Validate then apply a batch of edits to the corpus, all or nothing
pub fn commit_edits(
    corpus: &mut [Transaction],
    edits: &[Edit],
    hierarchy: &CategoryHierarchy,
    config: &EngineConfig,
) -> Result<CommitResult> {
    let validation = validate(edits, hierarchy, &config.placeholders);
    if !validation.ok {
        return Err(Error::EditsRejected(validation.violations));
    }

    let mut index: HashMap<i64, usize> = HashMap::with_capacity(corpus.len());
    let mut repeated: HashSet<i64> = HashSet::new();
    for (pos, tx) in corpus.iter().enumerate() {
        if index.insert(tx.id, pos).is_some() {
            repeated.insert(tx.id);
        }
    }

    let mut unknown: Vec<i64> = edits
        .iter()
        .map(|e| e.row_id)
        .filter(|id| !index.contains_key(id))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        let ids = unknown
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::NotFound(format!("rows {}", ids)));
    }

    // An edit on a repeated id cannot name a single row
    let mut ambiguous: Vec<i64> = edits
        .iter()
        .map(|e| e.row_id)
        .filter(|id| repeated.contains(id))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if !ambiguous.is_empty() {
        ambiguous.sort_unstable();
        let ids = ambiguous
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::InvalidData(format!(
            "rows {} appear more than once in the corpus",
            ids
        )));
    }

    let mut result = CommitResult::default();
    for edit in edits {
        let tx = &mut corpus[index[&edit.row_id]];
        if tx.category != edit.category {
            tx.category = edit.category.clone();
            result.fields_changed += 1;
        }
        if tx.subcategory != edit.subcategory {
            tx.subcategory = edit.subcategory.clone();
            result.fields_changed += 1;
        }
        result.edits_applied += 1;
    }

    info!(
        "Committed {} edits ({} fields changed)",
        result.edits_applied, result.fields_changed
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{categorized, test_config, uncategorized};

    fn food_hierarchy() -> CategoryHierarchy {
        [
            ("ALIMENTACIÓN", "SUPERMERCADO"),
            ("ALIMENTACIÓN", "ONLINE"),
            ("HOGAR", "LIMPIEZA"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_invalid_subcategory_reported_with_options() {
        let config = test_config();
        let edits = vec![Edit::new(7, "ALIMENTACIÓN", "FARMACIA")];

        let result = validate(&edits, &food_hierarchy(), &config.placeholders);

        assert!(!result.ok);
        assert_eq!(result.violations.len(), 1);
        let v = &result.violations[0];
        assert_eq!(v.row_id, 7);
        assert_eq!(v.category, "ALIMENTACIÓN");
        assert_eq!(v.subcategory, "FARMACIA");
        assert_eq!(v.valid_subcategories, vec!["ONLINE", "SUPERMERCADO"]);
    }

    #[test]
    fn test_valid_edits() {
        let config = test_config();
        let edits = vec![
            Edit::new(1, "ALIMENTACIÓN", "ONLINE"),
            // New category: always allowed
            Edit::new(2, "MASCOTAS", "VETERINARIO"),
            Edit::new(3, "HOGAR", "SIN SUBCATEGORÍA"),
            Edit::new(4, "HOGAR", ""),
        ];
        let result = validate(&edits, &food_hierarchy(), &config.placeholders);
        assert!(result.ok);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_empty_batch_is_ok() {
        let config = test_config();
        assert!(validate(&[], &food_hierarchy(), &config.placeholders).ok);
    }

    #[test]
    fn test_every_violation_reported() {
        let config = test_config();
        let edits = vec![
            Edit::new(1, "ALIMENTACIÓN", "FARMACIA"),
            Edit::new(2, "ALIMENTACIÓN", "ONLINE"),
            Edit::new(3, "HOGAR", "JARDÍN"),
        ];
        let result = validate(&edits, &food_hierarchy(), &config.placeholders);
        assert!(!result.ok);
        let ids: Vec<_> = result.violations.iter().map(|v| v.row_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let config = test_config();
        let mut corpus = vec![
            uncategorized(1, "A", -1.0),
            uncategorized(2, "B", -1.0),
            uncategorized(3, "C", -1.0),
        ];
        let before = corpus.clone();
        let edits = vec![
            Edit::new(1, "ALIMENTACIÓN", "ONLINE"),
            Edit::new(2, "ALIMENTACIÓN", "FARMACIA"),
            Edit::new(3, "HOGAR", "LIMPIEZA"),
        ];

        let err = commit_edits(&mut corpus, &edits, &food_hierarchy(), &config).unwrap_err();
        match err {
            Error::EditsRejected(violations) => assert_eq!(violations.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(corpus, before);
    }

    #[test]
    fn test_commit_unknown_row_applies_nothing() {
        let config = test_config();
        let mut corpus = vec![uncategorized(1, "A", -1.0)];
        let before = corpus.clone();
        let edits = vec![
            Edit::new(1, "HOGAR", "LIMPIEZA"),
            Edit::new(99, "HOGAR", "LIMPIEZA"),
        ];

        let err = commit_edits(&mut corpus, &edits, &food_hierarchy(), &config).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(corpus, before);
    }

    #[test]
    fn test_commit_duplicate_row_id_applies_nothing() {
        let config = test_config();
        let mut corpus = vec![
            uncategorized(5, "A", -1.0),
            uncategorized(6, "B", -1.0),
            uncategorized(5, "C", -1.0),
        ];
        let before = corpus.clone();
        let edits = vec![
            Edit::new(6, "HOGAR", "LIMPIEZA"),
            Edit::new(5, "HOGAR", "LIMPIEZA"),
        ];

        let err = commit_edits(&mut corpus, &edits, &food_hierarchy(), &config).unwrap_err();
        match err {
            Error::InvalidData(msg) => assert!(msg.contains("rows 5")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(corpus, before);

        // Edits that avoid the repeated id still commit
        let edits = vec![Edit::new(6, "HOGAR", "LIMPIEZA")];
        let result = commit_edits(&mut corpus, &edits, &food_hierarchy(), &config).unwrap();
        assert_eq!(result.edits_applied, 1);
        assert_eq!(corpus[1].category, "HOGAR");
    }

    #[test]
    fn test_commit_counts_changed_fields() {
        let config = test_config();
        let mut corpus = vec![
            uncategorized(1, "A", -1.0),
            categorized(2, "B", -1.0, "HOGAR", "LIMPIEZA"),
        ];
        let edits = vec![
            Edit::new(1, "HOGAR", "LIMPIEZA"),
            Edit::new(2, "HOGAR", "LIMPIEZA"),
        ];

        let result = commit_edits(&mut corpus, &edits, &food_hierarchy(), &config).unwrap();
        assert_eq!(result.edits_applied, 2);
        assert_eq!(result.fields_changed, 2);
        assert_eq!(corpus[0].category, "HOGAR");
        assert_eq!(corpus[0].subcategory, "LIMPIEZA");
    }
}
