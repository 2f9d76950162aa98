//! Integration tests for cuenta-core
//!
//! These tests exercise the full learn → suggest → apply → edit workflow
//! through the public engine API.

use cuenta_core::{
    apply_structural, category_options, derive_merchant_map, subcategory_options, CommitResult,
    Edit, Engine, EngineConfig, Error, SuggestionSource, Transaction,
};

const NO_CATEGORY: &str = "SIN CATEGORÍA";
const NO_SUBCATEGORY: &str = "SIN SUBCATEGORÍA";

fn engine() -> Engine {
    Engine::new(EngineConfig::embedded().expect("embedded config")).expect("engine")
}

fn row(id: i64, merchant: &str, description: &str, amount: f64, category: &str, subcategory: &str) -> Transaction {
    Transaction {
        id,
        amount: Some(amount),
        merchant: merchant.to_string(),
        description: Some(description.to_string()),
        account: "ES91 2100 0418 4502 0005 1332".to_string(),
        kind: "GASTO".to_string(),
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        ..Default::default()
    }
}

fn pending(id: i64, merchant: &str, description: &str, amount: f64) -> Transaction {
    row(id, merchant, description, amount, NO_CATEGORY, NO_SUBCATEGORY)
}

/// A small household ledger: history plus a few uncategorized rows
fn household_ledger() -> Vec<Transaction> {
    let mut rows = vec![
        row(1, "", "NETFLIX.COM 866-579", -12.99, "SUSCRIPCIONES", "NETFLIX"),
        row(2, "", "NETFLIX.COM 866-580", -12.99, "SUSCRIPCIONES", "NETFLIX"),
        row(3, "", "NETFLIX.COM 866-581", -13.99, "SUSCRIPCIONES", "NETFLIX"),
        row(4, "CARREFOUR", "CARREFOUR EXPRESS 0912", -23.40, "ALIMENTACIÓN", "SUPERMERCADO"),
        row(5, "CARREFOUR", "CARREFOUR EXPRESS 0912", -18.10, "ALIMENTACIÓN", "SUPERMERCADO"),
        row(6, "CARREFOUR", "CARREFOUR MARKET", -61.75, "ALIMENTACIÓN", "ONLINE"),
        row(7, "CARREFOUR", "CARREFOUR ONLINE", -44.00, "ALIMENTACIÓN", "ONLINE"),
        row(8, "CARREFOUR", "CARREFOUR HOGAR", -15.00, "HOGAR", "MENAJE"),
        row(9, "", "GIMNASIO BASICFIT", -29.99, "SALUD", "DEPORTE"),
    ];

    let mut transfer = row(10, "", "TRASPASO CUENTA AHORRO", -300.0, NO_CATEGORY, NO_SUBCATEGORY);
    transfer.kind = "TRANSFERENCIA".to_string();
    rows.push(transfer);

    rows.push(pending(11, "", "MERCADONA MADRID 12345", -54.20));
    rows.push(pending(12, "", "NETFLIX MENSUALIDAD", -99.0));
    rows.push(pending(13, "CARREFOUR", "COMPRA TARJETA 4411", -7.30));
    rows.push(pending(14, "", "ZZZ", -1.0));
    rows
}

// =============================================================================
// Suggestion Workflow Tests
// =============================================================================

#[test]
fn test_rule_stage_for_supermarket_chain() {
    let engine = engine();
    engine.rebuild(&household_ledger()).unwrap();

    let tx = pending(100, "", "MERCADONA MADRID 12345", -54.20);
    let suggestion = engine.suggest(&tx).unwrap().expect("suggestion");

    assert_eq!(suggestion.category, "ALIMENTACIÓN");
    assert_eq!(suggestion.subcategory, "SUPERMERCADO");
    assert_eq!(suggestion.source, SuggestionSource::Rule);
}

#[test]
fn test_keyword_stage_learns_from_history() {
    let engine = engine();
    engine.rebuild(&household_ledger()).unwrap();

    let tx = pending(100, "", "NETFLIX MENSUALIDAD", -99.0);
    let suggestion = engine.suggest(&tx).unwrap().expect("suggestion");

    assert_eq!(suggestion.category, "SUSCRIPCIONES");
    assert_eq!(suggestion.subcategory, "NETFLIX");
    assert_eq!(suggestion.source, SuggestionSource::Keyword);
}

#[test]
fn test_merchant_majority_category() {
    let config = EngineConfig::embedded().unwrap();
    let merchants = derive_merchant_map(&household_ledger(), &config);
    assert_eq!(merchants.category_for("CARREFOUR"), Some("ALIMENTACIÓN"));

    // The merchant stage picks the smallest known subcategory of the category
    let engine = engine();
    engine.rebuild(&household_ledger()).unwrap();
    let tx = pending(100, "CARREFOUR", "COMPRA TARJETA 4411", -7.30);
    let suggestion = engine.suggest(&tx).unwrap().expect("suggestion");
    assert_eq!(suggestion.category, "ALIMENTACIÓN");
    assert_eq!(suggestion.subcategory, "ONLINE");
    assert_eq!(suggestion.source, SuggestionSource::Merchant);
}

#[test]
fn test_no_history_no_rule_gives_nothing() {
    let engine = engine();
    engine.rebuild(&[]).unwrap();

    let tx = pending(1, "", "ZZZ QWERTY 998877", -4.0);
    assert!(engine.suggest(&tx).unwrap().is_none());
}

#[test]
fn test_apply_suggestions_to_ledger() {
    let engine = engine();
    let mut ledger = household_ledger();

    let structural = apply_structural(&mut ledger, engine.config());
    assert_eq!(structural, 1);
    assert_eq!(ledger[9].category, "TRANSFERENCIAS");

    engine.rebuild(&ledger).unwrap();
    let result = engine.apply_suggestions(&mut ledger).unwrap();

    assert_eq!(result.rows_considered, 4);
    assert_eq!(result.rows_updated, 3);
    assert_eq!(result.by_rule, 1);
    assert_eq!(result.by_keyword, 1);
    assert_eq!(result.by_merchant, 1);
    assert_eq!(result.no_suggestion, 1);

    assert_eq!(ledger[10].category, "ALIMENTACIÓN");
    assert_eq!(ledger[11].category, "SUSCRIPCIONES");
    assert_eq!(ledger[12].category, "ALIMENTACIÓN");
    assert_eq!(ledger[13].category, NO_CATEGORY);

    // Categorized history is untouched
    assert_eq!(ledger[7].category, "HOGAR");
    assert_eq!(ledger[7].subcategory, "MENAJE");
}

// =============================================================================
// Edit Validation Tests
// =============================================================================

#[test]
fn test_edit_outside_hierarchy_rejected() {
    let engine = engine();
    engine.rebuild(&household_ledger()).unwrap();

    let edits = vec![Edit::new(14, "ALIMENTACIÓN", "FARMACIA")];
    let result = engine.validate(&edits).unwrap();

    assert!(!result.ok);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(
        result.violations[0].valid_subcategories,
        vec!["ONLINE".to_string(), "SUPERMERCADO".to_string()]
    );
}

#[test]
fn test_commit_rejected_batch_leaves_ledger_untouched() {
    let engine = engine();
    let mut ledger = household_ledger();
    engine.rebuild(&ledger).unwrap();
    let before = ledger.clone();

    let edits = vec![
        Edit::new(14, "SALUD", "DEPORTE"),
        Edit::new(13, "ALIMENTACIÓN", "FARMACIA"),
    ];
    let err = engine.commit_edits(&mut ledger, &edits).unwrap_err();

    assert!(matches!(err, Error::EditsRejected(ref v) if v.len() == 1));
    assert_eq!(ledger, before);
}

#[test]
fn test_committed_edits_feed_next_rebuild() {
    let engine = engine();
    let mut ledger = household_ledger();
    engine.rebuild(&ledger).unwrap();

    // A brand-new category is always accepted
    let edits = vec![Edit::new(14, "MASCOTAS", "VETERINARIO")];
    let committed = engine.commit_edits(&mut ledger, &edits).unwrap();
    assert_eq!(
        committed,
        CommitResult {
            edits_applied: 1,
            fields_changed: 2
        }
    );

    let (snapshot, rebuilt) = engine.rebuild_if_changed(&ledger).unwrap();
    assert!(rebuilt);
    assert_eq!(snapshot.version, 2);
    assert!(snapshot.hierarchy.contains_category("MASCOTAS"));

    // Unchanged ledger: nothing to do
    let (snapshot, rebuilt) = engine.rebuild_if_changed(&ledger).unwrap();
    assert!(!rebuilt);
    assert_eq!(snapshot.version, 2);
}

// =============================================================================
// Editor Option Tests
// =============================================================================

#[test]
fn test_editor_options_exclude_placeholders() {
    let config = EngineConfig::embedded().unwrap();
    let ledger = household_ledger();

    let categories = category_options(&ledger, &config);
    assert_eq!(
        categories,
        vec!["ALIMENTACIÓN", "HOGAR", "SALUD", "SUSCRIPCIONES"]
    );
    let subcategories = subcategory_options(&ledger, &config);
    assert!(subcategories.contains(&"MENAJE".to_string()));
    assert!(!subcategories.contains(&NO_SUBCATEGORY.to_string()));
}

#[test]
fn test_snapshot_summary_serializes() {
    let engine = engine();
    let snapshot = engine.rebuild(&household_ledger()).unwrap();
    let summary = snapshot.summary();

    assert_eq!(summary.version, 1);
    assert_eq!(summary.categories, 4);
    assert_eq!(summary.merchants, 1);
    assert_eq!(summary.stats.rows_total, 14);
    assert_eq!(summary.stats.rows_eligible, 9);
    assert_eq!(summary.fingerprint.len(), 64);
}
