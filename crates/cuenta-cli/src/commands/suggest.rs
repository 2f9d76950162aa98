//! Suggestion commands (suggest, apply, test)

use std::path::Path;

use anyhow::Result;
use cuenta_core::{apply_structural, Suggestion};
use serde::Serialize;

use super::core::{open_corpus, open_engine};
use super::corpus::{read_corpus, write_corpus};
use super::truncate;

/// One uncategorized row and what the engine would assign
#[derive(Debug, Serialize)]
pub struct SuggestionRow {
    pub id: i64,
    pub merchant: String,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub suggestion: Option<Suggestion>,
}

pub fn cmd_suggest(config: Option<&Path>, file: &Path, json: bool) -> Result<()> {
    let (engine, mut corpus) = open_corpus(config, file)?;
    apply_structural(&mut corpus, engine.config());
    let snapshot = engine.rebuild(&corpus)?;
    let suggester = engine.suggester(&snapshot);

    let rows: Vec<SuggestionRow> = corpus
        .iter()
        .filter(|tx| engine.config().is_placeholder_category(&tx.category))
        .map(|tx| SuggestionRow {
            id: tx.id,
            merchant: tx.merchant.clone(),
            description: tx.description.clone(),
            amount: tx.amount,
            suggestion: suggester.suggest(tx),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No uncategorized rows.");
        return Ok(());
    }

    let found = rows.iter().filter(|r| r.suggestion.is_some()).count();
    println!();
    println!("💡 Suggestions ({} of {} uncategorized rows)", found, rows.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for row in &rows {
        let desc = truncate(row.description.as_deref().unwrap_or("-"), 36);
        match &row.suggestion {
            Some(s) => println!(
                "   #{:<5} {:<36} → {} / {} ({})",
                row.id, desc, s.category, s.subcategory, s.source
            ),
            None => println!("   #{:<5} {:<36} → (no suggestion)", row.id, desc),
        }
    }

    Ok(())
}

pub fn cmd_apply(config: Option<&Path>, file: &Path, output: &Path) -> Result<()> {
    let (engine, mut corpus) = open_corpus(config, file)?;

    let structural = apply_structural(&mut corpus, engine.config());
    engine.rebuild(&corpus)?;
    let result = engine.apply_suggestions(&mut corpus)?;
    write_corpus(output, &corpus)?;

    println!("✅ Categorized {} of {} uncategorized rows", result.rows_updated, result.rows_considered);
    println!("   Structural:      {}", structural);
    println!("   By merchant:     {}", result.by_merchant);
    println!("   By rule:         {}", result.by_rule);
    println!("   By amount+word:  {}", result.by_amount_keyword);
    println!("   By keyword:      {}", result.by_keyword);
    println!("   No suggestion:   {}", result.no_suggestion);
    println!("   Written to {}", output.display());

    Ok(())
}

pub fn cmd_test(
    config: Option<&Path>,
    file: Option<&Path>,
    description: &str,
    merchant: Option<&str>,
    amount: Option<f64>,
) -> Result<()> {
    let engine = open_engine(config)?;
    let snapshot = match file {
        Some(file) => engine.rebuild(&read_corpus(file)?)?,
        None => engine.snapshot()?,
    };

    match engine
        .suggester(&snapshot)
        .test_assignment(description, merchant, amount)
    {
        Some(s) => println!(
            "'{}' → {} / {} (via {})",
            description, s.category, s.subcategory, s.source
        ),
        None => println!("'{}' → no suggestion", description),
    }

    Ok(())
}
