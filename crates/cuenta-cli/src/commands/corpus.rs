//! Corpus and edit files
//!
//! Corpus CSV header: `id,date,amount,merchant,description,account,type,category,subcategory`.
//! The `id` column is optional; rows without one are numbered from 1 in file order.
//! Malformed ids, dates and amounts never abort a read: a bad id falls back to
//! the row's position and bad dates and amounts are kept as absent values.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cuenta_core::{Edit, Transaction};

#[derive(Debug, Deserialize, Serialize)]
struct CorpusRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    amount: String,
    #[serde(default)]
    merchant: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    account: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    subcategory: String,
}

#[derive(Debug, Deserialize)]
struct EditRecord {
    id: i64,
    category: String,
    #[serde(default)]
    subcategory: String,
}

/// Read a corpus CSV file
pub fn read_corpus(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open corpus {}", path.display()))?;
    let corpus = read_corpus_from(file)
        .with_context(|| format!("Failed to read corpus {}", path.display()))?;
    debug!("Read {} rows from {}", corpus.len(), path.display());
    Ok(corpus)
}

pub fn read_corpus_from<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut corpus = Vec::new();
    let mut seen = HashSet::new();
    for (index, result) in rdr.deserialize::<CorpusRecord>().enumerate() {
        let record = result?;
        let id = parse_id(&record.id, index as i64 + 1);
        if !seen.insert(id) {
            warn!("Row id {} appears more than once; edits to it will be refused", id);
        }
        corpus.push(Transaction {
            id,
            date: parse_date(&record.date, id),
            amount: parse_amount(&record.amount, id),
            merchant: record.merchant,
            description: Some(record.description).filter(|d| !d.trim().is_empty()),
            account: record.account,
            kind: record.kind,
            category: record.category,
            subcategory: record.subcategory,
        });
    }

    Ok(corpus)
}

/// Write a corpus CSV file, always including the `id` column
pub fn write_corpus(path: &Path, corpus: &[Transaction]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_corpus_to(file, corpus)?;
    debug!("Wrote {} rows to {}", corpus.len(), path.display());
    Ok(())
}

pub fn write_corpus_to<W: Write>(writer: W, corpus: &[Transaction]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for tx in corpus {
        wtr.serialize(CorpusRecord {
            id: tx.id.to_string(),
            date: tx
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            amount: tx.amount.map(|a| a.to_string()).unwrap_or_default(),
            merchant: tx.merchant.clone(),
            description: tx.description.clone().unwrap_or_default(),
            account: tx.account.clone(),
            kind: tx.kind.clone(),
            category: tx.category.clone(),
            subcategory: tx.subcategory.clone(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read an edits CSV file (`id,category,subcategory`)
pub fn read_edits(path: &Path) -> Result<Vec<Edit>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open edits {}", path.display()))?;
    read_edits_from(file).with_context(|| format!("Failed to read edits {}", path.display()))
}

pub fn read_edits_from<R: Read>(reader: R) -> Result<Vec<Edit>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut edits = Vec::new();
    for result in rdr.deserialize::<EditRecord>() {
        let record = result?;
        edits.push(Edit::new(record.id, record.category, record.subcategory));
    }
    Ok(edits)
}

/// Parse a row id, falling back to the 1-based file position
pub fn parse_id(s: &str, position: i64) -> i64 {
    let s = s.trim();
    if s.is_empty() {
        return position;
    }
    match s.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            warn!("Row {}: unable to parse id '{}', using its position", position, s);
            position
        }
    }
}

/// Parse a date in one of the common ledger formats
pub fn parse_date(s: &str, row_id: i64) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%d/%m/%y", // 15/01/24, before %Y which would read "24" as year 24
        "%d/%m/%Y", // 15/01/2024
        "%d-%m-%Y", // 15-01-2024
    ];
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    warn!("Row {}: unable to parse date '{}'", row_id, s);
    None
}

/// Parse an amount, accepting a decimal comma and thousands separators
pub fn parse_amount(s: &str, row_id: i64) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let canonical = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // 1.234,56
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        // 1,234.56
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // 12,5
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    match canonical.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Some(amount),
        _ => {
            warn!("Row {}: unable to parse amount '{}'", row_id, s);
            None
        }
    }
}
