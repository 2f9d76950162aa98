//! Shared engine setup and the learn command

use std::path::Path;

use anyhow::{Context, Result};
use cuenta_core::{Engine, EngineConfig, Transaction};

use super::corpus::read_corpus;

/// Build an engine from the resolved configuration
pub fn open_engine(config: Option<&Path>) -> Result<Engine> {
    let config = EngineConfig::load(config).context("Failed to load engine config")?;
    let engine = Engine::new(config).context("Invalid engine config")?;
    Ok(engine)
}

/// Open the engine and read a corpus, without learning yet
pub fn open_corpus(config: Option<&Path>, file: &Path) -> Result<(Engine, Vec<Transaction>)> {
    let engine = open_engine(config)?;
    let corpus = read_corpus(file)?;
    Ok((engine, corpus))
}

pub fn cmd_learn(config: Option<&Path>, file: &Path) -> Result<()> {
    let (engine, corpus) = open_corpus(config, file)?;
    let snapshot = engine.rebuild(&corpus)?;
    let summary = snapshot.summary();

    println!();
    println!("📚 Knowledge v{}", summary.version);
    println!("   ─────────────────────────────────────────────");
    println!("   Rows:              {}", summary.stats.rows_total);
    println!(
        "   Learned from:      {} ({} without amount)",
        summary.stats.rows_eligible, summary.stats.rows_without_amount
    );
    println!("   Keywords:          {}", summary.stats.keywords);
    println!("   Amount keywords:   {}", summary.stats.amount_keywords);
    println!("   Categories:        {}", summary.categories);
    println!("   Merchants:         {}", summary.merchants);
    println!("   Rules:             {}", engine.rules().len());
    println!("   Fingerprint:       {}", &summary.fingerprint[..12]);

    Ok(())
}
