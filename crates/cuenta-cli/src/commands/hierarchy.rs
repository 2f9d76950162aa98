//! Derived structure listings (hierarchy, merchants)

use std::path::Path;

use anyhow::Result;
use cuenta_core::{category_options, subcategory_options};

use super::core::open_corpus;

pub fn cmd_hierarchy(config: Option<&Path>, file: &Path, options: bool) -> Result<()> {
    let (engine, corpus) = open_corpus(config, file)?;

    if options {
        let categories = category_options(&corpus, engine.config());
        let subcategories = subcategory_options(&corpus, engine.config());
        print_options("Category options", &categories);
        print_options("Subcategory options", &subcategories);
        return Ok(());
    }

    let snapshot = engine.rebuild(&corpus)?;

    if snapshot.hierarchy.is_empty() {
        println!("No categorized rows to derive a hierarchy from.");
        return Ok(());
    }

    println!();
    println!("🗂️  Categories");
    println!("   ─────────────────────────────────────────────");
    for (category, subcategories) in snapshot.hierarchy.iter() {
        println!("   • {}", category);
        for sub in subcategories {
            println!("       - {}", sub);
        }
    }

    Ok(())
}

fn print_options(title: &str, values: &[String]) {
    println!();
    println!("📋 {} ({})", title, values.len());
    println!("   ─────────────────────────────────────────────");
    if values.is_empty() {
        println!("   (none)");
    }
    for value in values {
        println!("   {}", value);
    }
}

pub fn cmd_merchants(config: Option<&Path>, file: &Path) -> Result<()> {
    let (engine, corpus) = open_corpus(config, file)?;
    let snapshot = engine.rebuild(&corpus)?;

    if snapshot.merchants.is_empty() {
        println!("No merchants with categorized history.");
        return Ok(());
    }

    println!();
    println!("🏪 Merchant defaults");
    println!("   ─────────────────────────────────────────────");
    for (merchant, category) in snapshot.merchants.iter() {
        println!("   {:<30} → {}", merchant, category);
    }

    Ok(())
}
