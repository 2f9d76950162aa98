//! Manual edit validation command

use std::path::Path;

use anyhow::Result;

use super::core::open_corpus;
use super::corpus::{read_edits, write_corpus};

pub fn cmd_validate(
    config: Option<&Path>,
    file: &Path,
    edits: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let (engine, mut corpus) = open_corpus(config, file)?;
    let edits = read_edits(edits)?;
    engine.rebuild(&corpus)?;

    let validation = engine.validate(&edits)?;
    if !validation.ok {
        println!("❌ {} of {} edits rejected", validation.violations.len(), edits.len());
        for v in &validation.violations {
            println!(
                "   #{:<5} {} / {} (valid: {})",
                v.row_id,
                v.category,
                v.subcategory,
                v.valid_subcategories.join(", ")
            );
        }
        anyhow::bail!("Edit batch rejected, nothing was applied");
    }

    let result = engine.commit_edits(&mut corpus, &edits)?;
    println!(
        "✅ {} edits valid ({} fields changed)",
        result.edits_applied, result.fields_changed
    );

    if let Some(output) = output {
        write_corpus(output, &corpus)?;
        println!("   Written to {}", output.display());
    }

    Ok(())
}
