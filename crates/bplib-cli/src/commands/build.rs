//! Build command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bplib::{PackWriter, Record};

/// Write the records in a JSON array file to a new pack
pub fn run(input: &Path, output: &Path) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let records: Vec<Record> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse records from {}", input.display()))?;

    let mut writer = PackWriter::new();
    for record in records {
        writer.push(record);
    }
    writer.write_file(output)?;

    println!("Pack saved to: {} ({} records)", output.display(), writer.len());
    Ok(())
}
