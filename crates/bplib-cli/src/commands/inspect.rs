//! Inspect command implementation.

use std::fs;
use std::path::Path;

use anyhow::Result;
use bplib::{PackEntry, decode_entry, header_len, read_pack_index_from_path};
use owo_colors::OwoColorize;

/// Print the pack header, optionally decoding the listed entries
pub fn run(pack: &Path, limit: usize, decode: bool) -> Result<()> {
    let entries = read_pack_index_from_path(pack)?;
    let file_len = fs::metadata(pack)?.len();
    let data_start = header_len(entries.len());

    println!("{}", pack.display().bold());
    println!("  Records:     {}", entries.len());
    println!("  File size:   {} bytes", file_len);
    println!("  Data region: 0x{:X}..0x{:X}", data_start, file_len);

    let stray = stray_offsets(&entries, data_start, file_len);
    if stray > 0 {
        println!(
            "  {}",
            format!("{} offsets point outside the data region", stray).yellow()
        );
    }

    if entries.is_empty() {
        return Ok(());
    }

    let data = if decode { Some(fs::read(pack)?) } else { None };

    println!();
    println!("=== Entries (first {}) ===", limit.min(entries.len()));
    for (i, entry) in entries.iter().take(limit).enumerate() {
        print!("  [{}] {} @ 0x{:08X}", i, entry.id.cyan(), entry.offset);
        match data.as_deref().map(|data| decode_entry(data, entry)) {
            None => println!(),
            Some(Ok(record)) => println!(" {} {}", record.kind().green(), record.name),
            Some(Err(e)) => println!(" {}", e.red()),
        }
    }

    Ok(())
}

/// Entries whose offset lands in the header or past the end of the file
fn stray_offsets(entries: &[PackEntry], data_start: usize, file_len: u64) -> usize {
    entries
        .iter()
        .filter(|e| (e.offset as usize) < data_start || u64::from(e.offset) >= file_len)
        .count()
}
