//! Search command implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use bplib::{
    BlueprintLibrary, LoadReport, LoaderConfig, Record, RecordKind, SearchField, SearchTarget,
    ThrottlePolicy,
};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::info;

use crate::cli::LoaderArgs;

/// Patterns requested on the command line
#[derive(Debug, Default)]
pub struct Queries {
    pub name: Option<String>,
    pub id: Option<String>,
    pub description: Option<String>,
}

impl Queries {
    /// Requested searches in a fixed order: name, id, description
    pub fn requested(&self) -> Vec<(SearchTarget, &str)> {
        [
            (SearchTarget::Name, &self.name),
            (SearchTarget::Id, &self.id),
            (SearchTarget::Description, &self.description),
        ]
        .into_iter()
        .filter_map(|(target, pattern)| pattern.as_deref().map(|p| (target, p)))
        .collect()
    }
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    load: &'a LoadReport,
    searches: Vec<SearchResult<'a>>,
}

#[derive(Serialize)]
struct SearchResult<'a> {
    target: SearchTarget,
    pattern: &'a str,
    elapsed_ms: u128,
    total: usize,
    results: &'a [Arc<Record>],
}

/// Load `pack`, wait for the index, and run every requested search
pub fn run(
    pack: &Path,
    queries: &Queries,
    kinds: &[RecordKind],
    limit: usize,
    json: bool,
    loader: &LoaderArgs,
) -> Result<()> {
    let searches = queries.requested();
    if searches.is_empty() {
        bail!("No search pattern specified. Use --name, --id, or --description");
    }

    let config = resolve_config(loader)?;
    let library = BlueprintLibrary::new(config);
    library
        .start_load(pack)
        .with_context(|| format!("Failed to start loading {}", pack.display()))?;

    while !library.wait_ready_timeout(Duration::from_secs(1)) {
        info!("Waiting for blueprints ({})", library.state());
    }
    let Some(report) = library.join() else {
        bail!("Blueprint loader did not produce a report");
    };

    let mut outcomes = Vec::with_capacity(searches.len());
    for (target, pattern) in searches {
        let matches = library.engine().query(target, pattern, kinds)?;

        let stopwatch = Instant::now();
        let results: Vec<Arc<Record>> = matches.iter().collect();
        let elapsed = stopwatch.elapsed();
        info!(
            "Search finished in {:?} with {} results",
            elapsed,
            results.len()
        );
        outcomes.push((target, pattern, elapsed, results));
    }

    if json {
        let output = SearchOutput {
            load: &report,
            searches: outcomes
                .iter()
                .map(|(target, pattern, elapsed, results)| SearchResult {
                    target: *target,
                    pattern,
                    elapsed_ms: elapsed.as_millis(),
                    total: results.len(),
                    results: &results[..results.len().min(limit)],
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Loaded {} blueprints in {:?} ({} failed to decode)",
        report.inserted, report.elapsed, report.decode_failures
    );
    for (target, pattern, elapsed, results) in &outcomes {
        println!();
        println!(
            "=== {} /{}/: {} results in {:?} ===",
            target.bold(),
            pattern,
            results.len(),
            elapsed
        );
        for record in results.iter().take(limit) {
            print_record(&library, record);
        }
        if results.len() > limit {
            println!("  {}", format!("... {} more", results.len() - limit).dimmed());
        }
    }

    Ok(())
}

fn print_record(library: &BlueprintLibrary, record: &Record) {
    let display_name = library
        .registry()
        .resolve(record, SearchField::DisplayName)
        .unwrap_or("");
    println!(
        "  {} {} - {} {}",
        record.id.cyan(),
        record.name,
        record.kind().green(),
        display_name.dimmed()
    );
}

/// Config file (or defaults) with command-line overrides applied
fn resolve_config(args: &LoaderArgs) -> Result<LoaderConfig> {
    let mut config = match &args.config {
        Some(path) => LoaderConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LoaderConfig::default(),
    };

    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.no_throttle {
        config.throttle = ThrottlePolicy::disabled();
    }
    if args.ignore_case {
        config.search.case_insensitive = true;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_order() {
        let queries = Queries {
            name: Some("Cleric".to_string()),
            id: None,
            description: Some("bonus".to_string()),
        };
        assert_eq!(
            queries.requested(),
            vec![
                (SearchTarget::Name, "Cleric"),
                (SearchTarget::Description, "bonus"),
            ]
        );
        assert!(Queries::default().requested().is_empty());
    }

    #[test]
    fn test_resolve_config_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bplib.toml");
        std::fs::write(&path, "workers = 2\n\n[throttle]\nevery = 5\n").unwrap();

        let args = LoaderArgs {
            config: Some(path),
            workers: None,
            no_throttle: false,
            ignore_case: true,
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.throttle.every, 5);
        assert!(config.search.case_insensitive);

        let args = LoaderArgs {
            workers: Some(8),
            no_throttle: true,
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.workers, 8);
        assert!(!config.throttle.is_enabled());
    }

    #[test]
    fn test_resolve_config_rejects_zero_workers() {
        let args = LoaderArgs {
            workers: Some(0),
            ..Default::default()
        };
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_run_against_written_pack() {
        use bplib::{Identifier, Localized, PackWriter, RecordBody};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blueprints-pack.bbp");
        let mut writer = PackWriter::new();
        writer.push(Record::new(
            Identifier::from_u128(1),
            "ClericClass",
            RecordBody::CharacterClass(Localized::new(Some("Cleric"), None)),
        ));
        writer.write_file(&path).unwrap();

        let queries = Queries {
            name: Some("cleric".to_string()),
            ..Default::default()
        };
        let args = LoaderArgs {
            no_throttle: true,
            ignore_case: true,
            ..Default::default()
        };
        run(&path, &queries, &[], 10, false, &args).unwrap();
        run(&path, &queries, &[RecordKind::Item], 10, true, &args).unwrap();
    }

    #[test]
    fn test_run_requires_a_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            &dir.path().join("blueprints-pack.bbp"),
            &Queries::default(),
            &[],
            10,
            false,
            &LoaderArgs::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("No search pattern"));
    }
}
