//! Parallel bulk load of a blueprint pack.
//!
//! The header is read up front. Entries are then split into contiguous
//! partitions, one per worker thread. Each worker opens its own handle to
//! the pack, reads it into memory, and decodes its partition into a slot
//! segment that only it can write. Once every worker has been joined the
//! slots are merged into the [`BlueprintIndex`] and the gate is marked ready.
//!
//! Nothing below `ParallelLoader::open` is fatal: a record that fails to
//! decode is left out, and a worker that dies leaves the rest of its
//! partition empty.

mod gate;
mod partition;

use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

pub use gate::*;
pub use partition::*;

use crate::config::{LoaderConfig, ThrottlePolicy};
use crate::error::{DecodeError, Result, WorkerError};
use crate::index::BlueprintIndex;
use crate::pack::{PackEntry, decode_entry, read_pack_index_from_path};
use crate::record::Record;

/// Decodes the record behind one header entry
pub type DecodeFn = fn(&[u8], &PackEntry) -> std::result::Result<Record, DecodeError>;

/// Summary of a finished bulk load
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub started_at: DateTime<Utc>,
    /// Entries listed in the pack header
    pub entries: usize,
    /// Records decoded successfully
    pub decoded: usize,
    pub decode_failures: usize,
    pub failed_workers: usize,
    /// Records added to the index by the merge
    pub inserted: usize,
    /// Decoded records whose identifier was already indexed
    pub duplicates: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct WorkerStats {
    decoded: usize,
    failed: usize,
}

pub struct ParallelLoader {
    path: PathBuf,
    entries: Vec<PackEntry>,
    workers: usize,
    throttle: ThrottlePolicy,
    decode: DecodeFn,
}

impl ParallelLoader {
    /// Read the pack header. Fails on I/O errors or a malformed header.
    pub fn open<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();
        let entries = read_pack_index_from_path(&path)?;

        Ok(Self {
            path,
            entries,
            workers: config.workers,
            throttle: config.throttle,
            decode: decode_entry,
        })
    }

    /// Replace the per-entry decoder (defaults to [`decode_entry`])
    pub fn with_decoder(mut self, decode: DecodeFn) -> Self {
        self.decode = decode;
        self
    }

    pub fn entries(&self) -> &[PackEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the load on a background thread.
    pub fn spawn(
        self,
        index: Arc<BlueprintIndex>,
        gate: Arc<ReadinessGate>,
    ) -> std::io::Result<JoinHandle<LoadReport>> {
        thread::Builder::new()
            .name("bplib-loader".to_string())
            .spawn(move || self.run(&index, &gate))
    }

    /// Decode every entry, merge into `index`, and mark `gate` ready.
    pub fn run(self, index: &BlueprintIndex, gate: &ReadinessGate) -> LoadReport {
        let started_at = Utc::now();
        let timer = Instant::now();

        gate.advance(LoadState::Loading);
        info!("Loading {} blueprints", self.entries.len());

        let (slots, stats, failed_workers) = self.decode_all();
        debug!(
            "Workers decoded {} blueprints, merging into index",
            stats.decoded
        );

        gate.advance(LoadState::Merging);
        let (decoded, inserted) = merge_slots(slots, index);

        let report = LoadReport {
            started_at,
            entries: self.entries.len(),
            decoded,
            decode_failures: stats.failed,
            failed_workers,
            inserted,
            duplicates: decoded - inserted,
            elapsed: timer.elapsed(),
        };

        gate.advance(LoadState::Ready);
        info!(
            "Finished loading {} blueprints in {:?} ({} failed to decode, {} workers failed)",
            report.entries, report.elapsed, report.decode_failures, report.failed_workers
        );
        report
    }

    fn decode_all(&self) -> (Vec<Option<Record>>, WorkerStats, usize) {
        let plan = plan_partitions(self.entries.len(), self.workers);
        let mut slots: Vec<Option<Record>> = Vec::with_capacity(self.entries.len());
        slots.resize_with(self.entries.len(), || None);

        let mut stats = WorkerStats::default();
        let mut failed_workers = 0;

        thread::scope(|scope| {
            let spawned: Vec<_> = split_by_plan(&mut slots, &plan)
                .into_iter()
                .zip(plan.iter().cloned())
                .enumerate()
                .map(|(worker, (segment, range))| {
                    let job = WorkerJob {
                        worker,
                        path: &self.path,
                        first_index: range.start,
                        entries: &self.entries[range],
                        throttle: self.throttle,
                        decode: self.decode,
                    };
                    let handle = thread::Builder::new()
                        .name(format!("bplib-worker-{}", worker))
                        .spawn_scoped(scope, move || job.run(segment));
                    (worker, handle)
                })
                .collect();

            for (worker, handle) in spawned {
                let outcome = match handle {
                    Ok(handle) => handle.join().unwrap_or_else(|payload| {
                        Err(WorkerError::Panicked {
                            worker,
                            message: panic_message(payload.as_ref()),
                        })
                    }),
                    Err(source) => Err(WorkerError::Io { worker, source }),
                };

                match outcome {
                    Ok(worker_stats) => {
                        stats.decoded += worker_stats.decoded;
                        stats.failed += worker_stats.failed;
                    }
                    Err(e) => {
                        error!("Blueprint load worker failed: {}", e);
                        failed_workers += 1;
                    }
                }
            }
        });

        (slots, stats, failed_workers)
    }
}

/// One worker's share of the load
struct WorkerJob<'a> {
    worker: usize,
    path: &'a Path,
    /// Global index of `entries[0]`
    first_index: usize,
    entries: &'a [PackEntry],
    throttle: ThrottlePolicy,
    decode: DecodeFn,
}

impl WorkerJob<'_> {
    fn run(self, slots: &mut [Option<Record>]) -> std::result::Result<WorkerStats, WorkerError> {
        let worker = self.worker;
        info!("{}: Loading {} blueprints", worker, self.entries.len());

        let data = fs::read(self.path).map_err(|source| WorkerError::Io { worker, source })?;

        let mut stats = WorkerStats::default();
        for (i, (entry, slot)) in self.entries.iter().zip(slots.iter_mut()).enumerate() {
            match (self.decode)(&data, entry) {
                Ok(record) => {
                    *slot = Some(record);
                    stats.decoded += 1;
                }
                Err(e) => {
                    warn!(
                        "{}: Failed to decode blueprint {} (index {}, offset {:#x}): {}",
                        worker,
                        entry.id,
                        self.first_index + i,
                        entry.offset,
                        e
                    );
                    stats.failed += 1;
                }
            }

            if self.throttle.should_pause(i) {
                thread::sleep(self.throttle.pause());
            }
        }

        info!("{}: Done loading blueprints", worker);
        Ok(stats)
    }
}

/// Insert every present slot into the index. Returns `(present, inserted)`.
fn merge_slots(slots: Vec<Option<Record>>, index: &BlueprintIndex) -> (usize, usize) {
    let mut present = 0;
    let mut inserted = 0;

    for record in slots.into_iter().flatten() {
        present += 1;
        let id = record.id;
        if index.insert_if_absent(id, Arc::new(record)) {
            inserted += 1;
        } else {
            debug!("Blueprint {} already indexed, keeping existing record", id);
        }
    }

    (present, inserted)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::PackWriter;
    use crate::record::{Identifier, Localized, RecordBody};
    use tempfile::TempDir;

    fn config(workers: usize) -> LoaderConfig {
        LoaderConfig::builder()
            .workers(workers)
            .throttle(ThrottlePolicy::disabled())
            .build()
    }

    fn feat(n: u128) -> Record {
        Record::new(
            Identifier::from_u128(n),
            format!("Feat{}", n),
            RecordBody::UnitFact(Localized::new(Some(&format!("Feat {}", n)), None)),
        )
    }

    fn write_pack(writer: &PackWriter) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blueprints-pack.bbp");
        writer.write_file(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_all_records() {
        let mut writer = PackWriter::new();
        for n in 0..37 {
            writer.push(feat(n));
        }
        let (_dir, path) = write_pack(&writer);

        let index = BlueprintIndex::new();
        let gate = ReadinessGate::new();
        let loader = ParallelLoader::open(&path, &config(4)).unwrap();
        assert_eq!(loader.entries().len(), 37);

        let report = loader.run(&index, &gate);
        assert!(gate.is_ready());
        assert_eq!(report.entries, 37);
        assert_eq!(report.decoded, 37);
        assert_eq!(report.inserted, 37);
        assert_eq!(report.decode_failures, 0);
        assert_eq!(report.failed_workers, 0);
        assert_eq!(index.len(), 37);
        assert_eq!(
            index.get(&Identifier::from_u128(36)).unwrap().name,
            "Feat36"
        );
    }

    #[test]
    fn test_decode_failure_leaves_slot_empty() {
        let mut writer = PackWriter::new();
        writer.push(feat(1));
        writer.push_raw(Identifier::from_u128(2), vec![0x42, 0x00]);
        writer.push(feat(3));
        let (_dir, path) = write_pack(&writer);

        let index = BlueprintIndex::new();
        let gate = ReadinessGate::new();
        let report = ParallelLoader::open(&path, &config(2))
            .unwrap()
            .run(&index, &gate);

        assert_eq!(report.decoded, 2);
        assert_eq!(report.decode_failures, 1);
        assert!(index.contains(&Identifier::from_u128(1)));
        assert!(!index.contains(&Identifier::from_u128(2)));
        assert!(index.contains(&Identifier::from_u128(3)));
    }

    #[test]
    fn test_merge_keeps_existing_records() {
        let mut writer = PackWriter::new();
        writer.push(feat(1)).push(feat(2));
        let (_dir, path) = write_pack(&writer);

        let index = BlueprintIndex::new();
        let early = Arc::new(Record::new(
            Identifier::from_u128(1),
            "CachedByHost",
            RecordBody::Other,
        ));
        index.insert_if_absent(early.id, Arc::clone(&early));

        let gate = ReadinessGate::new();
        let report = ParallelLoader::open(&path, &config(4))
            .unwrap()
            .run(&index, &gate);

        assert_eq!(report.decoded, 2);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(
            index.get(&Identifier::from_u128(1)).unwrap().name,
            "CachedByHost"
        );
    }

    #[test]
    fn test_empty_pack_becomes_ready() {
        let (_dir, path) = write_pack(&PackWriter::new());
        let index = BlueprintIndex::new();
        let gate = ReadinessGate::new();

        let report = ParallelLoader::open(&path, &config(4))
            .unwrap()
            .run(&index, &gate);
        assert_eq!(report.entries, 0);
        assert!(gate.is_ready());
        assert!(index.is_empty());
    }

    #[test]
    fn test_missing_pack_file_is_fatal_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let result = ParallelLoader::open(dir.path().join("missing.bbp"), &config(4));
        assert!(result.err().unwrap().is_not_found());
    }

    #[test]
    fn test_worker_io_failure_is_not_fatal() {
        let mut writer = PackWriter::new();
        writer.push(feat(1));
        let (dir, path) = write_pack(&writer);

        let loader = ParallelLoader::open(&path, &config(4)).unwrap();
        // Workers open their own handles; remove the file after the header is read
        std::fs::remove_file(&path).unwrap();

        let index = BlueprintIndex::new();
        let gate = ReadinessGate::new();
        let report = loader.run(&index, &gate);
        drop(dir);

        assert!(gate.is_ready());
        assert_eq!(report.failed_workers, 4);
        assert!(index.is_empty());
    }

    #[test]
    fn test_spawn_runs_in_background() {
        let mut writer = PackWriter::new();
        for n in 0..8 {
            writer.push(feat(n));
        }
        let (_dir, path) = write_pack(&writer);

        let index = Arc::new(BlueprintIndex::new());
        let gate = Arc::new(ReadinessGate::new());
        let handle = ParallelLoader::open(&path, &config(4))
            .unwrap()
            .spawn(Arc::clone(&index), Arc::clone(&gate))
            .unwrap();

        let report = handle.join().unwrap();
        assert!(gate.is_ready());
        assert_eq!(report.inserted, 8);
        assert_eq!(index.len(), 8);
    }

    /// Decodes normally except for identifier 7, which panics mid-partition
    fn decode_panicking_on_seven(
        data: &[u8],
        entry: &PackEntry,
    ) -> std::result::Result<Record, DecodeError> {
        if entry.id == Identifier::from_u128(7) {
            panic!("corrupt blueprint 7");
        }
        decode_entry(data, entry)
    }

    #[test]
    fn test_failed_worker_only_loses_rest_of_its_partition() {
        // 12 entries over 4 workers: [0,3) [3,6) [6,9) [9,12)
        let mut writer = PackWriter::new();
        for n in 0..12 {
            writer.push(feat(n));
        }
        let (_dir, path) = write_pack(&writer);

        let index = BlueprintIndex::new();
        let gate = ReadinessGate::new();
        let report = ParallelLoader::open(&path, &config(4))
            .unwrap()
            .with_decoder(decode_panicking_on_seven)
            .run(&index, &gate);

        assert!(gate.is_ready());
        assert_eq!(report.failed_workers, 1);
        assert_eq!(report.decode_failures, 0);
        assert_eq!(report.decoded, 10);
        assert_eq!(report.inserted, 10);

        // Slot before the failure survives, the rest of that partition is gone
        assert!(index.contains(&Identifier::from_u128(6)));
        assert!(!index.contains(&Identifier::from_u128(7)));
        assert!(!index.contains(&Identifier::from_u128(8)));

        for n in (0..6).chain(9..12) {
            assert!(index.contains(&Identifier::from_u128(n)), "missing {}", n);
        }
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
