//! The blueprint library service.
//!
//! One `BlueprintLibrary` is built by the integration layer at startup and
//! shared wherever searches are needed. It owns the index, the readiness
//! gate and the background loader.
//!
//! ## Example
//!
//! ```ignore
//! use bplib::{BlueprintLibrary, LoaderConfig};
//!
//! let library = BlueprintLibrary::new(LoaderConfig::default());
//! library.start_load("Bundles/blueprints-pack.bbp")?;
//!
//! // Host cache path, at any time
//! library.on_record_cached(id, record);
//!
//! // Empty until the load is ready
//! for record in library.search_by_name("(Cleric|EldritchHeritage)", &[])?.iter() {
//!     println!("{} - {}", record.name, record.kind());
//! }
//! ```

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::config::LoaderConfig;
use crate::error::{Error, Result};
use crate::index::BlueprintIndex;
use crate::loader::{LoadReport, LoadState, ParallelLoader, ReadinessGate};
use crate::record::{FieldRegistry, Identifier, Record, RecordKind};
use crate::search::{Matches, RecordResolver, SearchEngine};

pub struct BlueprintLibrary {
    index: Arc<BlueprintIndex>,
    gate: Arc<ReadinessGate>,
    config: LoaderConfig,
    registry: FieldRegistry,
    /// Canonical record source for search results
    resolver: Arc<dyn RecordResolver>,
    loader: Mutex<Option<JoinHandle<LoadReport>>>,
}

impl BlueprintLibrary {
    /// A library whose search results resolve through its own index
    pub fn new(config: LoaderConfig) -> Self {
        let index = Arc::new(BlueprintIndex::new());
        let resolver: Arc<dyn RecordResolver> = index.clone();
        Self::build(config, index, resolver)
    }

    /// A library whose search results resolve through the host's record cache
    pub fn with_resolver(config: LoaderConfig, resolver: Arc<dyn RecordResolver>) -> Self {
        Self::build(config, Arc::new(BlueprintIndex::new()), resolver)
    }

    fn build(
        config: LoaderConfig,
        index: Arc<BlueprintIndex>,
        resolver: Arc<dyn RecordResolver>,
    ) -> Self {
        Self {
            index,
            gate: Arc::new(ReadinessGate::new()),
            config,
            registry: FieldRegistry::standard(),
            resolver,
            loader: Mutex::new(None),
        }
    }

    /// Replace the display-name/description field table
    pub fn with_registry(mut self, registry: FieldRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn index(&self) -> &BlueprintIndex {
        &self.index
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Start the bulk load of `pack_path` in the background.
    ///
    /// The header is read before returning, so a missing file or malformed
    /// header is reported here and nothing is loaded. Everything after that
    /// happens on the loader thread; watch `is_ready()` for completion.
    pub fn start_load<P: AsRef<Path>>(&self, pack_path: P) -> Result<()> {
        let mut slot = self.loader.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() || self.gate.state() != LoadState::NotStarted {
            return Err(Error::AlreadyStarted);
        }

        info!("Starting Blueprint load from {}", pack_path.as_ref().display());
        let loader = ParallelLoader::open(pack_path, &self.config)?;
        let spawned = loader.spawn(Arc::clone(&self.index), Arc::clone(&self.gate));
        self.install(&mut slot, spawned)
    }

    /// Keep the loader handle and mark the load as running.
    ///
    /// A failed spawn leaves the gate at `NotStarted` so the load can be
    /// retried. The loader thread may already be past `Loading` by the time
    /// this runs; the gate only moves forward.
    fn install(
        &self,
        slot: &mut Option<JoinHandle<LoadReport>>,
        spawned: io::Result<JoinHandle<LoadReport>>,
    ) -> Result<()> {
        let handle = spawned?;
        self.gate.advance(LoadState::Loading);
        *slot = Some(handle);
        Ok(())
    }

    /// True once the bulk load has been merged into the index
    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn state(&self) -> LoadState {
        self.gate.state()
    }

    /// Block until the bulk load is ready. Returns immediately if no load
    /// was started.
    pub fn wait_ready(&self) {
        if self.gate.state() == LoadState::NotStarted {
            return;
        }
        self.gate.wait();
    }

    /// Wait up to `timeout` for the bulk load. Returns `true` if ready.
    pub fn wait_ready_timeout(&self, timeout: Duration) -> bool {
        self.gate.wait_timeout(timeout)
    }

    /// Wait for the loader thread and take its report.
    ///
    /// Returns `None` if no load was started or the report was already taken.
    pub fn join(&self) -> Option<LoadReport> {
        let handle = self
            .loader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;

        match handle.join() {
            Ok(report) => Some(report),
            Err(_) => {
                error!("Blueprint loader thread panicked");
                None
            }
        }
    }

    /// Ingestion hook for records the host caches on its own.
    ///
    /// Safe to call before, during or after the bulk load. Returns whether
    /// the record was added; an identifier already present is left alone.
    pub fn on_record_cached(&self, id: Identifier, record: Arc<Record>) -> bool {
        let inserted = self.index.insert_if_absent(id, record);
        if !inserted {
            debug!("Cached blueprint {} already indexed", id);
        }
        inserted
    }

    pub fn engine(&self) -> SearchEngine<'_> {
        SearchEngine::new(
            &self.index,
            &self.gate,
            &self.registry,
            self.resolver.as_ref(),
            self.config.search,
        )
    }

    pub fn search_by_id(&self, pattern: &str, kinds: &[RecordKind]) -> Result<Matches<'_>> {
        self.engine().search_by_id(pattern, kinds)
    }

    pub fn search_by_name(&self, pattern: &str, kinds: &[RecordKind]) -> Result<Matches<'_>> {
        self.engine().search_by_name(pattern, kinds)
    }

    pub fn search_by_description(
        &self,
        pattern: &str,
        kinds: &[RecordKind],
    ) -> Result<Matches<'_>> {
        self.engine().search_by_description(pattern, kinds)
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Default for BlueprintLibrary {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}
