//! Pattern search over the blueprint index.
//!
//! Three targets are searchable:
//!
//! - **Id**: the identifier's canonical string form
//! - **Name**: the raw internal name, or the kind's display-name field
//! - **Description**: the kind's description field
//!
//! Display-name and description fields are looked up through a
//! [`FieldRegistry`]. Every hit is re-resolved through a [`RecordResolver`]
//! so callers get the host's canonical object, not the loader's decoded copy.

use std::collections::HashSet;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::config::MatchOptions;
use crate::error::Result;
use crate::index::BlueprintIndex;
use crate::loader::ReadinessGate;
use crate::record::{FieldRegistry, Identifier, Record, RecordKind, SearchField};

/// Source of canonical records for search results
pub trait RecordResolver: Send + Sync {
    fn resolve(&self, id: &Identifier) -> Option<Arc<Record>>;
}

impl<F> RecordResolver for F
where
    F: Fn(&Identifier) -> Option<Arc<Record>> + Send + Sync,
{
    fn resolve(&self, id: &Identifier) -> Option<Arc<Record>> {
        self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchTarget {
    Id,
    Name,
    Description,
}

#[derive(Clone, Copy)]
pub struct SearchEngine<'a> {
    index: &'a BlueprintIndex,
    gate: &'a ReadinessGate,
    registry: &'a FieldRegistry,
    resolver: &'a dyn RecordResolver,
    options: MatchOptions,
}

impl<'a> SearchEngine<'a> {
    pub fn new(
        index: &'a BlueprintIndex,
        gate: &'a ReadinessGate,
        registry: &'a FieldRegistry,
        resolver: &'a dyn RecordResolver,
        options: MatchOptions,
    ) -> Self {
        Self {
            index,
            gate,
            registry,
            resolver,
            options,
        }
    }

    /// Records whose canonical identifier string matches `pattern`
    pub fn search_by_id(&self, pattern: &str, kinds: &[RecordKind]) -> Result<Matches<'a>> {
        self.query(SearchTarget::Id, pattern, kinds)
    }

    /// Records whose internal name or display name matches `pattern`
    pub fn search_by_name(&self, pattern: &str, kinds: &[RecordKind]) -> Result<Matches<'a>> {
        self.query(SearchTarget::Name, pattern, kinds)
    }

    /// Records whose description matches `pattern`
    pub fn search_by_description(
        &self,
        pattern: &str,
        kinds: &[RecordKind],
    ) -> Result<Matches<'a>> {
        self.query(SearchTarget::Description, pattern, kinds)
    }

    /// Build a query. An empty `kinds` slice accepts every kind.
    ///
    /// Fails only if `pattern` is not a valid regex.
    pub fn query(
        &self,
        target: SearchTarget,
        pattern: &str,
        kinds: &[RecordKind],
    ) -> Result<Matches<'a>> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(self.options.case_insensitive)
            .build()?;

        Ok(Matches {
            engine: *self,
            target,
            regex,
            kinds: kinds.iter().copied().collect(),
        })
    }
}

/// A compiled query.
///
/// Nothing is evaluated until iteration, and every call to [`Matches::iter`]
/// scans the index afresh. Before the bulk load is ready every iteration
/// is empty.
pub struct Matches<'a> {
    engine: SearchEngine<'a>,
    target: SearchTarget,
    regex: Regex,
    kinds: HashSet<RecordKind>,
}

impl<'a> Matches<'a> {
    pub fn target(&self) -> SearchTarget {
        self.target
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn iter(&self) -> impl Iterator<Item = Arc<Record>> + '_ {
        let snapshot = if self.engine.gate.is_ready() {
            self.engine.index.values()
        } else {
            Vec::new()
        };

        snapshot
            .into_iter()
            .filter(|record| self.accepts_kind(record.kind()))
            .filter(|record| self.is_match(record))
            .filter_map(|record| self.resolve(&record.id))
    }

    fn accepts_kind(&self, kind: RecordKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }

    fn is_match(&self, record: &Record) -> bool {
        match self.target {
            SearchTarget::Id => self.regex.is_match(&record.id.canonical()),
            SearchTarget::Name => {
                self.regex.is_match(&record.name)
                    || self.field_matches(record, SearchField::DisplayName)
            }
            SearchTarget::Description => self.field_matches(record, SearchField::Description),
        }
    }

    fn field_matches(&self, record: &Record, field: SearchField) -> bool {
        self.engine
            .registry
            .resolve(record, field)
            .is_some_and(|value| self.regex.is_match(value))
    }

    fn resolve(&self, id: &Identifier) -> Option<Arc<Record>> {
        let resolved = self.engine.resolver.resolve(id);
        if resolved.is_none() {
            debug!("Search hit {} has no canonical record, skipping", id);
        }
        resolved
    }
}

impl<'m> IntoIterator for &'m Matches<'_> {
    type Item = Arc<Record>;
    type IntoIter = Box<dyn Iterator<Item = Arc<Record>> + 'm>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
