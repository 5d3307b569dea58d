//! Per-kind field resolution for name and description searches.
//!
//! The registry maps each [`RecordKind`] to optional accessors for its
//! display name and description. Kinds without an entry, or with an empty
//! accessor, never match a search on that field.

use std::collections::HashMap;

use super::{Record, RecordBody, RecordKind};

/// Pulls one localized string out of a record
pub type FieldAccessor = fn(&Record) -> Option<&str>;

/// Searchable localized fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    DisplayName,
    Description,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldAccessors {
    pub display_name: Option<FieldAccessor>,
    pub description: Option<FieldAccessor>,
}

impl FieldAccessors {
    pub fn new(display_name: Option<FieldAccessor>, description: Option<FieldAccessor>) -> Self {
        Self {
            display_name,
            description,
        }
    }

    pub fn get(&self, field: SearchField) -> Option<FieldAccessor> {
        match field {
            SearchField::DisplayName => self.display_name,
            SearchField::Description => self.description,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    entries: HashMap<RecordKind, FieldAccessors>,
}

impl FieldRegistry {
    /// A registry with no kinds; nothing matches name or description searches.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The field table for the built-in kinds.
    pub fn standard() -> Self {
        let localized = FieldAccessors::new(Some(localized_name), Some(localized_description));

        let mut registry = Self::empty();
        for kind in [
            RecordKind::UnitFact,
            RecordKind::Archetype,
            RecordKind::AbilityResource,
            RecordKind::CharacterClass,
            RecordKind::Item,
            RecordKind::KingdomMoraleFlag,
        ] {
            registry.register(kind, localized);
        }
        registry.register(
            RecordKind::KingdomBuff,
            FieldAccessors::new(Some(kingdom_buff_name), Some(kingdom_buff_description)),
        );
        registry.register(
            RecordKind::KingdomEvent,
            FieldAccessors::new(Some(kingdom_event_name), Some(kingdom_event_description)),
        );
        registry.register(
            RecordKind::AsksList,
            FieldAccessors::new(Some(asks_list_name), None),
        );
        registry.register(
            RecordKind::LeaderSkill,
            FieldAccessors::new(Some(leader_skill_name), Some(leader_skill_description)),
        );
        registry.register(
            RecordKind::Region,
            FieldAccessors::new(Some(region_name), Some(region_description)),
        );
        registry
    }

    /// Add or replace the accessors for a kind, returning the previous entry.
    pub fn register(
        &mut self,
        kind: RecordKind,
        accessors: FieldAccessors,
    ) -> Option<FieldAccessors> {
        self.entries.insert(kind, accessors)
    }

    pub fn accessors(&self, kind: RecordKind) -> Option<&FieldAccessors> {
        self.entries.get(&kind)
    }

    /// Resolve `field` on `record` through its kind's accessor.
    pub fn resolve<'r>(&self, record: &'r Record, field: SearchField) -> Option<&'r str> {
        let accessor = self.accessors(record.kind())?.get(field)?;
        accessor(record)
    }
}

fn localized_name(record: &Record) -> Option<&str> {
    record.body.localized()?.name.as_deref()
}

fn localized_description(record: &Record) -> Option<&str> {
    record.body.localized()?.description.as_deref()
}

fn kingdom_buff_name(record: &Record) -> Option<&str> {
    match &record.body {
        RecordBody::KingdomBuff { display_name, .. } => display_name.as_deref(),
        _ => None,
    }
}

fn kingdom_buff_description(record: &Record) -> Option<&str> {
    match &record.body {
        RecordBody::KingdomBuff { description, .. } => description.as_deref(),
        _ => None,
    }
}

fn kingdom_event_name(record: &Record) -> Option<&str> {
    match &record.body {
        RecordBody::KingdomEvent { display_name, .. } => display_name.as_deref(),
        _ => None,
    }
}

fn kingdom_event_description(record: &Record) -> Option<&str> {
    match &record.body {
        RecordBody::KingdomEvent {
            localized_description,
            ..
        } => localized_description.as_deref(),
        _ => None,
    }
}

fn asks_list_name(record: &Record) -> Option<&str> {
    match &record.body {
        RecordBody::AsksList { display_name } => display_name.as_deref(),
        _ => None,
    }
}

fn leader_skill_name(record: &Record) -> Option<&str> {
    match &record.body {
        RecordBody::LeaderSkill { localized_name, .. } => localized_name.as_deref(),
        _ => None,
    }
}

fn leader_skill_description(record: &Record) -> Option<&str> {
    match &record.body {
        RecordBody::LeaderSkill {
            localized_description,
            ..
        } => localized_description.as_deref(),
        _ => None,
    }
}

fn region_name(record: &Record) -> Option<&str> {
    match &record.body {
        RecordBody::Region { localized_name, .. } => localized_name.as_deref(),
        _ => None,
    }
}

fn region_description(record: &Record) -> Option<&str> {
    match &record.body {
        RecordBody::Region {
            claimed_description,
            ..
        } => claimed_description.as_deref(),
        _ => None,
    }
}
