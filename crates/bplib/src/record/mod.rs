//! Decoded blueprint records.
//!
//! A record is an identifier, the blueprint's raw internal name, and a body
//! with the localized strings its kind carries. Which of those strings count
//! as the "display name" or "description" for search is decided by
//! [`FieldRegistry`], not by the record itself.

mod fields;
mod identifier;
mod kind;

use serde::{Deserialize, Serialize};

pub use fields::*;
pub use identifier::*;
pub use kind::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Identifier,
    /// Raw internal name (not localized)
    pub name: String,
    pub body: RecordBody,
}

impl Record {
    pub fn new(id: Identifier, name: impl Into<String>, body: RecordBody) -> Self {
        Self {
            id,
            name: name.into(),
            body,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.body.kind()
    }
}

/// Localized name/description pair shared by most kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Localized {
    pub fn new(name: Option<&str>, description: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            description: description.map(str::to_string),
        }
    }
}

/// Kind-specific payload of a record.
///
/// Field order within each variant is the order fields are stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RecordBody {
    UnitFact(Localized),
    Archetype(Localized),
    AbilityResource(Localized),
    CharacterClass(Localized),
    Item(Localized),
    KingdomBuff {
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
    KingdomEvent {
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        localized_description: Option<String>,
    },
    KingdomMoraleFlag(Localized),
    AsksList {
        #[serde(default)]
        display_name: Option<String>,
    },
    LeaderSkill {
        #[serde(default)]
        localized_name: Option<String>,
        #[serde(default)]
        localized_description: Option<String>,
    },
    Region {
        #[serde(default)]
        localized_name: Option<String>,
        #[serde(default)]
        claimed_description: Option<String>,
    },
    Other,
}

impl RecordBody {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::UnitFact(_) => RecordKind::UnitFact,
            Self::Archetype(_) => RecordKind::Archetype,
            Self::AbilityResource(_) => RecordKind::AbilityResource,
            Self::CharacterClass(_) => RecordKind::CharacterClass,
            Self::Item(_) => RecordKind::Item,
            Self::KingdomBuff { .. } => RecordKind::KingdomBuff,
            Self::KingdomEvent { .. } => RecordKind::KingdomEvent,
            Self::KingdomMoraleFlag(_) => RecordKind::KingdomMoraleFlag,
            Self::AsksList { .. } => RecordKind::AsksList,
            Self::LeaderSkill { .. } => RecordKind::LeaderSkill,
            Self::Region { .. } => RecordKind::Region,
            Self::Other => RecordKind::Other,
        }
    }

    /// The shared name/description pair, for kinds that use one
    pub fn localized(&self) -> Option<&Localized> {
        match self {
            Self::UnitFact(l)
            | Self::Archetype(l)
            | Self::AbilityResource(l)
            | Self::CharacterClass(l)
            | Self::Item(l)
            | Self::KingdomMoraleFlag(l) => Some(l),
            _ => None,
        }
    }

    /// Stored string fields in on-disk order. Length equals `kind().field_slots()`.
    pub fn fields(&self) -> Vec<Option<&str>> {
        if let Some(l) = self.localized() {
            return vec![l.name.as_deref(), l.description.as_deref()];
        }

        match self {
            Self::KingdomBuff {
                display_name,
                description,
            } => vec![display_name.as_deref(), description.as_deref()],
            Self::KingdomEvent {
                display_name,
                localized_description,
            } => vec![display_name.as_deref(), localized_description.as_deref()],
            Self::AsksList { display_name } => vec![display_name.as_deref()],
            Self::LeaderSkill {
                localized_name,
                localized_description,
            } => vec![localized_name.as_deref(), localized_description.as_deref()],
            Self::Region {
                localized_name,
                claimed_description,
            } => vec![localized_name.as_deref(), claimed_description.as_deref()],
            _ => Vec::new(),
        }
    }

    /// Rebuild a body from fields read in on-disk order.
    ///
    /// Missing trailing fields are treated as absent; the decoder checks the
    /// count before calling this.
    pub fn from_fields(kind: RecordKind, fields: Vec<Option<String>>) -> Self {
        let mut fields = fields.into_iter();
        let mut next = || fields.next().flatten();

        match kind {
            RecordKind::UnitFact => Self::UnitFact(Localized {
                name: next(),
                description: next(),
            }),
            RecordKind::Archetype => Self::Archetype(Localized {
                name: next(),
                description: next(),
            }),
            RecordKind::AbilityResource => Self::AbilityResource(Localized {
                name: next(),
                description: next(),
            }),
            RecordKind::CharacterClass => Self::CharacterClass(Localized {
                name: next(),
                description: next(),
            }),
            RecordKind::Item => Self::Item(Localized {
                name: next(),
                description: next(),
            }),
            RecordKind::KingdomBuff => Self::KingdomBuff {
                display_name: next(),
                description: next(),
            },
            RecordKind::KingdomEvent => Self::KingdomEvent {
                display_name: next(),
                localized_description: next(),
            },
            RecordKind::KingdomMoraleFlag => Self::KingdomMoraleFlag(Localized {
                name: next(),
                description: next(),
            }),
            RecordKind::AsksList => Self::AsksList {
                display_name: next(),
            },
            RecordKind::LeaderSkill => Self::LeaderSkill {
                localized_name: next(),
                localized_description: next(),
            },
            RecordKind::Region => Self::Region {
                localized_name: next(),
                claimed_description: next(),
            },
            RecordKind::Other => Self::Other,
        }
    }
}
