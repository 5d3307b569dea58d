use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Blueprint kinds the library knows how to decode.
///
/// The discriminant is the kind tag written at the start of every record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[repr(u8)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    UnitFact = 0,
    Archetype = 1,
    AbilityResource = 2,
    CharacterClass = 3,
    Item = 4,
    KingdomBuff = 5,
    KingdomEvent = 6,
    KingdomMoraleFlag = 7,
    AsksList = 8,
    LeaderSkill = 9,
    Region = 10,
    Other = 0xFF,
}

impl RecordKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::from_repr(value)
    }

    pub fn tag(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Number of localized string fields stored for this kind
    pub fn field_slots(&self) -> u8 {
        match self {
            Self::AsksList => 1,
            Self::Other => 0,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_tag_roundtrip() {
        for kind in RecordKind::iter() {
            assert_eq!(RecordKind::from_u8(kind.tag()), Some(kind));
        }
        assert_eq!(RecordKind::from_u8(11), None);
    }

    #[test]
    fn test_parse_kebab_case() {
        assert_eq!(
            "unit-fact".parse::<RecordKind>().unwrap(),
            RecordKind::UnitFact
        );
        assert_eq!(
            "Kingdom-Morale-Flag".parse::<RecordKind>().unwrap(),
            RecordKind::KingdomMoraleFlag
        );
        assert_eq!(RecordKind::AsksList.to_string(), "asks-list");
        assert!("unitfact".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_field_slots() {
        assert_eq!(RecordKind::Region.field_slots(), 2);
        assert_eq!(RecordKind::AsksList.field_slots(), 1);
        assert_eq!(RecordKind::Other.field_slots(), 0);
    }
}
