//! [`Student`] definitions.

use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

/// Student registered for the outing, as stored remotely.
///
/// Text fields are kept verbatim: records written by other clients are not
/// guaranteed to satisfy [`Fields`] invariants.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Student {
    /// ID of this [`Student`], assigned by the store.
    #[serde(skip)]
    pub id: Id,

    /// First name of this [`Student`].
    #[serde(rename = "firstName", default)]
    pub first_name: String,

    /// Last name of this [`Student`].
    #[serde(rename = "lastName", default)]
    pub last_name: String,

    /// Class code of this [`Student`].
    #[serde(default)]
    pub class: String,

    /// Number of ski-pass days.
    #[serde(
        rename = "forfaitDays",
        default,
        deserialize_with = "count::lenient"
    )]
    pub forfait_days: u32,

    /// Number of equipment rental days.
    #[serde(
        rename = "locationDays",
        default,
        deserialize_with = "count::lenient"
    )]
    pub rental_days: u32,

    /// Number of keycards.
    #[serde(
        rename = "keycard",
        default,
        deserialize_with = "count::lenient"
    )]
    pub keycards: u32,

    /// [`DateTime`] when this [`Student`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(
        rename = "createdAt",
        default,
        with = "common::datetime::serde::unix_millis_or_epoch"
    )]
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Student`] was last updated.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(
        rename = "updatedAt",
        default,
        with = "common::datetime::serde::unix_millis_or_epoch"
    )]
    pub updated_at: ModificationDateTime,
}

impl Student {
    /// Creates a new [`Student`] from the [`Draft`] stored under the
    /// provided [`Id`].
    #[must_use]
    pub fn new(id: Id, draft: Draft) -> Self {
        let Draft {
            fields,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            first_name: fields.first_name.into(),
            last_name: fields.last_name.into(),
            class: fields.class.into(),
            forfait_days: fields.forfait_days,
            rental_days: fields.rental_days,
            keycards: fields.keycards,
            created_at,
            updated_at,
        }
    }
}

/// Parses a count out of the provided free-form input: its leading run of
/// digits, after optional whitespace and a `+` sign.
///
/// Negative, empty or non-numeric input reads as `0`, while an overflowing
/// one saturates.
#[must_use]
pub fn parse_count(input: &str) -> u32 {
    let input = input.trim_start();
    let input = input.strip_prefix('+').unwrap_or(input);
    let digits = input
        .find(|c: char| !c.is_ascii_digit())
        .map_or(input, |end| &input[..end]);
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

/// Lenient deserialization of [`Student`] counts.
mod count {
    use serde::{de::IgnoredAny, Deserialize, Deserializer};

    /// Count as written by any client.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Float(f64),
        Text(String),
        Other(IgnoredAny),
    }

    /// Deserializes a count, clamping numbers to the [`u32`] range and
    /// reading text as [`parse_count()`] does.
    ///
    /// [`parse_count()`]: super::parse_count
    pub(super) fn lenient<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Integer(n) => u32::try_from(n.max(0)).unwrap_or(u32::MAX),
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "saturating conversion"
            )]
            Raw::Float(f) => f as u32,
            Raw::Text(s) => super::parse_count(&s),
            Raw::Other(IgnoredAny) => 0,
        })
    }
}

/// ID of a [`Student`], assigned by the store.
#[derive(
    AsRef,
    Clone,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`] if the given `id` is a valid store key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is usable as a store key: non-empty,
    /// at most 768 bytes, without whitespace, control characters or any of
    /// `.`, `$`, `#`, `[`, `]`, `/`.
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        !id.is_empty()
            && id.len() <= 768
            && !id.chars().any(|c| {
                c.is_whitespace()
                    || c.is_control()
                    || matches!(c, '.' | '$' | '#' | '[' | ']' | '/')
            })
    }
}

impl std::str::FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `student::Id`")
    }
}

/// Name (first or last) of a [`Student`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] out of the trimmed `name`, if it's not empty.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let name = name.as_ref().trim();
        (!name.is_empty()).then(|| Self(name.to_owned()))
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

/// Class code of a [`Student`]: exactly 3 upper-cased characters.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str)]
#[serde(transparent)]
pub struct Class(String);

impl Class {
    /// Length of a [`Class`] code, in characters.
    pub const LEN: usize = 3;

    /// Creates a new [`Class`] out of the trimmed and upper-cased `class`,
    /// if it's exactly [`Class::LEN`] characters long.
    #[must_use]
    pub fn new(class: impl AsRef<str>) -> Option<Self> {
        let class = class.as_ref().trim().to_uppercase();
        (class.chars().count() == Self::LEN).then_some(Self(class))
    }
}

impl From<Class> for String {
    fn from(class: Class) -> Self {
        class.0
    }
}

/// Validated editable fields of a [`Student`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Fields {
    /// First [`Name`] of a [`Student`].
    #[serde(rename = "firstName")]
    pub first_name: Name,

    /// Last [`Name`] of a [`Student`].
    #[serde(rename = "lastName")]
    pub last_name: Name,

    /// [`Class`] of a [`Student`].
    pub class: Class,

    /// Number of ski-pass days.
    #[serde(rename = "forfaitDays")]
    pub forfait_days: u32,

    /// Number of equipment rental days.
    #[serde(rename = "locationDays")]
    pub rental_days: u32,

    /// Number of keycards.
    #[serde(rename = "keycard")]
    pub keycards: u32,
}

/// New [`Student`] record, before the store assigns its [`Id`].
#[derive(Clone, Debug, Serialize)]
pub struct Draft {
    /// [`Fields`] of the new [`Student`].
    #[serde(flatten)]
    pub fields: Fields,

    /// [`DateTime`] when the [`Student`] is created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(
        rename = "createdAt",
        with = "common::datetime::serde::unix_millis"
    )]
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the [`Student`] is updated.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(
        rename = "updatedAt",
        with = "common::datetime::serde::unix_millis"
    )]
    pub updated_at: ModificationDateTime,
}

/// Partial update of an existing [`Student`] record.
#[derive(Clone, Debug, Serialize)]
pub struct Patch {
    /// ID of the [`Student`] to update.
    #[serde(skip)]
    pub id: Id,

    /// New [`Fields`] of the [`Student`].
    #[serde(flatten)]
    pub fields: Fields,

    /// [`DateTime`] when the [`Student`] is updated.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(
        rename = "updatedAt",
        with = "common::datetime::serde::unix_millis"
    )]
    pub updated_at: ModificationDateTime,
}

/// [`DateTime`] when a [`Student`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Student, unit::Creation)>;

/// [`DateTime`] when a [`Student`] was last updated.
///
/// [`DateTime`]: common::DateTime
pub type ModificationDateTime = DateTimeOf<(Student, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{parse_count, Class, Draft, Fields, Id, Name, Student};

    fn fields() -> Fields {
        Fields {
            first_name: Name::new("Léa").unwrap(),
            last_name: Name::new("Martin").unwrap(),
            class: Class::new("tg1").unwrap(),
            forfait_days: 2,
            rental_days: 1,
            keycards: 1,
        }
    }

    #[test]
    fn name_is_trimmed_and_required() {
        assert_eq!(Name::new("  Léa ").unwrap().as_ref(), "Léa");
        assert!(Name::new("").is_none());
        assert!(Name::new("   ").is_none());
    }

    #[test]
    fn class_is_upper_cased_and_three_chars() {
        assert_eq!(Class::new("tg1").unwrap().as_ref(), "TG1");
        assert_eq!(Class::new(" 203 ").unwrap().as_ref(), "203");
        assert_eq!(Class::new("1èr").unwrap().as_ref(), "1ÈR");

        assert!(Class::new("").is_none());
        assert!(Class::new("TG").is_none());
        assert!(Class::new("TG12").is_none());
    }

    #[test]
    fn id_rejects_path_characters() {
        assert!(Id::new("-NxAbC_12").is_some());

        for id in ["", "a/b", "a.b", "a b", "a#b", "$x", "[x]"] {
            assert!(Id::new(id).is_none(), "`{id}` must be rejected");
        }
    }

    #[test]
    fn reads_partial_records() {
        let student: Student =
            serde_json::from_str(r#"{"lastName": "Martin"}"#).unwrap();

        assert_eq!(student.last_name, "Martin");
        assert_eq!(student.first_name, "");
        assert_eq!(student.forfait_days, 0);
        assert_eq!(student.keycards, 0);
        assert_eq!(student.created_at, DateTime::UNIX_EPOCH.coerce());
    }

    #[test]
    fn reads_counts_leniently() {
        let student: Student = serde_json::from_value(serde_json::json!({
            "forfaitDays": -1,
            "locationDays": "3 jours",
            "keycard": 2.5,
        }))
        .unwrap();

        assert_eq!(student.forfait_days, 0);
        assert_eq!(student.rental_days, 3);
        assert_eq!(student.keycards, 2);

        let student: Student = serde_json::from_value(serde_json::json!({
            "forfaitDays": null,
            "locationDays": "abc",
            "keycard": true,
        }))
        .unwrap();

        assert_eq!(
            (student.forfait_days, student.rental_days, student.keycards),
            (0, 0, 0),
        );
    }

    #[test]
    fn parses_leading_digits_of_count() {
        for (input, expected) in [
            ("2", 2),
            (" 2.5", 2),
            ("3 jours", 3),
            ("+4", 4),
            ("-1", 0),
            ("", 0),
            ("x1", 0),
            ("99999999999", u32::MAX),
        ] {
            assert_eq!(parse_count(input), expected, "`{input}`");
        }
    }

    #[test]
    fn draft_wire_format() {
        let draft = Draft {
            fields: fields(),
            created_at: DateTime::from_unix_millis(5).unwrap().coerce(),
            updated_at: DateTime::from_unix_millis(5).unwrap().coerce(),
        };

        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::json!({
                "firstName": "Léa",
                "lastName": "Martin",
                "class": "TG1",
                "forfaitDays": 2,
                "locationDays": 1,
                "keycard": 1,
                "createdAt": 5,
                "updatedAt": 5,
            }),
        );

        let student = Student::new(Id::new("abc").unwrap(), draft);
        assert_eq!(student.class, "TG1");
        assert_eq!(student.rental_days, 1);
    }
}
