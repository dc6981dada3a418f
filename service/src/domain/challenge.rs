//! [`Challenge`] definitions.

use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{access, session};

/// Random challenge persisted remotely before a
/// [`Scheme::ChallengeResponse`] session is issued.
///
/// [`Scheme::ChallengeResponse`]: session::Scheme::ChallengeResponse
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Challenge {
    /// ID of this [`Challenge`].
    #[serde(skip)]
    pub id: Id,

    /// Random hex value of this [`Challenge`].
    #[serde(rename = "challenge")]
    pub value: String,

    /// [`DateTime`] when this [`Challenge`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(rename = "created", with = "common::datetime::serde::unix_millis")]
    pub created_at: CreationDateTime,
}

impl Challenge {
    /// Generates a new [`Challenge`] under a fresh random [`Id`].
    #[must_use]
    pub fn generate(created_at: CreationDateTime) -> Self {
        let bytes: [u8; 32] = rand::thread_rng().gen();
        Self {
            id: Id::new(),
            value: hex::encode(bytes),
            created_at,
        }
    }
}

/// ID of a [`Challenge`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Response to a [`Challenge`], persisted remotely under the [`Token`] it
/// derives.
///
/// [`Token`]: session::Token
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Response {
    /// [`session::Token`] this [`Response`] is keyed by.
    #[serde(skip)]
    pub token: session::Token,

    /// Digest of the code concatenated with the [`Challenge`] value.
    #[serde(rename = "response")]
    pub value: String,

    /// [`DateTime`] when this [`Response`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(rename = "created", with = "common::datetime::serde::unix_millis")]
    pub created_at: CreationDateTime,
}

impl Response {
    /// Derives the [`Response`] to the provided [`Challenge`]:
    /// `response = hash(code ‖ challenge)` and `token = hash(response)`.
    #[must_use]
    pub fn derive(code: &access::Code, challenge: &Challenge) -> Self {
        let value =
            access::digest(format!("{}{}", code.expose(), challenge.value));
        Self {
            token: session::Token::from_digest(access::digest(&value)),
            value,
            created_at: challenge.created_at,
        }
    }
}

/// [`DateTime`] when a [`Challenge`] or [`Response`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Challenge, unit::Creation)>;
