//! [`Session`] definitions.

use std::time::Duration;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::domain::{access, challenge};

define_kind! {
    #[doc = "Scheme used to issue and check [`Session`]s."]
    enum Scheme {
        #[doc = "Token derived from the code fingerprint and issuance time, \
                 mirrored remotely as a session [`Record`]."]
        Token = 1,

        #[doc = "Token derived through a remotely persisted challenge and \
                 its response, mirrored as a [`challenge::Response`]."]
        ChallengeResponse = 2,
    }
}

/// Operator session.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// [`Token`] of this [`Session`].
    pub token: Token,

    /// [`DateTime`] when this [`Session`] was created.
    #[serde(with = "common::datetime::serde::unix_millis")]
    pub created_at: CreationDateTime,

    /// ID of the [`challenge::Challenge`] this [`Session`] was issued for,
    /// if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<challenge::Id>,
}

impl Session {
    /// Fixed lifetime of a [`Session`].
    pub const LIFETIME: Duration = Duration::from_secs(30 * 60);

    /// Returns the [`DateTime`] when this [`Session`] expires.
    #[must_use]
    pub fn expires_at(&self) -> ExpirationDateTime {
        (self.created_at + Self::LIFETIME).coerce()
    }

    /// Returns the lifetime left at the provided moment.
    #[must_use]
    pub fn remaining(&self, now: common::DateTime) -> Duration {
        Self::LIFETIME.saturating_sub(now - self.created_at.coerce::<()>())
    }

    /// Checks whether this [`Session`] is expired at the provided moment.
    #[must_use]
    pub fn is_expired(&self, now: common::DateTime) -> bool {
        self.remaining(now).is_zero()
    }

    /// Returns the [`Scheme`] this [`Session`] was issued by.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        if self.challenge_id.is_some() {
            Scheme::ChallengeResponse
        } else {
            Scheme::Token
        }
    }
}

/// Access token of a [`Session`].
#[derive(
    AsRef,
    Clone,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Derives a [`Token`] from the code [`Fingerprint`] and the issuance
    /// moment.
    ///
    /// [`Fingerprint`]: access::Fingerprint
    #[must_use]
    pub fn derive(
        fingerprint: &access::Fingerprint,
        issued_at: CreationDateTime,
    ) -> Self {
        Self(access::digest(format!(
            "{fingerprint}{}",
            issued_at.unix_millis(),
        )))
    }

    /// Creates a new [`Token`] from an already derived digest.
    #[must_use]
    pub fn from_digest(digest: String) -> Self {
        Self(digest)
    }
}

/// Remote mirror of a [`Session`] issued by the [`Scheme::Token`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Record {
    /// [`Token`] this [`Record`] is keyed by.
    #[serde(skip)]
    pub token: Token,

    /// [`DateTime`] when the [`Session`] was created.
    #[serde(rename = "created", with = "common::datetime::serde::unix_millis")]
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the [`Session`] expires.
    #[serde(rename = "expires", with = "common::datetime::serde::unix_millis")]
    pub expires_at: ExpirationDateTime,

    /// Indicator whether the [`Session`] is still accepted.
    pub valid: bool,
}

impl Record {
    /// Creates a new valid [`Record`] mirroring the provided [`Session`].
    #[must_use]
    pub fn of(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            created_at: session.created_at,
            expires_at: session.expires_at(),
            valid: true,
        }
    }

    /// Checks whether this [`Record`] still grants access at the provided
    /// moment.
    #[must_use]
    pub fn grants(&self, now: common::DateTime) -> bool {
        self.valid && self.expires_at.coerce::<()>() > now
    }
}

/// [`DateTime`] when a [`Session`] was created.
pub type CreationDateTime = DateTimeOf<(Session, unit::Creation)>;

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
