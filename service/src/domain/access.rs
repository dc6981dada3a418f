//! Access [`Code`] definitions.

use std::sync::LazyLock;

use derive_more::{AsRef, Display};
use regex::Regex;
use secrecy::zeroize::{Zeroize, ZeroizeOnDrop};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Shared 4-digit code granting access to the roster.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Code(String);

impl Code {
    /// Creates a new [`Code`] if the given `code` is exactly four decimal
    /// digits.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Code`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[0-9]{4}$").expect("valid regex")
        });

        REGEX.is_match(code.as_ref())
    }

    /// Returns the digits of this [`Code`].
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Drop for Code {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl ZeroizeOnDrop for Code {}

/// Public one-way hash of a [`Code`], stored remotely for comparison.
#[derive(AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[as_ref(str)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the [`Fingerprint`] of the provided [`Code`].
    #[must_use]
    pub fn of(code: &Code) -> Self {
        Self(digest(code.expose()))
    }

    /// Wraps an already computed hex digest.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into().to_ascii_lowercase())
    }
}

/// Computes the lowercase hex SHA-256 digest of the provided `input`.
#[must_use]
pub fn digest(input: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(input.as_ref()))
}
