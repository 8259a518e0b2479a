//! Value objects.
//!
//! Each value object validates itself on construction, so holding one is proof
//! that the wrapped value is well-formed.

use std::fmt;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// Number of trait dimensions carried by a profile.
pub const TRAIT_COUNT: usize = 8;

/// Inclusive bounds for a single trait stat.
pub const STAT_MIN: u8 = 10;
pub const STAT_MAX: u8 = 90;

/// Maximum nickname length in characters.
pub const NICKNAME_MAX_CHARS: usize = 32;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a registered user.
    UserId
);
define_id!(
    /// Identifier of a character profile.
    ProfileId
);
define_id!(
    /// Identifier of a persisted room.
    RoomId
);

/// Display name of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyNickname);
        }
        let actual = trimmed.chars().count();
        if actual > NICKNAME_MAX_CHARS {
            return Err(ValueObjectError::NicknameTooLong {
                max: NICKNAME_MAX_CHARS,
                actual,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The 8-dimensional trait stat vector checked by card requirements.
///
/// Every stat lies in `[STAT_MIN, STAT_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TraitStats([u8; TRAIT_COUNT]);

impl TraitStats {
    pub fn new(values: [u8; TRAIT_COUNT]) -> Result<Self, ValueObjectError> {
        if let Some(bad) = values.iter().find(|v| !(STAT_MIN..=STAT_MAX).contains(*v)) {
            return Err(ValueObjectError::StatValue(bad.to_string()));
        }
        Ok(Self(values))
    }

    /// Build from an arbitrary list of integers, as received over the wire.
    pub fn from_slice(values: &[i64]) -> Result<Self, ValueObjectError> {
        if values.len() != TRAIT_COUNT {
            return Err(ValueObjectError::StatsLength(values.len()));
        }
        let mut stats = [0u8; TRAIT_COUNT];
        for (slot, value) in stats.iter_mut().zip(values) {
            *slot = u8::try_from(*value)
                .map_err(|_| ValueObjectError::StatValue(value.to_string()))?;
        }
        Self::new(stats)
    }

    /// Parse the comma-separated form, e.g. `"50,50,40,60,30,70,20,80"`.
    pub fn parse(text: &str) -> Result<Self, ValueObjectError> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() != TRAIT_COUNT {
            return Err(ValueObjectError::StatsLength(parts.len()));
        }
        let mut stats = [0u8; TRAIT_COUNT];
        for (slot, part) in stats.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u8>()
                .map_err(|_| ValueObjectError::StatValue(part.to_string()))?;
        }
        Self::new(stats)
    }

    /// Stat at `index`; `index` must be below [`TRAIT_COUNT`].
    pub fn get(&self, index: usize) -> u8 {
        self.0[index]
    }

    pub fn as_array(&self) -> &[u8; TRAIT_COUNT] {
        &self.0
    }
}

/// Unix timestamp in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Opaque bearer token identifying an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyToken);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionToken {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Argon2 hash of a password in PHC string format.
///
/// The plain password is never kept.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash `password` with a fresh random salt.
    ///
    /// CPU-heavy; async callers should run it on a blocking thread.
    pub fn generate(password: &str) -> Result<Self, ValueObjectError> {
        if password.is_empty() {
            return Err(ValueObjectError::EmptyPassword);
        }
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| ValueObjectError::PasswordHashing(e.to_string()))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ValueObjectError::PasswordHashing(e.to_string()))?;
        Ok(Self(hash.to_string()))
    }

    /// Wrap a stored PHC string.
    pub fn from_encoded(encoded: String) -> Result<Self, ValueObjectError> {
        PasswordHash::new(&encoded)
            .map_err(|e| ValueObjectError::PasswordHashing(e.to_string()))?;
        Ok(Self(encoded))
    }

    /// Constant-time check of `password` against the digest.
    pub fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}
