use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Number of random bytes behind an [`Id`].
pub const ID_BYTES: usize = 12;

/// Opaque document identifier, 24 lowercase hex digits.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Cast a raw string into an [`Id`].
    ///
    /// Returns `None` when `raw` is not 24 hex digits. Uppercase digits are
    /// accepted and normalized.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut bytes = [0u8; ID_BYTES];
        hex::decode_to_slice(raw, &mut bytes).ok()?;
        Some(Self(hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiers read back from storage, already cast when written.
impl From<String> for Id {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<Id> for String {
    fn from(id: Id) -> String {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let id = Id::generate();
        assert_eq!(id.as_str().len(), ID_BYTES * 2);
        assert_ne!(id, Id::generate());
        assert_eq!(Id::parse(id.as_str()), Some(id));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            Id::parse("65A1B2C3D4E5F60718293A4B").map(String::from),
            Some("65a1b2c3d4e5f60718293a4b".to_owned())
        );
        assert!(Id::parse("").is_none());
        assert!(Id::parse("users").is_none());
        assert!(Id::parse("65a1b2c3d4e5f60718293a4").is_none());
        assert!(Id::parse("zza1b2c3d4e5f60718293a4b").is_none());
    }
}
