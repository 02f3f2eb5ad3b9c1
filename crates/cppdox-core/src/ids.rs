//! Content-addressed symbol identity.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Stable 128-bit identity of a documented declaration.
///
/// IDs are content-addressed: hashing the declaration's canonical USR makes
/// the value identical across runs and across translation units that see the
/// same declaration. Template specializations reduce to their primary
/// template before hashing, so they collapse onto a single ID. The all-zero
/// value marks "unresolved".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u128);

impl SymbolId {
    /// The null ID, used for unresolved references.
    pub const NULL: SymbolId = SymbolId(0);

    /// Build an ID by hashing a canonical USR string.
    pub fn from_usr(usr: &str) -> Self {
        let digest = Sha256::digest(usr.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        SymbolId(u128::from_be_bytes(bytes))
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn raw(&self) -> u128 {
        self.0
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

// Serialized as a fixed-width hex string; u128 is not a portable JSON number.
impl Serialize for SymbolId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SymbolId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        u128::from_str_radix(&s, 16)
            .map(SymbolId)
            .map_err(|_| de::Error::custom("expected a hex symbol id"))
    }
}
