use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque handle for a caller or account owner.
///
/// Identities are assumed to be authenticated before they reach an engine;
/// engines only authorize based on the identity they are handed.
/// `Identity::NULL` plays the role of "nobody" (mint source, burn sink,
/// cleared approval).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Identity(pub u64);

impl Identity {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl From<u64> for Identity {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
