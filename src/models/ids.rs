//! Tagged identifiers and token addresses
//!
//! Collections and markers are referenced by opaque string ids. Wrapping them
//! in distinct types keeps a collection id from being passed where a marker id
//! is expected, and keeps positional indices out of places that need ids.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw id; blank strings are rejected, whitespace is trimmed
            pub fn new(raw: impl AsRef<str>) -> Option<Self> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(&raw).ok_or_else(|| format!("{} must not be empty", stringify!($name)))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

string_id!(
    /// Stable id of a collection (assigned at creation, never reused)
    CollectionId
);

string_id!(
    /// Unique id of a persisted marker
    MarkerId
);

/// Address of a word token within the displayed collection
///
/// Valid for one render pass; markers survive re-renders only because
/// tokenization of unchanged content is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAddress {
    pub block_index: usize,
    pub token_index: usize,
}

impl TokenAddress {
    pub fn new(block_index: usize, token_index: usize) -> Self {
        Self {
            block_index,
            token_index,
        }
    }

    pub fn same_block(&self, other: &TokenAddress) -> bool {
        self.block_index == other.block_index
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_index, self.token_index)
    }
}
