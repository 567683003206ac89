//! Identifier newtypes shared across the pipeline.
//!
//! # Identifiers
//! - [`RequestId`] - One incoming user request
//! - [`AgentId`] - A named agent role from the registry
//! - [`CapabilityId`] - A node in the capability graph
//! - [`SubtaskId`] - One unit of decomposed work

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Unique identifier for one incoming request.
    RequestId
}

string_id! {
    /// Identifier of a registered agent role.
    AgentId
}

string_id! {
    /// Identifier of a capability node.
    CapabilityId
}

string_id! {
    /// Identifier of a decomposed subtask.
    SubtaskId
}

impl RequestId {
    /// Generates a new unique RequestId using a UUID-like format.
    pub fn generate() -> Self {
        Self(uuid_v4())
    }
}

fn uuid_v4() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    // Simple pseudo-random based on time
    let nanos = now.as_nanos();
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (nanos >> 96) as u32,
        (nanos >> 80) as u16,
        (nanos >> 64) as u16 & 0x0fff,
        ((nanos >> 48) as u16 & 0x3fff) | 0x8000,
        (nanos & 0xffffffffffff) as u64
    )
}
