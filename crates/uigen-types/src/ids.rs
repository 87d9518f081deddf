//! Typed identifiers.
//!
//! `PreviewId` wraps a UUIDv7 so that preview units sort by creation time. It
//! displays as standard UUID text for logging; `short()` is for human-facing
//! UI only and never used as a lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one materialized preview unit (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewId(uuid::Uuid);

impl PreviewId {
    /// Create a new time-ordered ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// First 8 hex characters, for human display only, not lookup.
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }
}

impl Default for PreviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PreviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PreviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PreviewId({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = PreviewId::new();
        let b = PreviewId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_and_display() {
        let id = PreviewId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: PreviewId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
    }
}
