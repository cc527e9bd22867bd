//! Identity of the technician whose data is being stored.
//!
//! Identities are opaque and anonymous. Storage is keyed by them, and nothing
//! is loaded or written before one is available.

use serde::{Deserialize, Serialize};

/// Stable opaque identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of the current identity.
///
/// `None` means the identity is not known *yet*, which is different from a
/// known identity that simply has no stored session.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

/// Provider with a fixed (or absent) identity.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    identity: Option<Identity>,
}

impl StaticIdentityProvider {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// A provider that never resolves.
    pub fn pending() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider() {
        let provider = StaticIdentityProvider::new(Identity::new("anon-1"));
        assert_eq!(provider.current_identity().unwrap().as_str(), "anon-1");
        assert!(StaticIdentityProvider::pending().current_identity().is_none());
    }

    #[test]
    fn test_identity_serializes_as_plain_string() {
        let json = serde_json::to_string(&Identity::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
