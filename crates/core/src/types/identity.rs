//! Signed-in identities.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// An opaque signed-in identity supplied by the auth collaborator.
///
/// Only the stable `id` is relied upon; everything else about the identity
/// (display name, email, tokens) stays with the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
}

impl Identity {
    /// Create an identity from its stable user id.
    #[must_use]
    pub fn new(id: impl Into<UserId>) -> Self {
        Self { id: id.into() }
    }
}
