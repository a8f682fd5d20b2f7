//! Partner link domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locally cached partner link.
///
/// `link_key` and `partner_name` are written and removed together, so after
/// any single store operation they are either both present or both absent.
/// A crash between the two underlying key writes can still leave a key with
/// no name, so `partner_name` may be empty when loaded from such a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerLink {
    /// Opaque token identifying the active link
    pub link_key: String,
    /// Cached display name of the linked partner
    pub partner_name: String,
}

/// Server-owned relationship record.
///
/// The client never creates this entity directly; it requests link/unlink
/// operations and caches the resulting key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// User that owns this view of the relationship
    pub owner_uuid: String,
    /// The linked partner's user id
    pub partner_uuid: String,
    /// Opaque link token; compared against the cached `link_key` to detect
    /// that the partner unlinked or relinked elsewhere
    pub link_key: String,
    /// When the couple chose to date the relationship from, if set
    pub started_at: Option<DateTime<Utc>>,
}
