//! Remote service trait.
//!
//! Abstracts the REST backend consumed by the session core: user lookup,
//! authentication, registration, and partner-link management. Content
//! endpoints (memories, recipes) are out of scope for this layer.

use crate::error::Result;
use crate::link::Relationship;
use crate::user::UserProfile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An abstract client for the remote MomentCount service.
///
/// Every method is a single attempt with no retry or backoff; callers decide
/// whether a failure is fatal or degrades gracefully.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Fetches a user by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(profile))`: user found
    /// - `Ok(None)`: no such user
    /// - `Err(_)`: network or server error
    async fn get_user(&self, uuid: &str) -> Result<Option<UserProfile>>;

    /// Authenticates with username and password.
    ///
    /// # Errors
    ///
    /// `MomentError::InvalidCredentials` when the server rejects the pair;
    /// `MomentError::Network` for transport or server failures.
    async fn authenticate(&self, username: &str, password: &str) -> Result<UserProfile>;

    /// Registers a new user record.
    ///
    /// The client generates the uuid and sends the full profile; the server
    /// echoes back the stored record.
    async fn register_user(&self, profile: &UserProfile, password: &str) -> Result<UserProfile>;

    /// Creates or updates the profile fields of an existing user.
    async fn upsert_user(&self, profile: &UserProfile) -> Result<UserProfile>;

    /// Fetches the current relationship for a user.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(relationship))`: an active relationship exists
    /// - `Ok(None)`: the user is not linked
    /// - `Err(_)`: network or server error
    async fn get_relationship(&self, user_uuid: &str) -> Result<Option<Relationship>>;

    /// Requests a link to the partner with the given display name.
    ///
    /// # Errors
    ///
    /// - `MomentError::NotFound` when no user has that name
    /// - `MomentError::AlreadyLinked` when the partner is linked elsewhere
    /// - `MomentError::SelfLink` when linking to oneself
    async fn link_partner(
        &self,
        user_uuid: &str,
        partner_name: &str,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<Relationship>;

    /// Removes the user's active link.
    async fn unlink_partner(&self, user_uuid: &str) -> Result<()>;
}
