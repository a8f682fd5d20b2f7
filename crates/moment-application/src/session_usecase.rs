//! Session use case implementation.
//!
//! This module provides the `SessionUseCase` which owns every operation that
//! changes session or partner-link state: the startup bootstrap, login,
//! registration, logout, partner link/unlink, and profile updates. It
//! coordinates the injected `SessionStore` and `RemoteService` so call sites
//! depend on abstractions rather than ambient storage access.

use crate::outcome::{AuthOutcome, BootstrapOutcome, HomeState, RefreshWarning};
use chrono::{DateTime, Utc};
use moment_core::error::{MomentError, Result};
use moment_core::link::{PartnerLink, Relationship};
use moment_core::remote::RemoteService;
use moment_core::session::{Identity, SessionStore};
use moment_core::user::UserProfile;
use std::sync::Arc;
use uuid::Uuid;

/// Use case for session bootstrap and link reconciliation.
///
/// # Responsibilities
///
/// - Deciding the initial screen on process start (`bootstrap`)
/// - Creating the session on login/registration, destroying it on logout
/// - Reconciling the cached partner link against server state
/// - Mirroring link changes and profile edits into the local store
///
/// # Error policy
///
/// Authentication and registration failures are fatal to their operation and
/// propagate to the caller. Best-effort refreshes (profile, relationship)
/// never fail the surrounding operation; their failures are collected as
/// [`RefreshWarning`]s on the returned outcome. A store read failure during
/// bootstrap routes to the unauthenticated screen: fail safe, never open.
pub struct SessionUseCase {
    /// Store for the locally cached session
    store: Arc<dyn SessionStore>,
    /// Client for the remote MomentCount service
    remote: Arc<dyn RemoteService>,
}

impl SessionUseCase {
    /// Creates a new `SessionUseCase` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - Store for the locally cached session
    /// * `remote` - Client for the remote service
    pub fn new(store: Arc<dyn SessionStore>, remote: Arc<dyn RemoteService>) -> Self {
        Self { store, remote }
    }

    /// Runs the startup sequence and decides the initial screen.
    ///
    /// Invoked once per process start, before any screen renders.
    pub async fn bootstrap(&self) -> BootstrapOutcome {
        self.bootstrap_at(Utc::now()).await
    }

    /// Runs the startup sequence, evaluating session validity against `now`.
    ///
    /// Sequence:
    /// 1. Load the stored session; a read failure routes to `RequireAuth`.
    /// 2. Check the 7-day validity window; expired or absent routes to
    ///    `RequireAuth` with no network traffic.
    /// 3. Best-effort: refresh the cached profile from the server.
    /// 4. Best-effort: if a link is cached, reconcile it against the current
    ///    server-side relationship. A relationship whose key differs from
    ///    the cached one (or no relationship at all) means the partner
    ///    unlinked or relinked elsewhere: both link keys are cleared.
    ///
    /// Failures in steps 3-4 never block navigation to home; the user must
    /// not be locked out of a usable cached session because a refresh call
    /// failed.
    pub async fn bootstrap_at(&self, now: DateTime<Utc>) -> BootstrapOutcome {
        let snapshot = match self.store.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("[SessionUseCase] Store read failed during bootstrap: {}", e);
                return BootstrapOutcome::RequireAuth;
            }
        };

        if !snapshot.is_valid_at(now) {
            tracing::info!("[SessionUseCase] No valid session, requiring authentication");
            return BootstrapOutcome::RequireAuth;
        }
        let Some(user_uuid) = snapshot.user_uuid.clone() else {
            return BootstrapOutcome::RequireAuth;
        };

        let mut warnings = Vec::new();
        let mut profile = snapshot.profile.clone();

        // Best-effort profile refresh.
        match self.remote.get_user(&user_uuid).await {
            Ok(Some(fresh)) => {
                if let Err(e) = self.store.save_profile(&fresh).await {
                    tracing::warn!("[SessionUseCase] Failed to cache refreshed profile: {}", e);
                    warnings.push(RefreshWarning::StoreWrite(e.to_string()));
                }
                profile = Some(fresh);
            }
            Ok(None) => {
                tracing::debug!(
                    "[SessionUseCase] Server has no record of user {}, keeping cached profile",
                    user_uuid
                );
            }
            Err(e) => {
                tracing::warn!("[SessionUseCase] Profile refresh failed: {}", e);
                warnings.push(RefreshWarning::ProfileRefresh(e.to_string()));
            }
        }

        // Best-effort link reconciliation.
        let mut partner_name = snapshot.link.as_ref().map(|l| l.partner_name.clone());
        let mut relationship_started_at = None;
        if let Some(link) = snapshot.link.as_ref() {
            match self.remote.get_relationship(&user_uuid).await {
                Ok(Some(relationship)) if relationship.link_key == link.link_key => {
                    relationship_started_at = relationship.started_at;
                }
                Ok(_) => {
                    // No relationship, or a different key: the partner
                    // unlinked or relinked elsewhere.
                    tracing::info!(
                        "[SessionUseCase] Cached link {} no longer valid, clearing",
                        link.link_key
                    );
                    if let Err(e) = self.store.clear_link().await {
                        tracing::warn!("[SessionUseCase] Failed to clear invalidated link: {}", e);
                        warnings.push(RefreshWarning::StoreWrite(e.to_string()));
                    }
                    partner_name = None;
                }
                Err(e) => {
                    tracing::warn!("[SessionUseCase] Relationship refresh failed: {}", e);
                    warnings.push(RefreshWarning::LinkRefresh(e.to_string()));
                }
            }
        }

        tracing::info!("[SessionUseCase] Bootstrap complete for user {}", user_uuid);
        BootstrapOutcome::Home(HomeState {
            user_uuid,
            profile,
            partner_name,
            relationship_started_at,
            warnings,
        })
    }

    /// Authenticates and creates the local session.
    ///
    /// The identity write must complete before success is signalled. The
    /// relationship fetch that follows is best-effort: its failure degrades
    /// to "no partner cached" rather than failing the login.
    ///
    /// # Errors
    ///
    /// `MomentError::InvalidCredentials` for a rejected username/password
    /// pair, `MomentError::Network` for transport failures, and store errors
    /// if the identity write fails. No identity state is stored on error.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthOutcome> {
        tracing::info!("[SessionUseCase] Logging in as {}", username);
        let profile = self.remote.authenticate(username, password).await?;

        let identity = Identity::from_profile(profile.clone(), Utc::now());
        self.store.save_identity(&identity).await?;

        let (partner_name, relationship_started_at, warnings) =
            self.cache_relationship(&profile.uuid).await;

        tracing::info!("[SessionUseCase] Logged in as user {}", profile.uuid);
        Ok(AuthOutcome {
            profile,
            partner_name,
            relationship_started_at,
            warnings,
        })
    }

    /// Registers a new account and creates the local session.
    ///
    /// The uuid is generated client-side and upserted, so the profile is
    /// complete before the server ever sees it. A missing relationship is
    /// expected for a fresh account and produces no warning.
    pub async fn register(
        &self,
        name: &str,
        slogan: &str,
        avatar: &str,
        password: &str,
    ) -> Result<AuthOutcome> {
        let profile = UserProfile {
            uuid: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            slogan: slogan.trim().to_string(),
            avatar: avatar.to_string(),
        };
        tracing::info!("[SessionUseCase] Registering user {}", profile.uuid);

        let stored = self.remote.register_user(&profile, password).await?;

        let identity = Identity::from_profile(stored.clone(), Utc::now());
        self.store.save_identity(&identity).await?;

        let (partner_name, relationship_started_at, warnings) =
            self.cache_relationship(&stored.uuid).await;

        Ok(AuthOutcome {
            profile: stored,
            partner_name,
            relationship_started_at,
            warnings,
        })
    }

    /// Destroys the local session.
    ///
    /// Never fails observably: local errors are logged and the caller always
    /// ends up routed to the unauthenticated entry screen.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!("[SessionUseCase] Failed to clear session on logout: {}", e);
        } else {
            tracing::info!("[SessionUseCase] Session cleared");
        }
    }

    /// Mirrors the outcome of an already-completed link/unlink RPC.
    ///
    /// With both a partner name and a link key, the pair is cached; with
    /// either absent, both keys are removed. The start date is accepted for
    /// signature compatibility with the UI callback but is not persisted in
    /// this layer; it lives in in-memory UI state only.
    pub async fn update_link(
        &self,
        partner_name: Option<&str>,
        _started_at: Option<DateTime<Utc>>,
        link_key: Option<&str>,
    ) -> Result<()> {
        match (partner_name, link_key) {
            (Some(partner_name), Some(link_key)) => {
                self.store
                    .save_link(&PartnerLink {
                        link_key: link_key.to_string(),
                        partner_name: partner_name.to_string(),
                    })
                    .await
            }
            _ => self.store.clear_link().await,
        }
    }

    /// Requests a partner link from the server and mirrors it locally.
    ///
    /// # Errors
    ///
    /// - `MomentError::NotAuthenticated` when no user id is stored
    /// - `MomentError::NotFound` when no user has that display name
    /// - `MomentError::AlreadyLinked` when the partner is linked elsewhere
    /// - `MomentError::SelfLink` when linking to oneself
    pub async fn link_partner(
        &self,
        partner_name: &str,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<Relationship> {
        let user_uuid = self.require_user_uuid().await?;

        let relationship = self
            .remote
            .link_partner(&user_uuid, partner_name, started_at)
            .await?;

        self.store
            .save_link(&PartnerLink {
                link_key: relationship.link_key.clone(),
                partner_name: partner_name.to_string(),
            })
            .await?;

        tracing::info!(
            "[SessionUseCase] Linked user {} to partner {}",
            user_uuid,
            partner_name
        );
        Ok(relationship)
    }

    /// Removes the active partner link on the server and locally.
    pub async fn unlink_partner(&self) -> Result<()> {
        let user_uuid = self.require_user_uuid().await?;

        self.remote.unlink_partner(&user_uuid).await?;
        self.store.clear_link().await?;

        tracing::info!("[SessionUseCase] Unlinked user {}", user_uuid);
        Ok(())
    }

    /// Pushes edited profile fields to the server and refreshes the cache.
    pub async fn update_profile(
        &self,
        name: &str,
        slogan: &str,
        avatar: &str,
    ) -> Result<UserProfile> {
        let user_uuid = self.require_user_uuid().await?;

        let profile = UserProfile {
            uuid: user_uuid,
            name: name.trim().to_string(),
            slogan: slogan.trim().to_string(),
            avatar: avatar.to_string(),
        };
        let stored = self.remote.upsert_user(&profile).await?;
        self.store.save_profile(&stored).await?;
        Ok(stored)
    }

    async fn require_user_uuid(&self) -> Result<String> {
        self.store
            .load()
            .await?
            .user_uuid
            .ok_or(MomentError::NotAuthenticated)
    }

    /// Best-effort relationship fetch after login/registration.
    ///
    /// Caches the link key even when the partner's display name cannot be
    /// resolved; the name then stays empty until the next refresh. A missing
    /// relationship is normal and produces nothing.
    async fn cache_relationship(
        &self,
        user_uuid: &str,
    ) -> (Option<String>, Option<DateTime<Utc>>, Vec<RefreshWarning>) {
        let mut warnings = Vec::new();

        match self.remote.get_relationship(user_uuid).await {
            Ok(Some(relationship)) => {
                let partner_name = match self.remote.get_user(&relationship.partner_uuid).await {
                    Ok(Some(partner)) => Some(partner.name),
                    Ok(None) => None,
                    Err(e) => {
                        tracing::warn!("[SessionUseCase] Partner lookup failed: {}", e);
                        warnings.push(RefreshWarning::LinkRefresh(e.to_string()));
                        None
                    }
                };

                let link = PartnerLink {
                    link_key: relationship.link_key.clone(),
                    partner_name: partner_name.clone().unwrap_or_default(),
                };
                if let Err(e) = self.store.save_link(&link).await {
                    tracing::warn!("[SessionUseCase] Failed to cache link: {}", e);
                    warnings.push(RefreshWarning::StoreWrite(e.to_string()));
                }

                (partner_name, relationship.started_at, warnings)
            }
            Ok(None) => (None, None, warnings),
            Err(e) => {
                tracing::warn!("[SessionUseCase] Relationship fetch failed: {}", e);
                warnings.push(RefreshWarning::LinkRefresh(e.to_string()));
                (None, None, warnings)
            }
        }
    }
}
