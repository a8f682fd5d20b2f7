//! Operation outcome types.
//!
//! Each session operation returns a tagged outcome instead of threading
//! loosely-typed optionals through callbacks, so the UI shell can match
//! exhaustively. Best-effort refreshes that fail do not fail the operation;
//! they are reported as warnings so tests (and telemetry) can observe the
//! degraded-but-successful paths.

use chrono::{DateTime, Utc};
use moment_core::user::UserProfile;

/// Where the app should navigate after the startup sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    /// No usable cached session; show the unauthenticated entry screen.
    RequireAuth,
    /// A valid cached session exists; go straight to home.
    Home(HomeState),
}

/// State surfaced to the home screen after a successful bootstrap.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeState {
    pub user_uuid: String,
    /// Cached profile, refreshed from the server when reachable.
    pub profile: Option<UserProfile>,
    /// Cached partner display name, `None` when no link is active (or the
    /// link was just invalidated).
    pub partner_name: Option<String>,
    /// Relationship start date, when the server-side link carries one.
    pub relationship_started_at: Option<DateTime<Utc>>,
    /// Non-fatal failures swallowed during best-effort refreshes.
    pub warnings: Vec<RefreshWarning>,
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub profile: UserProfile,
    pub partner_name: Option<String>,
    pub relationship_started_at: Option<DateTime<Utc>>,
    pub warnings: Vec<RefreshWarning>,
}

/// A best-effort step that failed without failing the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshWarning {
    /// The profile refresh against the server failed.
    ProfileRefresh(String),
    /// The relationship fetch or partner lookup failed.
    LinkRefresh(String),
    /// A local store write issued by a best-effort step failed.
    StoreWrite(String),
}

impl RefreshWarning {
    pub fn is_profile_refresh(&self) -> bool {
        matches!(self, Self::ProfileRefresh(_))
    }

    pub fn is_link_refresh(&self) -> bool {
        matches!(self, Self::LinkRefresh(_))
    }
}
