//! Session domain model.
//!
//! The session is the locally cached record proving a user is authenticated,
//! plus denormalized profile and partner-link data.

use crate::link::PartnerLink;
use crate::user::UserProfile;
use chrono::{DateTime, Duration, Utc};

/// Number of days a login stays valid without re-authenticating.
///
/// The window is anchored to the last explicit login or registration, not to
/// usage: merely reopening the app never refreshes `login_at`.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Point-in-time read of the stored session.
///
/// Every field is optional because the backing store is a flat key-value map
/// with no multi-key atomicity; a crash mid-write can leave any subset of
/// keys behind. Validity is decided by [`SessionSnapshot::is_valid_at`], so a
/// partial identity (uuid without a timestamp) simply reads as expired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// Stored user id, set at registration/login, cleared at logout
    pub user_uuid: Option<String>,
    /// Instant of the last successful login or registration
    pub login_at: Option<DateTime<Utc>>,
    /// Cached copy of the server-side profile
    pub profile: Option<UserProfile>,
    /// Cached partner link, if one is active
    pub link: Option<PartnerLink>,
}

impl SessionSnapshot {
    /// Returns true if the snapshot represents a usable session at `now`.
    ///
    /// Requires a stored user id and a login timestamp strictly less than
    /// [`SESSION_TTL_DAYS`] old. A `login_at` in the future is rejected as
    /// well: a stored timestamp must be at or before "now".
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.user_uuid.is_none() {
            return false;
        }
        match self.login_at {
            Some(login_at) => {
                let age = now - login_at;
                age >= Duration::zero() && age < Duration::days(SESSION_TTL_DAYS)
            }
            None => false,
        }
    }
}

/// The identity fields written together on a successful login/registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_uuid: String,
    pub profile: UserProfile,
    pub login_at: DateTime<Utc>,
}

impl Identity {
    /// Builds an identity from a freshly authenticated profile, stamped at
    /// `login_at`. The uuid is taken from the profile so the cached profile
    /// can never disagree with the stored user id.
    pub fn from_profile(profile: UserProfile, login_at: DateTime<Utc>) -> Self {
        Self {
            user_uuid: profile.uuid.clone(),
            profile,
            login_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_login_at(login_at: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            user_uuid: Some("u-1".to_string()),
            login_at: Some(login_at),
            profile: None,
            link: None,
        }
    }

    #[test]
    fn test_valid_just_inside_window() {
        let now = Utc::now();
        let login_at = now - Duration::days(7) + Duration::milliseconds(1);
        assert!(snapshot_with_login_at(login_at).is_valid_at(now));
    }

    #[test]
    fn test_invalid_just_outside_window() {
        let now = Utc::now();
        let login_at = now - Duration::days(7) - Duration::milliseconds(1);
        assert!(!snapshot_with_login_at(login_at).is_valid_at(now));
    }

    #[test]
    fn test_invalid_exactly_at_boundary() {
        let now = Utc::now();
        // The window is strict: exactly 7 days old is no longer valid.
        let login_at = now - Duration::days(7);
        assert!(!snapshot_with_login_at(login_at).is_valid_at(now));
    }

    #[test]
    fn test_invalid_future_login_at() {
        let now = Utc::now();
        let login_at = now + Duration::hours(1);
        assert!(!snapshot_with_login_at(login_at).is_valid_at(now));
    }

    #[test]
    fn test_invalid_without_uuid() {
        let now = Utc::now();
        let snapshot = SessionSnapshot {
            user_uuid: None,
            login_at: Some(now),
            profile: None,
            link: None,
        };
        assert!(!snapshot.is_valid_at(now));
    }

    #[test]
    fn test_invalid_without_login_at() {
        let now = Utc::now();
        let snapshot = SessionSnapshot {
            user_uuid: Some("u-1".to_string()),
            login_at: None,
            profile: None,
            link: None,
        };
        assert!(!snapshot.is_valid_at(now));
    }

    #[test]
    fn test_identity_uuid_matches_profile() {
        let mut profile = crate::user::UserProfile::new("u-42");
        profile.name = "Mia".to_string();
        let identity = Identity::from_profile(profile.clone(), Utc::now());
        assert_eq!(identity.user_uuid, profile.uuid);
    }
}
