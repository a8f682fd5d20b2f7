//! Key-value-backed SessionStore implementation.
//!
//! Maps the session model onto the flat string key space shared with the
//! rest of the app:
//!
//! | key               | content                              |
//! |-------------------|--------------------------------------|
//! | `user:uuid`       | user identifier                      |
//! | `user:profile`    | JSON `{uuid, name, slogan, avatar}`  |
//! | `user:loginAt`    | epoch milliseconds, as string        |
//! | `user:linkId`     | partner-link token                   |
//! | `user:linkedUser` | cached partner display name          |

use crate::key_value_store::KeyValueStore;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use moment_core::error::Result;
use moment_core::link::PartnerLink;
use moment_core::session::{Identity, SessionSnapshot, SessionStore};
use moment_core::user::UserProfile;
use std::sync::Arc;

pub const KEY_USER_UUID: &str = "user:uuid";
pub const KEY_PROFILE: &str = "user:profile";
pub const KEY_LOGIN_AT: &str = "user:loginAt";
pub const KEY_LINK_ID: &str = "user:linkId";
pub const KEY_LINKED_USER: &str = "user:linkedUser";

/// A `SessionStore` over any [`KeyValueStore`].
///
/// Reads are lenient: a malformed timestamp or profile value is logged and
/// treated as absent rather than failing the load, so a corrupt cache entry
/// can never lock the user out of an otherwise valid session. I/O errors
/// from the underlying store do propagate; the caller fails safe on those.
pub struct KvSessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl KvSessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    fn parse_login_at(raw: &str) -> Option<DateTime<Utc>> {
        let millis: i64 = match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!("[KvSessionStore] Unparseable {} value: {:?}", KEY_LOGIN_AT, raw);
                return None;
            }
        };
        match Utc.timestamp_millis_opt(millis) {
            chrono::LocalResult::Single(ts) => Some(ts),
            _ => {
                tracing::warn!("[KvSessionStore] Out-of-range {} value: {}", KEY_LOGIN_AT, millis);
                None
            }
        }
    }

    fn parse_profile(raw: &str, user_uuid: Option<&str>) -> Option<UserProfile> {
        let profile: UserProfile = match serde_json::from_str(raw) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("[KvSessionStore] Unparseable {} value: {}", KEY_PROFILE, e);
                return None;
            }
        };
        // A cached profile for a different user is worse than no cache.
        if let Some(uuid) = user_uuid {
            if profile.uuid != uuid {
                tracing::warn!(
                    "[KvSessionStore] Dropping cached profile for {} (session user is {})",
                    profile.uuid,
                    uuid
                );
                return None;
            }
        }
        Some(profile)
    }
}

#[async_trait]
impl SessionStore for KvSessionStore {
    async fn load(&self) -> Result<SessionSnapshot> {
        let user_uuid = self.kv.get(KEY_USER_UUID).await?;
        let login_at = self
            .kv
            .get(KEY_LOGIN_AT)
            .await?
            .and_then(|raw| Self::parse_login_at(&raw));
        let profile = self
            .kv
            .get(KEY_PROFILE)
            .await?
            .and_then(|raw| Self::parse_profile(&raw, user_uuid.as_deref()));

        let link_key = self.kv.get(KEY_LINK_ID).await?;
        let partner_name = self.kv.get(KEY_LINKED_USER).await?;
        // A token with no name can be left behind by a crash between the two
        // writes; surface the link with an empty name rather than hiding it.
        let link = link_key.map(|link_key| PartnerLink {
            link_key,
            partner_name: partner_name.unwrap_or_default(),
        });

        Ok(SessionSnapshot {
            user_uuid,
            login_at,
            profile,
            link,
        })
    }

    async fn save_identity(&self, identity: &Identity) -> Result<()> {
        self.kv.set(KEY_USER_UUID, &identity.user_uuid).await?;
        let profile_json = serde_json::to_string(&identity.profile)?;
        self.kv.set(KEY_PROFILE, &profile_json).await?;
        self.kv
            .set(KEY_LOGIN_AT, &identity.login_at.timestamp_millis().to_string())
            .await?;
        Ok(())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let profile_json = serde_json::to_string(profile)?;
        self.kv.set(KEY_PROFILE, &profile_json).await
    }

    async fn save_link(&self, link: &PartnerLink) -> Result<()> {
        self.kv.set(KEY_LINK_ID, &link.link_key).await?;
        self.kv.set(KEY_LINKED_USER, &link.partner_name).await?;
        Ok(())
    }

    async fn clear_link(&self) -> Result<()> {
        self.kv.remove(KEY_LINK_ID).await?;
        self.kv.remove(KEY_LINKED_USER).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.kv.remove(KEY_USER_UUID).await?;
        self.kv.remove(KEY_PROFILE).await?;
        self.kv.remove(KEY_LOGIN_AT).await?;
        self.kv.remove(KEY_LINK_ID).await?;
        self.kv.remove(KEY_LINKED_USER).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_value_store::MemoryKeyValueStore;
    use chrono::Utc;

    fn store_with_kv() -> (KvSessionStore, Arc<MemoryKeyValueStore>) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        (KvSessionStore::new(kv.clone()), kv)
    }

    fn test_profile(uuid: &str) -> UserProfile {
        UserProfile {
            uuid: uuid.to_string(),
            name: "Mia".to_string(),
            slogan: "every moment counts".to_string(),
            avatar: "https://example.com/a.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_identity_round_trip() {
        let (store, _kv) = store_with_kv();
        let login_at = Utc::now();
        let identity = Identity::from_profile(test_profile("u-1"), login_at);

        store.save_identity(&identity).await.unwrap();
        let snapshot = store.load().await.unwrap();

        assert_eq!(snapshot.user_uuid.as_deref(), Some("u-1"));
        assert_eq!(snapshot.profile, Some(test_profile("u-1")));
        // Stored at millisecond precision.
        assert_eq!(
            snapshot.login_at.unwrap().timestamp_millis(),
            login_at.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_clear_removes_all_five_keys() {
        let (store, kv) = store_with_kv();
        store
            .save_identity(&Identity::from_profile(test_profile("u-1"), Utc::now()))
            .await
            .unwrap();
        store
            .save_link(&PartnerLink {
                link_key: "T1".to_string(),
                partner_name: "Noah".to_string(),
            })
            .await
            .unwrap();

        store.clear().await.unwrap();

        for key in [
            KEY_USER_UUID,
            KEY_PROFILE,
            KEY_LOGIN_AT,
            KEY_LINK_ID,
            KEY_LINKED_USER,
        ] {
            assert_eq!(kv.get(key).await.unwrap(), None, "key {} survived clear", key);
        }
    }

    #[tokio::test]
    async fn test_clear_link_removes_both_keys() {
        let (store, kv) = store_with_kv();
        store
            .save_link(&PartnerLink {
                link_key: "T1".to_string(),
                partner_name: "Noah".to_string(),
            })
            .await
            .unwrap();

        store.clear_link().await.unwrap();

        assert_eq!(kv.get(KEY_LINK_ID).await.unwrap(), None);
        assert_eq!(kv.get(KEY_LINKED_USER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_login_at_reads_as_absent() {
        let (store, kv) = store_with_kv();
        kv.set(KEY_USER_UUID, "u-1").await.unwrap();
        kv.set(KEY_LOGIN_AT, "not-a-number").await.unwrap();

        let snapshot = store.load().await.unwrap();
        assert_eq!(snapshot.user_uuid.as_deref(), Some("u-1"));
        assert_eq!(snapshot.login_at, None);
        assert!(!snapshot.is_valid_at(Utc::now()));
    }

    #[tokio::test]
    async fn test_mismatched_profile_uuid_is_dropped() {
        let (store, kv) = store_with_kv();
        kv.set(KEY_USER_UUID, "u-1").await.unwrap();
        let stale = serde_json::to_string(&test_profile("u-2")).unwrap();
        kv.set(KEY_PROFILE, &stale).await.unwrap();

        let snapshot = store.load().await.unwrap();
        assert_eq!(snapshot.profile, None);
    }

    #[tokio::test]
    async fn test_orphaned_link_key_loads_with_empty_name() {
        let (store, kv) = store_with_kv();
        kv.set(KEY_LINK_ID, "T1").await.unwrap();

        let snapshot = store.load().await.unwrap();
        let link = snapshot.link.unwrap();
        assert_eq!(link.link_key, "T1");
        assert_eq!(link.partner_name, "");
    }
}
