//! HTTP implementation of the remote service.
//!
//! Talks to the MomentCount REST backend. Every successful response body is
//! a `{ "data": ... }` envelope; error responses carry a status code the
//! client maps to a typed error so the UI layer can pick a message without
//! string-matching.
//!
//! Configuration: base URL from the `MOMENTCOUNT_API_BASE` environment
//! variable, falling back to the hosted default.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moment_core::error::{MomentError, Result};
use moment_core::link::Relationship;
use moment_core::remote::RemoteService;
use moment_core::user::UserProfile;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://moment-count-server.vercel.app";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Remote service client over the MomentCount REST API.
#[derive(Clone)]
pub struct HttpRemoteService {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    name: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    #[serde(flatten)]
    profile: &'a UserProfile,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkRequest<'a> {
    user_uuid: &'a str,
    partner_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    relationship_start_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipDto {
    owner_uuid: String,
    partner_uuid: String,
    link_key: String,
    relationship_start_date: Option<DateTime<Utc>>,
}

impl From<RelationshipDto> for Relationship {
    fn from(dto: RelationshipDto) -> Self {
        Relationship {
            owner_uuid: dto.owner_uuid,
            partner_uuid: dto.partner_uuid,
            link_key: dto.link_key,
            started_at: dto.relationship_start_date,
        }
    }
}

impl HttpRemoteService {
    /// Creates a client against the given base URL (trailing slash trimmed).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built; a
    /// client without the request timeout is never handed out.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Creates a client from the environment.
    ///
    /// Reads `MOMENTCOUNT_API_BASE`, defaulting to the hosted server when
    /// the variable is unset.
    pub fn try_from_env() -> Result<Self> {
        let base_url =
            env::var("MOMENTCOUNT_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Maps a non-success response to a typed error.
    ///
    /// `linking` switches the 404/400 interpretation: on link requests a 404
    /// means "no user with that name" and a 400 means "tried to link to
    /// yourself"; elsewhere those statuses keep their generic meaning.
    async fn error_for(response: Response, linking: Option<&str>) -> MomentError {
        let status = response.status();
        match (status, linking) {
            (StatusCode::UNAUTHORIZED, _) => MomentError::InvalidCredentials,
            (StatusCode::NOT_FOUND, Some(partner)) => MomentError::not_found("user", partner),
            (StatusCode::CONFLICT, Some(partner)) => MomentError::AlreadyLinked(partner.to_string()),
            (StatusCode::BAD_REQUEST, Some(_)) => MomentError::SelfLink,
            _ => {
                let body = response.text().await.unwrap_or_default();
                MomentError::network(format!("Request failed {}: {}", status, body))
            }
        }
    }

    async fn read_data<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn get_user(&self, uuid: &str) -> Result<Option<UserProfile>> {
        let response = self
            .client
            .get(self.url(&format!("/users/{}", uuid)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response, None).await);
        }
        Ok(Some(Self::read_data(response).await?))
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<UserProfile> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest {
                name: username,
                password,
            })
            .send()
            .await?;

        // Some deployments answer a wrong name with 404 instead of 401;
        // both mean the credentials were rejected.
        if response.status() == StatusCode::NOT_FOUND {
            return Err(MomentError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response, None).await);
        }
        Self::read_data(response).await
    }

    async fn register_user(&self, profile: &UserProfile, password: &str) -> Result<UserProfile> {
        let response = self
            .client
            .post(self.url("/users"))
            .json(&RegisterRequest { profile, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, None).await);
        }
        Self::read_data(response).await
    }

    async fn upsert_user(&self, profile: &UserProfile) -> Result<UserProfile> {
        let response = self
            .client
            .put(self.url(&format!("/users/{}", profile.uuid)))
            .json(profile)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, None).await);
        }
        Self::read_data(response).await
    }

    async fn get_relationship(&self, user_uuid: &str) -> Result<Option<Relationship>> {
        let response = self
            .client
            .get(self.url(&format!("/relationships/{}", user_uuid)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response, None).await);
        }
        let dto: RelationshipDto = Self::read_data(response).await?;
        Ok(Some(dto.into()))
    }

    async fn link_partner(
        &self,
        user_uuid: &str,
        partner_name: &str,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<Relationship> {
        let response = self
            .client
            .post(self.url("/relationships"))
            .json(&LinkRequest {
                user_uuid,
                partner_name,
                relationship_start_date: started_at,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, Some(partner_name)).await);
        }
        let dto: RelationshipDto = Self::read_data(response).await?;
        Ok(dto.into())
    }

    async fn unlink_partner(&self, user_uuid: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/relationships/{}", user_uuid)))
            .send()
            .await?;

        // Unlinking an already-unlinked account is not an error worth
        // surfacing; the end state is the same.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response, None).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_status(status: u16) -> Response {
        http::Response::builder()
            .status(status)
            .body("")
            .unwrap()
            .into()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let service = HttpRemoteService::new("https://api.example.com/").unwrap();
        assert_eq!(service.url("/users/u-1"), "https://api.example.com/users/u-1");
    }

    #[tokio::test]
    async fn test_error_for_maps_link_statuses() {
        let err = HttpRemoteService::error_for(response_with_status(404), Some("Noah")).await;
        assert!(err.is_not_found());

        let err = HttpRemoteService::error_for(response_with_status(409), Some("Noah")).await;
        assert!(matches!(err, MomentError::AlreadyLinked(name) if name == "Noah"));

        let err = HttpRemoteService::error_for(response_with_status(400), Some("Noah")).await;
        assert!(matches!(err, MomentError::SelfLink));
    }

    #[tokio::test]
    async fn test_error_for_maps_unauthorized_and_generic_statuses() {
        let err = HttpRemoteService::error_for(response_with_status(401), None).await;
        assert!(err.is_invalid_credentials());

        // Outside a link request, 404 and 400 have no special meaning.
        let err = HttpRemoteService::error_for(response_with_status(400), None).await;
        assert!(err.is_network());

        let err = HttpRemoteService::error_for(response_with_status(500), None).await;
        assert!(err.is_network());
    }

    #[test]
    fn test_relationship_dto_deserializes_camel_case() {
        let json = r#"{
            "ownerUuid": "u-1",
            "partnerUuid": "u-2",
            "linkKey": "T1",
            "relationshipStartDate": "2024-02-14T00:00:00Z"
        }"#;
        let dto: RelationshipDto = serde_json::from_str(json).unwrap();
        let relationship: Relationship = dto.into();

        assert_eq!(relationship.owner_uuid, "u-1");
        assert_eq!(relationship.partner_uuid, "u-2");
        assert_eq!(relationship.link_key, "T1");
        assert!(relationship.started_at.is_some());
    }

    #[test]
    fn test_relationship_dto_start_date_optional() {
        let json = r#"{"ownerUuid": "u-1", "partnerUuid": "u-2", "linkKey": "T1"}"#;
        let dto: RelationshipDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.relationship_start_date, None);
    }

    #[test]
    fn test_envelope_unwraps_data() {
        let json = r#"{"data": {"uuid": "u-1", "name": "Mia", "slogan": "", "avatar": ""}}"#;
        let envelope: Envelope<UserProfile> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.uuid, "u-1");
        assert_eq!(envelope.data.name, "Mia");
    }

    #[test]
    fn test_link_request_serializes_camel_case() {
        let request = LinkRequest {
            user_uuid: "u-1",
            partner_name: "Noah",
            relationship_start_date: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userUuid"], "u-1");
        assert_eq!(json["partnerName"], "Noah");
        assert!(json.get("relationshipStartDate").is_none());
    }
}
