//! HTTP client for the club functions and the read-only REST listings.
//!
//! The three protected calls are thin proxies: attach the session token,
//! call the function, turn non-2xx answers into [`ClientError::Server`].
//! Club and app listings go straight to the REST interface and are merged
//! client-side.

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    app::{ClubApp, ToggleClubAppRequest, ToggleClubAppResponse},
    club::{Club, ClubRole, ProvisionClubRequest, ProvisionClubResponse, UserClub},
    usage::ClubUsageResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user_id: Uuid,
}

/// Membership row as returned by `/rest/v1/club_members`.
#[derive(Debug, Clone, Deserialize)]
pub struct MembershipRow {
    pub club_id: Uuid,
    #[serde(default)]
    pub role: Option<ClubRole>,
}

pub struct ClubClient {
    http: Client,
    base_url: String,
    api_key: String,
    session: Option<Session>,
}

impl ClubClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    pub async fn provision_club(
        &self,
        request: &ProvisionClubRequest,
    ) -> Result<ProvisionClubResponse, ClientError> {
        let session = self.session()?;
        let req = self
            .http
            .post(self.function_url("provision-club"))
            .json(request);
        self.send(self.authorize(req, session), "Failed to provision club")
            .await
    }

    pub async fn toggle_club_app(
        &self,
        request: &ToggleClubAppRequest,
    ) -> Result<ToggleClubAppResponse, ClientError> {
        let session = self.session()?;
        let req = self
            .http
            .post(self.function_url("toggle-club-app"))
            .json(request);
        self.send(self.authorize(req, session), "Failed to toggle club app")
            .await
    }

    pub async fn get_club_usage(&self, club_id: Uuid) -> Result<ClubUsageResponse, ClientError> {
        let session = self.session()?;
        let req = self
            .http
            .get(self.function_url("get-club-usage"))
            .query(&[("clubId", club_id.to_string())]);
        self.send(self.authorize(req, session), "Failed to get club usage")
            .await
    }

    /// Clubs the session user is an active member of, each tagged with the
    /// user's role there.
    pub async fn get_user_clubs(&self) -> Result<Vec<UserClub>, ClientError> {
        let session = self.session()?;

        let req = self.http.get(self.rest_url("club_members")).query(&[
            ("select", "club_id,role".to_string()),
            ("user_id", format!("eq.{}", session.user_id)),
            ("is_active", "eq.true".to_string()),
        ]);
        let memberships: Vec<MembershipRow> = self
            .send(self.authorize(req, session), "Failed to load club memberships")
            .await?;
        if memberships.is_empty() {
            return Ok(Vec::new());
        }

        let ids = memberships
            .iter()
            .map(|m| m.club_id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let req = self.http.get(self.rest_url("clubs")).query(&[
            ("select", "*".to_string()),
            ("id", format!("in.({ids})")),
            ("is_active", "eq.true".to_string()),
        ]);
        let clubs: Vec<Club> = self
            .send(self.authorize(req, session), "Failed to load clubs")
            .await?;

        Ok(merge_roles(clubs, &memberships))
    }

    pub async fn get_club_apps(&self, club_id: Uuid) -> Result<Vec<ClubApp>, ClientError> {
        let session = self.session()?;
        let req = self.http.get(self.rest_url("club_apps")).query(&[
            ("select", "*".to_string()),
            ("club_id", format!("eq.{club_id}")),
        ]);
        self.send(self.authorize(req, session), "Failed to load club apps")
            .await
    }

    fn session(&self) -> Result<&Session, ClientError> {
        self.session.as_ref().ok_or(ClientError::NotAuthenticated)
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{name}", self.base_url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authorize(&self, req: RequestBuilder, session: &Session) -> RequestBuilder {
        req.bearer_auth(&session.access_token)
            .header("apikey", &self.api_key)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Server {
            status: status.as_u16(),
            message: error_message(&body, fallback),
        })
    }
}

/// Pulls the human-readable message out of an error body: `error`, then
/// `message`, then `fallback`.
pub fn error_message(body: &str, fallback: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error", "message"]
                .into_iter()
                .find_map(|key| v.get(key).and_then(Value::as_str))
        })
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Attaches each club's membership role; a membership without a role reads
/// as `member`. Clubs keep the order the listing returned them in.
pub fn merge_roles(clubs: Vec<Club>, memberships: &[MembershipRow]) -> Vec<UserClub> {
    clubs
        .into_iter()
        .map(|club| {
            let role = memberships
                .iter()
                .find(|m| m.club_id == club.id)
                .and_then(|m| m.role)
                .unwrap_or(ClubRole::Member);
            UserClub { club, role }
        })
        .collect()
}
