//! Thin reqwest client for the parts of the Nobl9 API the wizard needs:
//! client-credentials tokens, user lookup by email and manifest apply.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::project::{
    Applier, ApplyError, IdentityLookup, LookupError, ManifestObject, UserHandle,
};

const USERS_PATH: &str = "/api/usrmgmt/v2/users";
const APPLY_PATH: &str = "/api/apply";
const ORGANIZATION_HEADER: &str = "Organization";

#[derive(Debug, Error)]
pub enum Nobl9Error {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("failed to build HTTP client: {0}")]
    Builder(#[source] reqwest::Error),
}

impl Nobl9Error {
    fn transport(url: &str, source: reqwest::Error) -> Self {
        Nobl9Error::Transport {
            url: url.to_string(),
            source,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(default)]
    email: Option<String>,
}

/// The users endpoint answers either with a bare list or wrapped in `users`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UsersResponse {
    Wrapped { users: Vec<UserRecord> },
    Bare(Vec<UserRecord>),
}

impl UsersResponse {
    fn into_users(self) -> Vec<UserRecord> {
        match self {
            UsersResponse::Wrapped { users } | UsersResponse::Bare(users) => users,
        }
    }
}

/// Client-credentials exchange against the Nobl9 authorization server
pub async fn fetch_token(
    http: &reqwest::Client,
    auth_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, Nobl9Error> {
    let response = http
        .post(auth_url)
        .basic_auth(client_id, Some(client_secret))
        .form(&[("grant_type", "client_credentials"), ("scope", "m2m")])
        .send()
        .await
        .map_err(|e| Nobl9Error::transport(auth_url, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Nobl9Error::Status { status, body });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| Nobl9Error::Parse(e.to_string()))?;
    Ok(token.access_token)
}

/// Nobl9 API client bound to one access token
#[derive(Debug, Clone)]
pub struct Nobl9Client {
    http: reqwest::Client,
    base_url: String,
    organization: Option<String>,
    token: String,
}

impl Nobl9Client {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        organization: Option<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            organization,
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url).bearer_auth(&self.token);
        match &self.organization {
            Some(org) => builder.header(ORGANIZATION_HEADER, org),
            None => builder,
        }
    }

    /// Find a user by email; `Ok(None)` on 404 or an empty result
    pub async fn find_user(&self, email: &str) -> Result<Option<UserHandle>, Nobl9Error> {
        let url = self.url(USERS_PATH);
        let response = self
            .request(reqwest::Method::GET, &url)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| Nobl9Error::transport(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Nobl9Error::Status { status, body });
        }

        let users = response
            .json::<UsersResponse>()
            .await
            .map_err(|e| Nobl9Error::Parse(e.to_string()))?
            .into_users();

        // Prefer an exact email match; the endpoint may do prefix matching
        let found = users
            .iter()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .or_else(|| users.first())
            .map(|u| UserHandle::new(&u.user_id));

        debug!(email, found = found.is_some(), "Nobl9 user lookup");
        Ok(found)
    }

    /// Apply all objects in one request
    pub async fn apply_objects(&self, objects: &[ManifestObject]) -> Result<(), Nobl9Error> {
        let url = self.url(APPLY_PATH);
        let manifest: Vec<_> = objects.iter().map(ManifestObject::to_manifest).collect();

        info!("Applying {} objects to Nobl9", manifest.len());
        let response = self
            .request(reqwest::Method::PUT, &url)
            .header(CONTENT_TYPE, "application/json")
            .json(&manifest)
            .send()
            .await
            .map_err(|e| Nobl9Error::transport(&url, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Nobl9Error::Status { status, body })
    }
}

#[async_trait]
impl IdentityLookup for Nobl9Client {
    async fn lookup(&self, email: &str) -> Result<Option<UserHandle>, LookupError> {
        self.find_user(email)
            .await
            .map_err(|e| LookupError(e.to_string()))
    }
}

#[async_trait]
impl Applier for Nobl9Client {
    async fn apply(&self, objects: &[ManifestObject]) -> Result<(), ApplyError> {
        match self.apply_objects(objects).await {
            Ok(()) => Ok(()),
            Err(Nobl9Error::Status { status, body })
                if status == StatusCode::CONFLICT || body.contains("already exists") =>
            {
                Err(ApplyError::Conflict(format!("HTTP {}: {}", status, body)))
            }
            Err(e) => Err(ApplyError::Failed(e.to_string())),
        }
    }
}
