use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::client::{fetch_token, Nobl9Client, Nobl9Error};
use crate::config::Nobl9Config;
use crate::project::{Session, SessionError, SessionProvider};

/// Opens an authenticated Nobl9 session per request.
///
/// The HTTP connection pool is shared; tokens are not.
pub struct Nobl9SessionProvider {
    http: reqwest::Client,
    config: Nobl9Config,
}

impl Nobl9SessionProvider {
    pub fn new(config: &Nobl9Config) -> Result<Self, Nobl9Error> {
        if config.skip_tls_verify {
            warn!("SSL certificate verification is DISABLED (NOBL9_SKIP_TLS_VERIFY=true)");
        } else {
            info!("TLS verification is enabled");
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.skip_tls_verify)
            .timeout(config.timeout())
            .build()
            .map_err(Nobl9Error::Builder)?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl SessionProvider for Nobl9SessionProvider {
    async fn open(&self) -> Result<Session, SessionError> {
        let (client_id, client_secret) =
            match (&self.config.client_id, &self.config.client_secret) {
                (Some(id), Some(secret)) => (id, secret),
                _ => {
                    return Err(SessionError::Credentials(
                        "NOBL9_CLIENT_ID and NOBL9_CLIENT_SECRET must be set".to_string(),
                    ))
                }
            };

        let token = fetch_token(&self.http, &self.config.auth_url, client_id, client_secret)
            .await
            .map_err(|e| SessionError::Client(e.to_string()))?;

        let client = Arc::new(Nobl9Client::new(
            self.http.clone(),
            self.config.base_url.clone(),
            self.config.organization.clone(),
            token,
        ));

        Ok(Session {
            lookup: client.clone(),
            applier: client,
        })
    }
}
