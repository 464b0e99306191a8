// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord OAuth client.
//!
//! Handles:
//! - Authorization URL construction
//! - Code-for-token exchange
//! - Token-for-profile lookup
//!
//! No retries: a transport failure or non-2xx answer is returned to the
//! caller immediately.

use crate::config::{Config, ProviderEndpoints};
use crate::error::AppError;
use crate::models::{Credential, Profile};
use serde::Deserialize;

/// Discord API client.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    endpoints: ProviderEndpoints,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
}

impl DiscordClient {
    /// Create a new Discord client from the static OAuth settings.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints: config.discord_endpoints.clone(),
            client_id: config.discord_client_id.clone(),
            client_secret: config.discord_client_secret.clone(),
            redirect_uri: config.discord_redirect_uri.clone(),
            scope: config.discord_scope.clone(),
        }
    }

    /// URL the user is sent to for consent. No `state` parameter is added.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.endpoints.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope),
        )
    }

    /// Exchange an authorization code for a credential bundle.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential, AppError> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalAuth(format!("Token exchange request failed: {}", e)))?;

        let token: TokenResponse = check_response_json(response, "token exchange").await?;
        token.into_credential()
    }

    /// Get the profile of the token holder.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile, AppError> {
        let response = self
            .http
            .get(&self.endpoints.profile_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalAuth(format!("Profile request failed: {}", e)))?;

        let profile: ProfileResponse = check_response_json(response, "profile lookup").await?;
        profile.into_profile()
    }
}

/// Check response status and parse the JSON body.
///
/// A non-success status carries the raw provider body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = %status, operation, "Discord returned an error");
        return Err(provider_error(status, response.text().await));
    }

    response.json().await.map_err(|e| {
        AppError::InvalidProviderResponse(format!("Failed to parse {} response: {}", operation, e))
    })
}

/// Error for a non-success answer, carrying the raw body when it could be read.
fn provider_error<E: std::fmt::Display>(
    status: reqwest::StatusCode,
    body: Result<String, E>,
) -> AppError {
    match body {
        Ok(body) => AppError::ExternalAuth(body),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read Discord error body");
            AppError::ExternalAuth(format!("HTTP {} (body unreadable: {})", status, e))
        }
    }
}

/// Token endpoint response. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

impl TokenResponse {
    fn into_credential(self) -> Result<Credential, AppError> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::InvalidProviderResponse("missing access_token".to_string()))?;

        Ok(Credential {
            access_token,
            token_type: self.token_type,
            expires_in: self.expires_in,
            refresh_token: self.refresh_token,
            scope: self.scope,
        })
    }
}

/// Profile endpoint response. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
struct ProfileResponse {
    id: Option<String>,
    username: Option<String>,
    discriminator: Option<String>,
    global_name: Option<String>,
    avatar: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl ProfileResponse {
    fn into_profile(self) -> Result<Profile, AppError> {
        let external_id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::InvalidProviderResponse("missing user id".to_string()))?;

        Ok(Profile {
            external_id,
            username: self.username,
            discriminator: self.discriminator,
            global_name: self.global_name,
            avatar: self.avatar,
            extra: self.extra,
        })
    }
}
