// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization-code login flow.
//!
//! `AwaitingCode → Exchanging → FetchingProfile → Upserted`, or `Failed`
//! from any step. Nothing is written until the profile has been fetched,
//! and then exactly one upsert is issued.

use crate::db::UserDirectory;
use crate::error::AppError;
use crate::models::{Credential, Profile, User};
use crate::services::discord::DiscordClient;
use std::fmt;
use std::sync::Arc;

/// Steps of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    AwaitingCode,
    Exchanging,
    FetchingProfile,
    Upserting,
    Upserted,
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginStage::AwaitingCode => "awaiting_code",
            LoginStage::Exchanging => "exchanging",
            LoginStage::FetchingProfile => "fetching_profile",
            LoginStage::Upserting => "upserting",
            LoginStage::Upserted => "upserted",
        };
        f.write_str(name)
    }
}

/// A login that reached `Failed`, with the step it failed in.
#[derive(Debug, thiserror::Error)]
#[error("Login failed while {stage}: {source}")]
pub struct LoginError {
    pub stage: LoginStage,
    #[source]
    pub source: AppError,
}

impl From<LoginError> for AppError {
    fn from(err: LoginError) -> Self {
        err.source
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct OAuthResult {
    pub user: User,
    pub profile: Profile,
    pub credential: Credential,
    /// True on the user's first login.
    pub created: bool,
}

/// Runs the login flow and records the user.
#[derive(Clone)]
pub struct OAuthService {
    discord: DiscordClient,
    users: Arc<dyn UserDirectory>,
}

impl OAuthService {
    pub fn new(discord: DiscordClient, users: Arc<dyn UserDirectory>) -> Self {
        Self { discord, users }
    }

    /// Provider authorization URL for `/login`.
    pub fn login_url(&self) -> String {
        self.discord.authorization_url()
    }

    /// Handle OAuth callback: exchange the code, fetch the profile, upsert the user.
    pub async fn handle_callback(&self, code: Option<&str>) -> Result<OAuthResult, LoginError> {
        let mut stage = LoginStage::AwaitingCode;
        let result = self.run(code, &mut stage).await;

        match &result {
            Ok(outcome) => tracing::info!(
                external_id = %outcome.user.external_id,
                created = outcome.created,
                "Login complete"
            ),
            Err(e) => tracing::warn!(stage = %stage, error = %e, "Login failed"),
        }

        result.map_err(|source| LoginError { stage, source })
    }

    async fn run(
        &self,
        code: Option<&str>,
        stage: &mut LoginStage,
    ) -> Result<OAuthResult, AppError> {
        let code = code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::InvalidRequest("No code provided".to_string()))?;

        advance(stage, LoginStage::Exchanging);
        let credential = self.discord.exchange_code(code).await?;

        advance(stage, LoginStage::FetchingProfile);
        let profile = self.discord.fetch_profile(&credential.access_token).await?;

        advance(stage, LoginStage::Upserting);
        let outcome = self
            .users
            .upsert(&profile.external_id, credential.clone(), profile.fields())
            .await?;

        advance(stage, LoginStage::Upserted);
        Ok(OAuthResult {
            user: outcome.user,
            profile,
            credential,
            created: outcome.created,
        })
    }
}

fn advance(stage: &mut LoginStage, next: LoginStage) {
    tracing::debug!(from = %stage, to = %next, "Login stage transition");
    *stage = next;
}
