// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token identity resolution.
//!
//! Every call re-validates the token against Discord; nothing is cached,
//! so a revoked token stops working on the very next request.

use crate::error::AppError;
use crate::models::Profile;
use crate::services::discord::DiscordClient;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity established for one request.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub external_id: String,
    pub profile: Profile,
}

/// Turns an `Authorization` header into a verified identity.
#[derive(Clone)]
pub struct IdentityResolver {
    discord: DiscordClient,
}

impl IdentityResolver {
    pub fn new(discord: DiscordClient) -> Self {
        Self { discord }
    }

    /// Resolve the caller. Every failure, including the provider being
    /// unreachable, is reported as `Unauthorized`.
    pub async fn resolve(&self, authorization: Option<&str>) -> Result<ResolvedIdentity, AppError> {
        let token = parse_bearer(authorization)?;

        let profile = self.discord.fetch_profile(token).await.map_err(|e| {
            tracing::warn!(error = %e, "Bearer token rejected");
            AppError::Unauthorized
        })?;

        Ok(ResolvedIdentity {
            external_id: profile.external_id.clone(),
            profile,
        })
    }
}

/// Extract the token from `Bearer <token>`.
///
/// The scheme is case-sensitive and separated by exactly one space.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AppError> {
    let token = header
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .ok_or(AppError::Unauthorized)?;

    if token.is_empty() || token.starts_with(' ') {
        return Err(AppError::Unauthorized);
    }
    Ok(token)
}
