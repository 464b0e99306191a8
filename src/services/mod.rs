// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod discord;
pub mod identity;
pub mod oauth;
pub mod summaries;

pub use discord::DiscordClient;
pub use identity::{parse_bearer, IdentityResolver, ResolvedIdentity};
pub use oauth::{LoginError, LoginStage, OAuthResult, OAuthService};
pub use summaries::SummaryService;
