// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Summarizer API: Discord login and per-user summaries
//!
//! This crate provides the backend API that signs users in through
//! Discord OAuth and stores chat summaries that only their owner can
//! change.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::{SummaryStore, UserDirectory};
use services::{DiscordClient, IdentityResolver, OAuthService, SummaryService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub oauth: OAuthService,
    pub identity: IdentityResolver,
    pub summaries: SummaryService,
}

impl AppState {
    /// Wire the services around the given store handles.
    pub fn new(
        config: Config,
        users: Arc<dyn UserDirectory>,
        summaries: Arc<dyn SummaryStore>,
    ) -> Self {
        let discord = DiscordClient::new(&config);

        Self {
            oauth: OAuthService::new(discord.clone(), users.clone()),
            identity: IdentityResolver::new(discord),
            summaries: SummaryService::new(users, summaries),
            config,
        }
    }
}
