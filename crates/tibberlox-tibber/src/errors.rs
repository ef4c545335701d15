// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tibberlox.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed, check the API token")]
    AuthenticationFailed,

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("response contained no data")]
    EmptyResponse,

    #[error("home {index} not found, account has {available} home(s)")]
    HomeNotFound { index: usize, available: usize },

    #[error("home {0} has no active subscription with price information")]
    NoSubscription(usize),

    #[error("failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("client configuration error: {0}")]
    Config(String),
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;
