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

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tibberlox_core::PriceFeed;
use tibberlox_types::PriceInfo;
use tracing::{debug, error, info, warn};

use crate::errors::{FeedError, FeedResult};
use crate::types::{GraphQlRequest, GraphQlResponse, HomeNode, HomeSummary, PriceNode, ViewerData};

pub const DEFAULT_ENDPOINT: &str = "https://api.tibber.com/v1-beta/gql";

const HOMES_QUERY: &str = "{ viewer { homes { id address { address1 postalCode city country } } } }";

const PRICE_QUERY: &str = "{ viewer { homes { id currentSubscription { priceInfo { \
    current { total currency startsAt } \
    today { total currency startsAt } \
    tomorrow { total currency startsAt } } } } } }";

/// Tibber GraphQL API client
#[derive(Clone)]
pub struct TibberClient {
    endpoint: String,
    token: String,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for TibberClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TibberClient")
            .field("endpoint", &self.endpoint)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

impl TibberClient {
    pub fn new(token: impl Into<String>) -> FeedResult<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, token)
    }

    /// Create a client talking to a custom GraphQL endpoint
    pub fn with_endpoint(endpoint: impl Into<String>, token: impl Into<String>) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FeedError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Set custom retry configuration
    #[must_use]
    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List the homes of the account in API order.
    pub fn homes(&self) -> FeedResult<Vec<HomeSummary>> {
        debug!("🔍 [TIBBER QUERY] Listing homes");
        let data: ViewerData = self.query(HOMES_QUERY)?;

        let homes: Vec<HomeSummary> = data
            .viewer
            .homes
            .into_iter()
            .enumerate()
            .map(|(index, home)| HomeSummary {
                index,
                id: home.id,
                address: home.address.unwrap_or_default(),
            })
            .collect();

        info!("🏠 [TIBBER] Account has {} home(s)", homes.len());
        Ok(homes)
    }

    /// Fetch current, today and tomorrow prices of the home at `home_index`.
    pub fn price_info(&self, home_index: usize) -> FeedResult<PriceInfo> {
        debug!("🔍 [TIBBER QUERY] Fetching price info for home {}", home_index);
        let data: ViewerData = self.query(PRICE_QUERY)?;
        let available = data.viewer.homes.len();

        let home: HomeNode = data
            .viewer
            .homes
            .into_iter()
            .nth(home_index)
            .ok_or(FeedError::HomeNotFound {
                index: home_index,
                available,
            })?;

        let node = home
            .current_subscription
            .and_then(|subscription| subscription.price_info)
            .ok_or(FeedError::NoSubscription(home_index))?;

        let info = PriceInfo {
            current: node.current.and_then(PriceNode::into_record),
            today: collect_records(node.today),
            tomorrow: collect_records(node.tomorrow),
        };

        debug!(
            "✅ [TIBBER RESULT] Home {}: {} prices today, {} tomorrow",
            home.id,
            info.today.len(),
            info.tomorrow.len()
        );
        Ok(info)
    }

    fn query<T: DeserializeOwned>(&self, query: &str) -> FeedResult<T> {
        let response = self.retry_request(|| {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.token)
                .json(&GraphQlRequest { query })
                .send()
        })?;

        match response.status() {
            StatusCode::OK => {
                let body: GraphQlResponse<T> = serde_json::from_str(&response.text()?)?;
                if !body.errors.is_empty() {
                    let message = body
                        .errors
                        .into_iter()
                        .map(|e| e.message)
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Err(FeedError::GraphQl(message));
                }
                body.data.ok_or(FeedError::EmptyResponse)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(FeedError::AuthenticationFailed)
            }
            status => {
                let message = response
                    .text()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(FeedError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Retry a request with exponential backoff
    fn retry_request<F>(&self, mut request_fn: F) -> FeedResult<Response>
    where
        F: FnMut() -> Result<Response, reqwest::Error>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            match request_fn() {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    error!("Request failed after {} attempts: {}", attempts, e);
                    return Err(FeedError::Http(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    std::thread::sleep(delay);
                    delay *= 2;
                }
            }
        }
    }
}

fn collect_records(nodes: Vec<Option<PriceNode>>) -> Vec<tibberlox_types::PriceRecord> {
    let total = nodes.len();
    let records: Vec<_> = nodes
        .into_iter()
        .flatten()
        .filter_map(PriceNode::into_record)
        .collect();
    if records.len() < total {
        warn!("Skipped {} price entries without a total", total - records.len());
    }
    records
}

/// One home of a Tibber account, usable as the price source of a snapshot cycle.
#[derive(Debug)]
pub struct TibberHome {
    client: TibberClient,
    home_index: usize,
    name: String,
}

impl TibberHome {
    pub fn new(client: TibberClient, home_index: usize) -> Self {
        Self {
            client,
            home_index,
            name: format!("tibber-home-{home_index}"),
        }
    }

    pub fn home_index(&self) -> usize {
        self.home_index
    }
}

impl PriceFeed for TibberHome {
    fn fetch(&self) -> anyhow::Result<PriceInfo> {
        Ok(self.client.price_info(self.home_index)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
