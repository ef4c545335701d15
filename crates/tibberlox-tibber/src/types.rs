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

//! Wire types of the Tibber GraphQL API.

use serde::{Deserialize, Serialize};
use tibberlox_types::PriceRecord;

#[derive(Debug, Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewerData {
    pub viewer: Viewer,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Viewer {
    #[serde(default)]
    pub homes: Vec<HomeNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HomeNode {
    pub id: String,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub current_subscription: Option<Subscription>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address1: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let part = |value: &Option<String>| value.clone().unwrap_or_default();
        write!(
            f,
            "{}, {} {}, {}",
            part(&self.address1),
            part(&self.postal_code),
            part(&self.city),
            part(&self.country)
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Subscription {
    pub price_info: Option<PriceInfoNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceInfoNode {
    pub current: Option<PriceNode>,
    #[serde(default)]
    pub today: Vec<Option<PriceNode>>,
    #[serde(default)]
    pub tomorrow: Vec<Option<PriceNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PriceNode {
    pub total: Option<f64>,
    pub currency: String,
    pub starts_at: String,
}

impl PriceNode {
    /// `None` when the API has no total for this hour yet.
    pub fn into_record(self) -> Option<PriceRecord> {
        let total = self.total?;
        Some(PriceRecord::new(total, self.currency, self.starts_at))
    }
}

/// A home of the account, listed so the user can pick `home_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeSummary {
    /// Position in the account's home list, used as `home_id`
    pub index: usize,
    pub id: String,
    pub address: Address,
}
