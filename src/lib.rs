// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Yearview: year-at-a-glance calendar backend
//!
//! This crate provides the backend API that reconciles OAuth credentials for
//! a user's linked Google accounts and aggregates their calendar lists.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::AccountStore;
use services::{AccountReconciler, CalendarAggregator, GoogleClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub reconciler: AccountReconciler,
    pub aggregator: CalendarAggregator,
}

impl AppState {
    /// Wire services around an account store.
    pub fn new(config: Config, store: Arc<dyn AccountStore>) -> Self {
        let google = GoogleClient::new(&config);
        Self {
            reconciler: AccountReconciler::new(store, google.clone()),
            aggregator: CalendarAggregator::new(google),
            config,
        }
    }
}
