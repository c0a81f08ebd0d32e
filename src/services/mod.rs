// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Business logic services.

pub mod aggregator;
pub mod google;
pub mod reconciler;

pub use aggregator::CalendarAggregator;
pub use google::{CalendarPage, GoogleClient, RefreshedToken};
pub use reconciler::AccountReconciler;
