// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod calendar;
pub mod credential;

pub use account::{StoredAccount, TokenUpdate};
pub use calendar::{AccountDebug, AccountFetchResult, CalendarEntry, CalendarsResponse};
pub use credential::{AccountCredential, CredentialSource};
