// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar aggregation across linked accounts.
//!
//! One calendar-list request per account, all in flight at once. A 401 is
//! retried exactly once with a freshly refreshed token. Every account gets a
//! status entry in the response whether or not its call succeeded.

use crate::error::GoogleError;
use crate::models::{
    AccountCredential, AccountDebug, AccountFetchResult, CalendarEntry, CalendarsResponse,
};
use crate::services::google::{CalendarPage, GoogleClient};
use futures_util::future::join_all;

/// Per-account progress through one aggregation pass.
///
/// `Success` and `Failed` are terminal. The refresh attempt is spent when
/// leaving `Refreshing`, so a second 401 always ends in `Failed`.
#[derive(Debug)]
enum FetchState {
    Requesting { token: String, refresh_spent: bool },
    Refreshing { original: GoogleError },
    Success(CalendarPage),
    Failed(GoogleError),
}

/// Outcome of one account's pass.
struct AccountOutcome {
    account_id: String,
    email: Option<String>,
    result: Result<CalendarPage, GoogleError>,
}

/// Fans calendar-list calls out over reconciled credentials.
#[derive(Clone)]
pub struct CalendarAggregator {
    google: GoogleClient,
}

impl CalendarAggregator {
    pub fn new(google: GoogleClient) -> Self {
        Self { google }
    }

    /// Fetch and flatten calendars for every credential.
    ///
    /// An empty credential set yields an empty response. With `debug` set,
    /// raw per-account status detail is attached.
    pub async fn aggregate(
        &self,
        credentials: &[AccountCredential],
        debug: bool,
    ) -> CalendarsResponse {
        let outcomes = join_all(credentials.iter().map(|c| self.fetch_account(c))).await;

        let mut calendars = Vec::new();
        let mut accounts = Vec::with_capacity(outcomes.len());
        let mut diagnostics = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            let (status, error) = match outcome.result {
                Ok(page) => {
                    calendars.extend(page.list.items.into_iter().map(|item| {
                        CalendarEntry::from_google(
                            &outcome.account_id,
                            outcome.email.as_deref(),
                            item,
                        )
                    }));
                    (page.status, None)
                }
                Err(e) => {
                    tracing::warn!(
                        account_id = %outcome.account_id,
                        status = e.status(),
                        error = %e,
                        "Calendar list failed for account"
                    );
                    (e.status(), e.message())
                }
            };

            if debug {
                diagnostics.push(AccountDebug {
                    account_id: outcome.account_id.clone(),
                    status,
                    error: error.clone(),
                });
            }
            accounts.push(AccountFetchResult {
                account_id: outcome.account_id,
                email: outcome.email,
                status,
                error,
            });
        }

        tracing::info!(
            accounts = accounts.len(),
            failed = accounts.iter().filter(|a| !a.is_success()).count(),
            calendars = calendars.len(),
            "Calendars aggregated"
        );

        CalendarsResponse {
            calendars,
            accounts,
            debug: debug.then_some(diagnostics),
        }
    }

    /// Drive one account through the fetch state machine.
    async fn fetch_account(&self, credential: &AccountCredential) -> AccountOutcome {
        let mut state = match credential.access_token() {
            Some(token) => FetchState::Requesting {
                token: token.to_string(),
                refresh_spent: false,
            },
            None => FetchState::Failed(GoogleError::MissingToken),
        };

        let result = loop {
            state = match state {
                FetchState::Requesting {
                    token,
                    refresh_spent,
                } => match self.google.list_calendars(&token).await {
                    Ok(page) => FetchState::Success(page),
                    Err(e)
                        if e.is_auth_failure()
                            && !refresh_spent
                            && credential.has_refresh_token() =>
                    {
                        FetchState::Refreshing { original: e }
                    }
                    Err(e) => FetchState::Failed(e),
                },
                FetchState::Refreshing { original } => {
                    let refresh_token = credential.refresh_token.as_deref().unwrap_or_default();
                    match self.google.refresh_access_token(refresh_token).await {
                        Ok(refreshed) => {
                            tracing::info!(
                                account_id = %credential.account_id,
                                "Retrying calendar list with refreshed token"
                            );
                            FetchState::Requesting {
                                token: refreshed.access_token,
                                refresh_spent: true,
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                account_id = %credential.account_id,
                                error = %e,
                                "Refresh after 401 failed"
                            );
                            FetchState::Failed(original)
                        }
                    }
                }
                FetchState::Success(page) => break Ok(page),
                FetchState::Failed(e) => break Err(e),
            };
        };

        AccountOutcome {
            account_id: credential.account_id.clone(),
            email: credential.email.clone(),
            result,
        }
    }
}
