use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use super::wire::{BalanceTransaction, CheckoutLineItem, CheckoutSession, Cursor, ErrorEnvelope, List, Payout};
use super::PaymentsApi;
use crate::error::{ReportError, Result};
use crate::settings::ApiKey;

const PAGE_SIZE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking Stripe client. Read-only: every call is a GET.
pub struct StripeClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl StripeClient {
    pub fn new(api_key: ApiKey, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("payout-report/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, ?query, "GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.api_key.expose())
            .query(query)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(error_from_response(status.as_u16(), &body));
        }
        Ok(response.json()?)
    }

    /// Follow `starting_after` cursors until the list reports no more pages.
    fn get_all<T: DeserializeOwned + Cursor>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut starting_after: Option<String> = None;

        loop {
            let mut page_query = query.to_vec();
            if let Some(cursor) = &starting_after {
                page_query.push(("starting_after", cursor.clone()));
            }

            let page: List<T> = self.get(path, &page_query)?;
            starting_after = page
                .data
                .last()
                .map(|item| item.cursor().to_string())
                .filter(|cursor| !cursor.is_empty());
            items.extend(page.data);

            if !page.has_more || starting_after.is_none() {
                break;
            }
            tracing::debug!(path, fetched = items.len(), "fetching next page");
        }

        Ok(items)
    }

    fn session_line_items(&self, session_id: &str) -> Result<Vec<CheckoutLineItem>> {
        self.get_all(
            &format!("/v1/checkout/sessions/{session_id}/line_items"),
            &[("limit", PAGE_SIZE.to_string())],
        )
    }
}

impl PaymentsApi for StripeClient {
    fn list_payouts(&self, limit: usize) -> Result<Vec<Payout>> {
        let page: List<Payout> =
            self.get("/v1/payouts", &[("limit", limit.clamp(1, PAGE_SIZE).to_string())])?;
        Ok(page.data)
    }

    fn retrieve_payout(&self, id: &str) -> Result<Payout> {
        self.get(&format!("/v1/payouts/{id}"), &[])
    }

    fn payout_balance_transactions(&self, payout_id: &str) -> Result<Vec<BalanceTransaction>> {
        self.get_all(
            "/v1/balance_transactions",
            &[
                ("payout", payout_id.to_string()),
                ("limit", PAGE_SIZE.to_string()),
                ("expand[]", "data.source".to_string()),
            ],
        )
    }

    fn checkout_sessions(&self, payment_intent: &str) -> Result<Vec<CheckoutSession>> {
        let page: List<CheckoutSession> = self.get(
            "/v1/checkout/sessions",
            &[
                ("payment_intent", payment_intent.to_string()),
                ("expand[]", "data.line_items".to_string()),
            ],
        )?;

        let mut sessions = page.data;
        for session in &mut sessions {
            if !session.has_more_items() {
                continue;
            }
            tracing::debug!(session = %session.id, "listing remaining line items");
            let items = self.session_line_items(&session.id)?;
            session.line_items = Some(List {
                data: items,
                has_more: false,
            });
        }
        Ok(sessions)
    }
}

/// Map a non-success response onto the error taxonomy, using Stripe's error
/// envelope for the message when the body has one.
pub(crate) fn error_from_response(status: u16, body: &str) -> ReportError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message.or(e.error.code))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {status}")
            } else {
                trimmed.to_string()
            }
        });

    match status {
        401 | 403 => ReportError::Authentication(message),
        404 => ReportError::NotFound(message),
        _ => ReportError::Api { status, message },
    }
}
