// Availability check against the room's check-availability endpoint
// Every query carries a request token; only the newest token may touch the form

use crate::config::ClientConfig;
use crate::dates::DateRange;
use crate::form::{format_iso, FormState, PanelTone, RequestToken, SubmitState};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CHECK_FAILED_MESSAGE: &str = "Unable to check availability";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

// Payload returned by the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AvailabilityResult {
    pub available: bool,
    pub message: String,
}

impl AvailabilityResult {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub token: RequestToken,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[async_trait]
pub trait AvailabilityClient: Send + Sync + 'static {
    async fn check(&self, query: &AvailabilityQuery) -> Result<AvailabilityResult, AvailabilityError>;
}

pub struct HttpAvailabilityClient {
    client: reqwest::Client,
    endpoint: String,
    timeout_ms: u64,
}

impl HttpAvailabilityClient {
    pub fn new(endpoint: impl Into<String>, config: &ClientConfig) -> Result<Self, AvailabilityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AvailabilityError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, e: reqwest::Error) -> AvailabilityError {
        if e.is_timeout() {
            AvailabilityError::Timeout(self.timeout_ms)
        } else {
            AvailabilityError::NetworkError(e.to_string())
        }
    }
}

#[async_trait]
impl AvailabilityClient for HttpAvailabilityClient {
    async fn check(&self, query: &AvailabilityQuery) -> Result<AvailabilityResult, AvailabilityError> {
        let params = [
            ("check_in", format_iso(query.check_in)),
            ("check_out", format_iso(query.check_out)),
        ];

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AvailabilityError::ApiResponseError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<AvailabilityResult>()
            .await
            .map_err(|e| AvailabilityError::DecodeError(e.to_string()))
    }
}

/// Tracks issued request tokens and drives the message panel and submit
/// control from query outcomes.
#[derive(Debug, Default)]
pub struct AvailabilityChecker {
    issued: u64,
    latest: Option<RequestToken>,
    // Range of the most recent query; what Available/Unavailable refer to
    checked: Option<(NaiveDate, NaiveDate)>,
}

impl AvailabilityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<RequestToken> {
        self.latest
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest == Some(token)
    }

    /// True when the last issued query was for exactly this range.
    pub fn covers(&self, range: &DateRange) -> bool {
        self.checked.is_some() && self.checked == range.complete()
    }

    // Starts a new query; any older in-flight query becomes stale
    pub fn begin(
        &mut self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        form: &mut FormState,
    ) -> AvailabilityQuery {
        self.issued += 1;
        let token = RequestToken(self.issued);
        self.latest = Some(token);
        self.checked = Some((check_in, check_out));
        form.submit = SubmitState::Checking(token);

        debug!(token = token.0, check_in = %check_in, check_out = %check_out, "availability query issued");
        AvailabilityQuery {
            token,
            check_in,
            check_out,
        }
    }

    // A date was cleared: hide the panel, disable submit, drop in-flight queries
    pub fn reset(&mut self, form: &mut FormState) {
        self.latest = None;
        self.checked = None;
        form.panel.hide();
        form.submit = SubmitState::Unknown;
    }

    /// Applies a query outcome if `token` is still the latest one. Returns
    /// whether the form was updated.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<AvailabilityResult, AvailabilityError>,
        form: &mut FormState,
    ) -> bool {
        if !self.is_current(token) {
            debug!(token = token.0, latest = ?self.latest.map(|t| t.0), "dropping stale availability response");
            return false;
        }
        self.latest = None;

        match outcome {
            Ok(result) => {
                info!(token = token.0, available = result.available, message = %result.message, "availability checked");
                if result.available {
                    form.panel.show(PanelTone::Affirmative, result.message);
                    form.submit = SubmitState::Available;
                } else {
                    form.panel.show(PanelTone::Negative, result.message);
                    form.submit = SubmitState::Unavailable;
                }
            }
            Err(e) => {
                warn!(token = token.0, error = %e, "availability check failed");
                form.panel.show(PanelTone::Negative, CHECK_FAILED_MESSAGE);
                form.submit = SubmitState::Unknown;
            }
        }
        true
    }
}

// Scriptable client for tests
#[cfg(test)]
pub mod mock_client {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct MockAvailabilityClient {
        responses: Mutex<HashMap<(NaiveDate, NaiveDate), AvailabilityResult>>,
        delays: Mutex<HashMap<(NaiveDate, NaiveDate), Duration>>,
        fail_next_requests: AtomicUsize,
        request_count: AtomicUsize,
    }

    impl MockAvailabilityClient {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                delays: Mutex::new(HashMap::new()),
                fail_next_requests: AtomicUsize::new(0),
                request_count: AtomicUsize::new(0),
            }
        }

        pub fn set_response(&self, check_in: NaiveDate, check_out: NaiveDate, result: AvailabilityResult) {
            self.responses.lock().insert((check_in, check_out), result);
        }

        pub fn set_delay(&self, check_in: NaiveDate, check_out: NaiveDate, delay: Duration) {
            self.delays.lock().insert((check_in, check_out), delay);
        }

        pub fn fail_next_requests(&self, count: usize) {
            self.fail_next_requests.store(count, Ordering::SeqCst);
        }

        pub fn request_count(&self) -> usize {
            self.request_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AvailabilityClient for MockAvailabilityClient {
        async fn check(&self, query: &AvailabilityQuery) -> Result<AvailabilityResult, AvailabilityError> {
            self.request_count.fetch_add(1, Ordering::SeqCst);
            let key = (query.check_in, query.check_out);

            let delay = self.delays.lock().get(&key).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let fail_count = self.fail_next_requests.load(Ordering::SeqCst);
            if fail_count > 0 {
                self.fail_next_requests.store(fail_count - 1, Ordering::SeqCst);
                return Err(AvailabilityError::NetworkError("connection refused".to_string()));
            }

            Ok(self
                .responses
                .lock()
                .get(&key)
                .cloned()
                .unwrap_or_else(|| AvailabilityResult::available("Available")))
        }
    }
}
