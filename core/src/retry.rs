//! Bounded retries around a `Transport`.
//!
//! Only transport failures are retried. Once the server has answered, the
//! response is returned as is, error statuses included; deciding what a
//! status means is the dispatcher's job.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// How many times to try a request, how long to wait after each failure,
/// and how long a single attempt may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Always at least 1.
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Set the attempt count; zero is raised to one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }
}

/// Sends requests through a transport, retrying transport failures.
#[derive(Debug, Clone)]
pub struct RetryingSender<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingSender<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request`, making up to `max_attempts` attempts.
    ///
    /// Each attempt gets `attempt_timeout`; a response that arrives after
    /// it counts as a timeout. Every failed attempt is followed by a
    /// `retry_delay` pause. If all attempts fail the error carries each
    /// attempt's failure in order.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let timeout = self.policy.attempt_timeout;
        let mut failures = Vec::with_capacity(max_attempts as usize);

        for attempt in 1..=max_attempts {
            debug!(method = %request.method, url = %request.url, attempt, "attempting request");
            let started = Instant::now();
            let result = self.transport.send(request, timeout).and_then(|response| {
                let elapsed = started.elapsed();
                if elapsed > timeout {
                    Err(TransportError::Timeout(format!(
                        "response after {elapsed:?} exceeded {timeout:?}"
                    )))
                } else {
                    Ok(response)
                }
            });
            match result {
                Ok(response) => return Ok(response),
                Err(err) => {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        attempt,
                        max_attempts,
                        error = %err,
                        "request attempt failed"
                    );
                    failures.push(err);
                    thread::sleep(self.policy.retry_delay);
                }
            }
        }

        Err(ApiError::RetriesExhausted { attempts: failures })
    }
}
