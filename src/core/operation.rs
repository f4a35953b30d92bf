//! Long-running batch operation handle
//!
//! A submitted batch job is represented by a [`BatchOperation`] carrying the
//! server-assigned `Operation-Location` URL. The handle is owned by the
//! caller and never persisted by the library; it can be rebuilt from a saved
//! location via
//! [`TranslatorClient::resume_batch_operation`](crate::core::client::TranslatorClient::resume_batch_operation).

use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::core::client::decode_success;
use crate::core::errors::{Result, TranslatorError};
use crate::core::models::BatchJobState;
use crate::core::transport::{HttpRequest, Pipeline};

/// Controls the wait loop of [`BatchOperation::wait_for_completion`]
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Minimum time between consecutive status polls
    pub interval: Duration,
    /// Overall deadline for the wait; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// External signal that aborts the wait, not the remote job
    pub cancellation: Option<CancellationToken>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: None,
            cancellation: None,
        }
    }
}

impl PollOptions {
    /// Set the poll interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set an overall deadline for the wait
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Handle to a submitted batch translation job
#[derive(Clone)]
pub struct BatchOperation {
    pipeline: Pipeline,
    location: Url,
}

impl std::fmt::Debug for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOperation")
            .field("location", &self.location.as_str())
            .finish_non_exhaustive()
    }
}

impl BatchOperation {
    pub(crate) fn new(pipeline: Pipeline, location: Url) -> Self {
        Self { pipeline, location }
    }

    /// The operation-location URL this handle polls; save it to resume the
    /// operation from another client instance
    pub fn location(&self) -> &str {
        self.location.as_str()
    }

    /// Fetch the current job state once
    pub async fn poll(&self) -> Result<BatchJobState> {
        let request = HttpRequest::get(self.location.clone());
        let response = self.pipeline.send(request).await?;
        decode_success(response)
    }

    /// Poll until the job reaches a terminal status.
    ///
    /// The first poll happens immediately; every subsequent poll waits at
    /// least `options.interval` first. Terminal-but-failed statuses come
    /// back as ordinary states. A timeout or cancellation aborts only the
    /// wait; the handle stays valid and waiting may resume later.
    pub async fn wait_for_completion(&self, options: &PollOptions) -> Result<BatchJobState> {
        let wait = async {
            match &options.cancellation {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => Err(TranslatorError::Cancelled),
                        state = self.wait_loop(options.interval) => state,
                    }
                }
                None => self.wait_loop(options.interval).await,
            }
        };

        match options.timeout {
            Some(limit) => timeout(limit, wait)
                .await
                .map_err(|_| TranslatorError::TimedOut)?,
            None => wait.await,
        }
    }

    async fn wait_loop(&self, interval: Duration) -> Result<BatchJobState> {
        let mut first = true;
        loop {
            if !first {
                sleep(interval).await;
            }
            first = false;

            let state = self.poll().await?;
            if state.status.is_terminal() {
                info!("batch job {} finished with status {}", state.id, state.status);
                return Ok(state);
            }
            debug!("batch job {} is {}", state.id, state.status);
        }
    }
}
