//! Backend trigger client
//!
//! Fire-and-forget calls that start long-running jobs on the job service.
//! The service answers immediately with `{success, message?}`; the job
//! itself runs asynchronously and writes back through the content store.
//!
//! Each call is bounded by [`TriggerConfig::timeout`]. On expiry the
//! in-flight request future is dropped, which aborts the request.

use crate::config::TriggerConfig;
use crate::error::{JobKind, TriggerError, TriggerFailure};
use async_trait::async_trait;
use newsboard_core::ItemId;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Writing job endpoint, relative to the base URL
pub const WRITING_PATH: &str = "articles/trigger-writing";

/// Planning job endpoint, relative to the base URL
pub const PLANNING_PATH: &str = "planning/trigger-planning";

/// Job-service acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
struct TriggerWritingRequest<'a> {
    article_id: &'a str,
}

#[derive(Debug, Serialize)]
struct TriggerPlanningRequest {}

/// Side-effect triggers against the job service
#[async_trait]
pub trait JobTrigger: Send + Sync {
    /// Start the writing job for an item
    async fn trigger_writing(&self, item_id: &ItemId) -> Result<JobAck, TriggerError>;

    /// Start an editorial planning run
    async fn trigger_planning(&self) -> Result<JobAck, TriggerError>;
}

/// HTTP implementation of [`JobTrigger`]
#[derive(Debug, Clone)]
pub struct HttpJobTrigger {
    http: Client,
    config: TriggerConfig,
}

impl HttpJobTrigger {
    /// Create client from configuration
    ///
    /// # Errors
    /// The HTTP client could not be initialised (TLS backend)
    pub fn new(config: TriggerConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().build()?;
        Ok(Self::with_client(http, config))
    }

    /// Create client over an existing HTTP client
    #[inline]
    #[must_use]
    pub fn with_client(http: Client, config: TriggerConfig) -> Self {
        Self { http, config }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    async fn post<B>(&self, job: JobKind, path: &str, body: &B) -> Result<JobAck, TriggerError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.config.endpoint(path);
        let mut request = self.http.post(&url).json(body);

        match &self.config.api_key {
            Some(key) => request = request.bearer_auth(key),
            None if self.config.require_api_key => {
                return Err(TriggerError::new(job, TriggerFailure::MissingApiKey));
            }
            None => {}
        }

        let exchange = async {
            let response = request.send().await.map_err(|e| classify_transport(&e))?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED {
                return Err(TriggerFailure::Unauthorized);
            }
            if !status.is_success() {
                return Err(TriggerFailure::RequestFailed {
                    status: status.as_u16(),
                });
            }

            let ack: JobAck = response
                .json()
                .await
                .map_err(|e| classify_transport(&e))?;
            if !ack.success {
                return Err(TriggerFailure::Processing {
                    message: ack.message,
                });
            }
            Ok::<_, TriggerFailure>(ack)
        };

        let outcome = match tokio::time::timeout(self.config.timeout(), exchange).await {
            Ok(result) => result,
            Err(_) => Err(TriggerFailure::TimedOut {
                after_ms: self.config.timeout_ms,
            }),
        };

        match outcome {
            Ok(ack) => {
                tracing::info!(job = %job, url = %url, "backend job triggered");
                Ok(ack)
            }
            Err(reason) => {
                tracing::warn!(job = %job, url = %url, reason = %reason, "backend job trigger failed");
                Err(TriggerError::new(job, reason))
            }
        }
    }
}

#[async_trait]
impl JobTrigger for HttpJobTrigger {
    async fn trigger_writing(&self, item_id: &ItemId) -> Result<JobAck, TriggerError> {
        let body = TriggerWritingRequest {
            article_id: item_id.as_str(),
        };
        self.post(JobKind::Writing, WRITING_PATH, &body).await
    }

    async fn trigger_planning(&self) -> Result<JobAck, TriggerError> {
        self.post(JobKind::Planning, PLANNING_PATH, &TriggerPlanningRequest {})
            .await
    }
}

fn classify_transport(error: &reqwest::Error) -> TriggerFailure {
    if error.is_timeout() {
        // Only reachable when the caller supplied a client with its own timeout.
        return TriggerFailure::TimedOut { after_ms: 0 };
    }
    TriggerFailure::Network(error.to_string())
}
