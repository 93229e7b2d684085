//! HTTP client for the evaluator.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ClientError;
use crate::models::{EvaluationRequest, EvaluationResponse, LoanSchemes};

const USER_AGENT_VALUE: &str = concat!("loan-eval-client/", env!("CARGO_PKG_VERSION"));

/// Something that turns an application into a diagnosis.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest)
    -> Result<EvaluationResponse, ClientError>;
}

/// Talks to a remote evaluator over HTTP.
#[derive(Debug, Clone)]
pub struct EvaluationClient {
    client: reqwest::Client,
    evaluate_url: String,
    schemes_url: String,
}

impl EvaluationClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(default_headers)
            .build()
            .map_err(|e| ClientError::Transport {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            evaluate_url: config.evaluate_url(),
            schemes_url: config.schemes_url(),
        })
    }

    pub fn evaluate_url(&self) -> &str {
        &self.evaluate_url
    }

    /// Loan categories and their schemes, for populating the loan type control.
    pub async fn schemes(&self) -> Result<LoanSchemes, ClientError> {
        debug!(url = %self.schemes_url, "fetching loan schemes");
        let response = self.client.get(&self.schemes_url).send().await?;
        read_json(response).await
    }
}

#[async_trait]
impl Evaluator for EvaluationClient {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResponse, ClientError> {
        info!(url = %self.evaluate_url, loan_type = %request.loan_type, "requesting evaluation");

        // `.json()` sets Content-Type: application/json.
        let response = self
            .client
            .post(&self.evaluate_url)
            .json(request)
            .send()
            .await?;

        let evaluation: EvaluationResponse = read_json(response).await?;
        info!(diagnosis = %evaluation.diagnosis, category = %evaluation.category, "evaluation received");
        Ok(evaluation)
    }
}

/// Status check, then JSON decode, then schema check. Each step fails with
/// its own [`ClientError`] variant.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    debug!("Received response status: {}", status);

    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: status_message(status, &body),
        });
    }

    decode(&body)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ClientError::Decode {
            message: e.to_string(),
        })?;

    serde_json::from_value(value).map_err(|e| ClientError::Schema {
        message: e.to_string(),
    })
}

fn status_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(text)) = fields.get(key) {
                return text.clone();
            }
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string()
}
