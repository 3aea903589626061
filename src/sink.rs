//! Submission sink — posts the collected answers to a form-intake endpoint.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::Form;

use crate::config::FormIntakeConfig;
use crate::error::SubmissionError;
use crate::intake::model::FormFields;

/// Receives the final answer set.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Deliver the fields. On success returns the endpoint's JSON reply, or an
    /// empty object when the reply is not JSON.
    async fn send(&self, fields: &FormFields) -> Result<serde_json::Value, SubmissionError>;
}

/// HTTP form-intake client: one multipart `POST` per submission.
///
/// No cookies are stored or sent; no retries.
pub struct FormIntakeClient {
    endpoint: String,
    client: reqwest::Client,
}

impl FormIntakeClient {
    pub fn new(config: &FormIntakeConfig) -> Result<Self, SubmissionError> {
        let url = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| SubmissionError::InvalidEndpoint(format!("{}: {e}", config.endpoint)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SubmissionError::InvalidEndpoint(config.endpoint.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    /// Build from `INTAKE_ENDPOINT` / `INTAKE_TIMEOUT_SECS`.
    pub fn from_env() -> crate::error::Result<Self> {
        let config = FormIntakeConfig::from_env()?;
        Ok(Self::new(&config)?)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionSink for FormIntakeClient {
    fn name(&self) -> &str {
        "form-intake"
    }

    async fn send(&self, fields: &FormFields) -> Result<serde_json::Value, SubmissionError> {
        let form = fields
            .iter()
            .fold(Form::new(), |form, (key, value)| form.text(*key, value.clone()));

        let resp = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(parse_reply(&body))
    }
}

/// Parse the endpoint's reply, treating anything that is not JSON as `{}`.
pub fn parse_reply(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| {
        tracing::debug!("Intake reply is not JSON ({}), treating as empty", e);
        serde_json::json!({})
    })
}
