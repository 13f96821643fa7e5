//! Lead sinks used by the CLI: the form webhook and a local JSON-lines
//! outbox.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use kd_core::lead::{LeadError, LeadSink, LeadSubmission};
use tokio::io::AsyncWriteExt;

use crate::config::LeadsConfig;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

/// Posts each lead to the form webhook as `data=<json>`, form-encoded.
pub struct WebhookLeadSink {
    agent: ureq::Agent,
    url: String,
}

impl WebhookLeadSink {
    pub fn new(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(WEBHOOK_TIMEOUT)
            .timeout_read(WEBHOOK_TIMEOUT)
            .timeout_write(WEBHOOK_TIMEOUT)
            .build();
        Self {
            agent,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LeadSink for WebhookLeadSink {
    async fn submit(&self, submission: &LeadSubmission) -> Result<(), LeadError> {
        let payload = submission.to_json()?;
        let agent = self.agent.clone();
        let url = self.url.clone();

        let response = tokio::task::spawn_blocking(move || {
            agent.post(&url).send_form(&[("data", payload.as_str())])
        })
        .await
        .map_err(|e| LeadError::Transport(format!("webhook task failed: {e}")))?;

        match response {
            Ok(response) => {
                tracing::info!(
                    status = response.status(),
                    form_type = ?submission.form_type(),
                    "lead delivered"
                );
                Ok(())
            }
            Err(ureq::Error::Status(code, _)) => Err(LeadError::Transport(format!(
                "webhook responded with HTTP {code}"
            ))),
            Err(ureq::Error::Transport(transport)) => {
                Err(LeadError::Transport(transport.to_string()))
            }
        }
    }
}

/// Appends each lead as one JSON line to a local file.
pub struct JsonLinesLeadSink {
    path: PathBuf,
}

impl JsonLinesLeadSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LeadSink for JsonLinesLeadSink {
    async fn submit(&self, submission: &LeadSubmission) -> Result<(), LeadError> {
        let mut line = submission.to_json()?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::info!(path = %self.path.display(), "lead written to outbox");
        Ok(())
    }
}

/// Where leads are sent, as chosen by `[leads]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadTarget {
    Webhook(String),
    Outbox(PathBuf),
}

impl LeadTarget {
    /// The webhook when one is configured, otherwise the outbox file.
    pub fn from_config(config: &LeadsConfig) -> Self {
        match &config.webhook_url {
            Some(url) if !url.trim().is_empty() => Self::Webhook(url.trim().to_string()),
            _ => Self::Outbox(config.outbox.clone()),
        }
    }

    pub fn into_sink(self) -> Box<dyn LeadSink> {
        match self {
            Self::Webhook(url) => Box::new(WebhookLeadSink::new(url)),
            Self::Outbox(path) => Box::new(JsonLinesLeadSink::new(path)),
        }
    }
}

impl fmt::Display for LeadTarget {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Webhook(url) => write!(f, "webhook {url}"),
            Self::Outbox(path) => write!(f, "outbox {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("kd-{}-{}.jsonl", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[tokio::test]
    async fn outbox_appends_one_line_per_lead() {
        let path = temp_path("outbox");
        let sink = JsonLinesLeadSink::new(&path);

        for name in ["Ayşe", "Mehmet"] {
            let submission =
                LeadSubmission::new("iletisim", &json!({ "adSoyad": name }), Utc::now()).unwrap();
            sink.submit(&submission).await.unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["adSoyad"], "Mehmet");
        assert_eq!(lines[0]["formType"], "iletisim");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn outbox_in_missing_directory_is_io_error() {
        let sink = JsonLinesLeadSink::new("/nonexistent-kd-dir/leads.jsonl");
        let submission = LeadSubmission::new("iletisim", &json!({}), Utc::now()).unwrap();

        let err = sink.submit(&submission).await.unwrap_err();

        assert!(matches!(err, LeadError::Io(_)));
    }

    #[tokio::test]
    async fn unreachable_webhook_is_transport_error() {
        let sink = WebhookLeadSink::new("http://127.0.0.1:9/hook");
        let submission = LeadSubmission::new("on-analiz", &json!({}), Utc::now()).unwrap();

        let err = sink.submit(&submission).await.unwrap_err();

        assert!(matches!(err, LeadError::Transport(_)));
    }

    #[test]
    fn webhook_wins_over_outbox() {
        let config = LeadsConfig {
            webhook_url: Some(" https://example.com/hook ".to_string()),
            outbox: PathBuf::from("x.jsonl"),
        };

        assert_eq!(
            LeadTarget::from_config(&config),
            LeadTarget::Webhook("https://example.com/hook".to_string())
        );
    }

    #[test]
    fn blank_webhook_falls_back_to_outbox() {
        let config = LeadsConfig {
            webhook_url: Some("  ".to_string()),
            outbox: PathBuf::from("x.jsonl"),
        };

        let target = LeadTarget::from_config(&config);

        assert_eq!(target, LeadTarget::Outbox(PathBuf::from("x.jsonl")));
        assert_eq!(target.to_string(), "outbox x.jsonl");
    }
}
