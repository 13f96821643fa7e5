//! HTTP market-rate feed and the periodic poller behind `kd rates --watch`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kd_core::lead::{RateFeed, RateFeedError, RateQuote, parse_rates};
use serde_json::Value;

const FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the public exchange-rate document and extracts the quoted
/// symbols.
pub struct HttpRateFeed {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpRateFeed {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(FEED_TIMEOUT)
            .timeout_read(FEED_TIMEOUT)
            .build();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RateFeed for HttpRateFeed {
    async fn fetch(&self) -> Result<Vec<RateQuote>, RateFeedError> {
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();

        let document = tokio::task::spawn_blocking(move || -> Result<Value, RateFeedError> {
            let response = agent
                .get(&endpoint)
                .set("Accept", "application/json")
                .call()
                .map_err(|e| match e {
                    ureq::Error::Status(code, _) => {
                        RateFeedError::Transport(format!("HTTP {code}"))
                    }
                    ureq::Error::Transport(transport) => {
                        RateFeedError::Transport(transport.to_string())
                    }
                })?;
            serde_json::from_reader(response.into_reader())
                .map_err(|e| RateFeedError::Malformed(e.to_string()))
        })
        .await
        .map_err(|e| RateFeedError::Transport(format!("rate task failed: {e}")))??;

        parse_rates(&document)
    }
}

/// Polls a [`RateFeed`] on a fixed interval until shut down.
///
/// The first fetch happens immediately. Failures are logged and the
/// previous quotes stay in place; there is no retry between ticks.
pub struct RatePoller {
    feed: Arc<dyn RateFeed>,
    interval: Duration,
}

impl RatePoller {
    pub fn new(
        feed: Arc<dyn RateFeed>,
        interval: Duration,
    ) -> Self {
        Self { feed, interval }
    }

    /// Runs until `shutdown` resolves, handing every successful fetch to
    /// `on_update`. Returns the number of successful fetches.
    pub async fn run<S, F>(
        &self,
        shutdown: S,
        mut on_update: F,
    ) -> usize
    where
        S: Future<Output = ()>,
        F: FnMut(Vec<RateQuote>),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut updates = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!(updates, "rate poller stopped");
                    return updates;
                }
                _ = ticker.tick() => {
                    match self.feed.fetch().await {
                        Ok(quotes) => {
                            updates += 1;
                            on_update(quotes);
                        }
                        Err(e) => tracing::warn!(error = %e, "failed to fetch market rates"),
                    }
                }
            }
        }
    }
}
