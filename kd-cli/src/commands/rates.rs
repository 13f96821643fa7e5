use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use kd_core::lead::{RateFeed, RateQuote};

use crate::logging::log_task_error;
use crate::rates::RatePoller;

/// One fetch, printed as a table.
pub async fn once(feed: &dyn RateFeed) -> Result<String> {
    let quotes = feed.fetch().await.context("failed to fetch market rates")?;
    Ok(render(&quotes))
}

/// Prints a fresh table on every successful poll until Ctrl-C.
pub async fn watch(
    feed: Arc<dyn RateFeed>,
    interval: Duration,
) -> Result<()> {
    let poller = RatePoller::new(feed, interval);
    let shutdown = async {
        let result = tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C");
        log_task_error("ctrl-c listener", result);
    };

    let updates = poller
        .run(shutdown, |quotes| println!("{}\n", render(&quotes)))
        .await;
    tracing::info!(updates, "stopped watching market rates");
    Ok(())
}

pub fn render(quotes: &[RateQuote]) -> String {
    let mut lines = vec![format!("{:<4} {:>12} {:>12}", "Kod", "Alış", "Satış")];
    lines.extend(
        quotes
            .iter()
            .map(|q| format!("{:<4} {:>12} {:>12}", q.code, q.buying, q.selling)),
    );
    if let Some(updated_at) = quotes.first().map(|q| q.updated_at.as_str()).filter(|s| !s.is_empty()) {
        lines.push(format!("Güncelleme: {updated_at}"));
    }
    lines.join("\n")
}
