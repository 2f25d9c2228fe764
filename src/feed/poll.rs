//! Polling quote feed transport.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::Stream;
use time::OffsetDateTime;
use tracing::debug;

use super::parser;
use crate::config::Config;
use crate::error::FeedError;
use crate::market::Quote;
use crate::metrics;

/// Infinite stream of quotes fetched from the book endpoint at the
/// configured interval. Fetch failures surface as stream items so the
/// caller can apply backoff; malformed payloads are silently dropped.
pub(super) fn quotes(config: Arc<Config>) -> impl Stream<Item = Result<Quote, FeedError>> {
    stream! {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                yield Err(FeedError::HttpError(e));
                return;
            }
        };

        let url = format!("{}/book", config.clob_url.trim_end_matches('/'));
        let interval = Duration::from_millis(config.poll_interval_ms);

        loop {
            match fetch_quote(&client, &url, &config.market_slug).await {
                Ok(Some(quote)) => yield Ok(quote),
                Ok(None) => {
                    metrics::inc_feed_messages_dropped();
                    debug!("dropping unparseable book payload");
                }
                Err(e) => yield Err(e),
            }
            tokio::time::sleep(interval).await;
        }
    }
}

async fn fetch_quote(
    client: &reqwest::Client,
    url: &str,
    market: &str,
) -> Result<Option<Quote>, FeedError> {
    let response = client.get(url).query(&[("market", market)]).send().await?;

    if !response.status().is_success() {
        return Err(FeedError::FetchFailed(format!(
            "HTTP {}",
            response.status()
        )));
    }

    let text = response.text().await?;
    Ok(parser::parse_quote(&text, OffsetDateTime::now_utc()))
}
