//! WebSocket quote feed transport.

use futures::{SinkExt, StreamExt};
use serde_json::json;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::parser;
use crate::config::Config;
use crate::error::WsError;
use crate::market::Quote;
use crate::metrics;

/// Connect, subscribe and forward quotes until the connection or the
/// channel closes. The caller owns reconnection.
pub(super) async fn run(config: &Config, tx: &mpsc::Sender<Quote>) -> Result<(), WsError> {
    info!(url = %config.ws_url, market = %config.market_slug, "connecting quote websocket");

    let (ws_stream, _) = connect_async(&config.ws_url)
        .await
        .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

    let (mut write, mut read) = ws_stream.split();

    let subscribe = json!({
        "type": "subscribe",
        "channel": "orderbook",
        "market": config.market_slug,
    });
    write
        .send(Message::Text(subscribe.to_string()))
        .await
        .map_err(|e| WsError::SendFailed(e.to_string()))?;

    info!("subscribed to orderbook channel");

    while let Some(message) = read.next().await {
        match message {
            Ok(Message::Text(text)) => {
                match parser::parse_quote(&text, OffsetDateTime::now_utc()) {
                    Some(quote) => {
                        if tx.send(quote).await.is_err() {
                            return Ok(());
                        }
                    }
                    None => {
                        metrics::inc_feed_messages_dropped();
                        debug!("dropping unparseable feed message");
                    }
                }
            }
            // tungstenite answers pings itself.
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(frame)) => {
                warn!(frame = ?frame, "websocket closed by peer");
                break;
            }
            Ok(_) => {}
            Err(e) => return Err(WsError::Tungstenite(e)),
        }
    }

    Ok(())
}
