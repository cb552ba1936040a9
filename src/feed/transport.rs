// Feed transport — WebSocket subscriber for the real-time post feed.
//
// Connects to the relay, sends the bearer token once, then turns every text
// frame into a FeedEvent and forwards it over an mpsc channel in arrival
// order. Reconnects with exponential backoff until shutdown is signalled.
// The transport owns disconnects; consumers just stop receiving events.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use tracing::{debug, info, warn};

use super::events::{self, FeedEvent};
use super::rules::NotificationRules;

/// Connection settings for the feed relay.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub url: String,
    /// Bearer token sent once after connecting.
    pub token: Option<String>,
    /// Initial delay before a reconnection attempt.
    pub reconnect_delay: Duration,
    /// Cap for the exponential backoff.
    pub max_reconnect_delay: Duration,
}

impl TransportConfig {
    pub fn new(url: &str, token: Option<String>) -> Self {
        Self {
            url: url.to_string(),
            token,
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct AuthMessage<'a> {
    #[serde(rename = "type")]
    msg_type: &'a str,
    token: &'a str,
}

/// Build the one-shot authentication frame.
pub fn build_auth_message(token: &str) -> Result<String> {
    serde_json::to_string(&AuthMessage {
        msg_type: "auth",
        token,
    })
    .context("Failed to encode auth message")
}

/// How a single connection ended.
enum SessionEnd {
    /// Shutdown requested, or the event consumer went away.
    Stop,
    /// The relay closed the connection; reconnect.
    Closed,
}

/// WebSocket feed subscriber.
pub struct FeedTransport {
    config: TransportConfig,
    rules: NotificationRules,
}

impl FeedTransport {
    pub fn new(config: TransportConfig, rules: NotificationRules) -> Self {
        Self { config, rules }
    }

    /// Run until `shutdown_rx` fires or `events_tx` is closed.
    pub async fn run(
        self,
        events_tx: mpsc::Sender<FeedEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> Result<()> {
        let mut reconnect_delay = self.config.reconnect_delay;

        loop {
            match self.session(&events_tx, &mut shutdown_rx).await {
                Ok(SessionEnd::Stop) => {
                    info!("Feed transport stopped");
                    return Ok(());
                }
                Ok(SessionEnd::Closed) => {
                    reconnect_delay = self.config.reconnect_delay;
                    warn!(delay = ?reconnect_delay, "Feed connection closed, reconnecting");
                }
                Err(e) => {
                    warn!(error = %e, delay = ?reconnect_delay, "Feed connection failed, reconnecting");
                }
            }

            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Feed transport stopped during backoff");
                    return Ok(());
                }
                _ = tokio::time::sleep(reconnect_delay) => {}
            }

            reconnect_delay = (reconnect_delay * 2).min(self.config.max_reconnect_delay);
        }
    }

    async fn session(
        &self,
        events_tx: &mpsc::Sender<FeedEvent>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<SessionEnd> {
        info!(url = %self.config.url, "Connecting to feed");

        let (stream, response) = tokio_tungstenite::connect_async(self.config.url.as_str())
            .await
            .with_context(|| format!("Failed to connect to feed at {}", self.config.url))?;

        debug!(status = ?response.status(), "Feed handshake complete");
        let (mut write, mut read) = stream.split();

        if let Some(token) = self.config.token.as_deref() {
            write
                .send(Message::Text(build_auth_message(token)?))
                .await
                .context("Failed to send feed auth message")?;
        }

        info!("Feed connected");

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    send_close(&mut write).await;
                    return Ok(SessionEnd::Stop);
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let event = match events::parse_frame(&text, &self.rules) {
                                Ok(event) => event,
                                Err(e) => {
                                    debug!(error = %e, "Skipping unparseable feed frame");
                                    continue;
                                }
                            };
                            debug!(event = event.name(), "Feed event received");
                            match forward_event(event, events_tx, shutdown_rx).await {
                                Forward::Delivered => {}
                                Forward::Shutdown => {
                                    send_close(&mut write).await;
                                    return Ok(SessionEnd::Stop);
                                }
                                Forward::ConsumerGone => return Ok(SessionEnd::Stop),
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!(frame = ?frame, "Feed sent close frame");
                            return Ok(SessionEnd::Closed);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(e).context("Feed stream error");
                        }
                        None => return Ok(SessionEnd::Closed),
                    }
                }
            }
        }
    }
}

/// What happened to one event handed to the consumer.
#[derive(Debug, PartialEq, Eq)]
enum Forward {
    Delivered,
    Shutdown,
    ConsumerGone,
}

/// Send one event, giving up if shutdown arrives while the channel is full.
async fn forward_event(
    event: FeedEvent,
    events_tx: &mpsc::Sender<FeedEvent>,
    shutdown_rx: &mut mpsc::Receiver<()>,
) -> Forward {
    tokio::select! {
        biased;

        _ = shutdown_rx.recv() => Forward::Shutdown,
        sent = events_tx.send(event) => match sent {
            Ok(()) => Forward::Delivered,
            Err(_) => Forward::ConsumerGone,
        },
    }
}

async fn send_close<S>(write: &mut S)
where
    S: futures::Sink<Message> + Unpin,
{
    let close = CloseFrame {
        code: CloseCode::Normal,
        reason: "Shutdown".into(),
    };
    let _ = write.send(Message::Close(Some(close))).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_auth_message() {
        let msg = build_auth_message("secret").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["type"], "auth");
        assert_eq!(parsed["token"], "secret");
    }

    #[test]
    fn test_transport_config_defaults() {
        let config = TransportConfig::new("wss://feed.example/ws", None);
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
        assert_eq!(config.max_reconnect_delay, Duration::from_secs(30));
    }

    fn unknown(name: &str) -> FeedEvent {
        FeedEvent::Unknown(name.to_string())
    }

    #[tokio::test]
    async fn test_forward_event_delivers() {
        let (events_tx, mut events_rx) = mpsc::channel(1);
        let (_shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let outcome = forward_event(unknown("a"), &events_tx, &mut shutdown_rx).await;
        assert_eq!(outcome, Forward::Delivered);
        assert_eq!(events_rx.recv().await.unwrap().name(), "a");
    }

    #[tokio::test]
    async fn test_forward_event_yields_to_shutdown_when_channel_full() {
        let (events_tx, mut events_rx) = mpsc::channel(1);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        events_tx.send(unknown("backlog")).await.unwrap();

        let sender = tokio::spawn(async move {
            forward_event(unknown("blocked"), &events_tx, &mut shutdown_rx).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown_tx.send(()).await.unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(1), sender)
            .await
            .expect("forward_event should return once shutdown is signalled")
            .unwrap();
        assert_eq!(outcome, Forward::Shutdown);
        assert_eq!(events_rx.recv().await.unwrap().name(), "backlog");
    }

    #[tokio::test]
    async fn test_forward_event_reports_dropped_consumer() {
        let (events_tx, events_rx) = mpsc::channel(1);
        let (_shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        drop(events_rx);

        let outcome = forward_event(unknown("a"), &events_tx, &mut shutdown_rx).await;
        assert_eq!(outcome, Forward::ConsumerGone);
    }
}
