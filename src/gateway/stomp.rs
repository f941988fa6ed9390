//! STOMP Live Channel Client
//!
//! Subscribes to STOMP destinations over a WebSocket and hands every
//! `MESSAGE` body, decoded as a [`LiveRaceUpdate`], to the subscriber.
//! Each subscription owns its own socket and background task; the returned
//! [`StompConnection`] stops both.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::{Connection, GatewayError, GatewayResult, StreamingGateway, UpdateHandler};
use crate::models::LiveRaceUpdate;

/// A single STOMP frame
#[derive(Debug, Clone, PartialEq)]
pub struct StompFrame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StompFrame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Builder method: add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Builder method: set the body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Wire form: command line, header lines, blank line, body, NUL
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.command.len() + self.body.len() + 32);
        out.push_str(&self.command);
        out.push('\n');
        for (key, value) in &self.headers {
            out.push_str(key);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parse one frame; `Ok(None)` for a heart-beat
    pub fn parse(raw: &str) -> GatewayResult<Option<Self>> {
        let raw = raw.trim_start_matches(['\r', '\n']);
        if raw.is_empty() {
            return Ok(None);
        }
        let raw = raw.trim_end_matches(['\0', '\r', '\n']);

        let (head, body) = match raw.find("\n\n") {
            Some(idx) => (&raw[..idx], &raw[idx + 2..]),
            None => match raw.find("\r\n\r\n") {
                Some(idx) => (&raw[..idx], &raw[idx + 4..]),
                None => (raw, ""),
            },
        };

        let mut lines = head.lines();
        let command = lines
            .next()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| GatewayError::Frame("missing command".to_string()))?;

        let mut headers = Vec::new();
        for line in lines {
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| GatewayError::Frame(format!("malformed header: {}", line)))?;
            headers.push((key.to_string(), value.trim_end_matches('\r').to_string()));
        }

        Ok(Some(Self {
            command: command.to_string(),
            headers,
            body: body.to_string(),
        }))
    }
}

/// Streaming gateway speaking STOMP 1.2 over WebSocket
#[derive(Debug, Clone)]
pub struct StompGateway {
    url: String,
}

impl StompGateway {
    /// Create a gateway for the given `ws://` or `wss://` endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl StreamingGateway for StompGateway {
    fn subscribe(&self, channel: &str, on_message: UpdateHandler) -> GatewayResult<Box<dyn Connection>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| GatewayError::Subscribe(e.to_string()))?;
        let request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| GatewayError::Subscribe(format!("invalid url {}: {}", self.url, e)))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let subscription = Subscription {
            id: uuid::Uuid::new_v4().to_string(),
            channel: channel.to_string(),
            on_message,
        };
        runtime.spawn(async move {
            if let Err(e) = subscription.run(request, shutdown_rx).await {
                tracing::warn!(error = %e, "Live channel closed with error");
            }
        });

        tracing::debug!(url = %self.url, channel = %channel, "Subscription task started");
        Ok(Box::new(StompConnection {
            shutdown: Some(shutdown_tx),
        }))
    }
}

/// Handle on a running STOMP subscription
pub struct StompConnection {
    shutdown: Option<oneshot::Sender<()>>,
}

impl Connection for StompConnection {
    fn disconnect(mut self: Box<Self>) {
        if let Some(tx) = self.shutdown.take() {
            // the task may already be gone if the server closed first
            let _ = tx.send(());
        }
    }
}

struct Subscription {
    id: String,
    channel: String,
    on_message: UpdateHandler,
}

impl Subscription {
    async fn run(mut self, request: Request, mut shutdown: oneshot::Receiver<()>) -> GatewayResult<()> {
        let host = request.uri().host().unwrap_or("localhost").to_string();
        let (ws, _) = connect_async(request).await?;
        let (mut sink, mut stream) = ws.split();

        let connect = StompFrame::new("CONNECT")
            .header("accept-version", "1.2")
            .header("host", host)
            .header("heart-beat", "0,0");
        sink.send(Message::Text(connect.encode())).await?;

        let mut subscribed = false;
        loop {
            tokio::select! {
                // shutdown wins over frames already buffered
                biased;

                _ = &mut shutdown => {
                    // dropped handle or explicit disconnect
                    if subscribed {
                        let unsubscribe = StompFrame::new("UNSUBSCRIBE").header("id", self.id.as_str());
                        sink.send(Message::Text(unsubscribe.encode())).await?;
                    }
                    sink.send(Message::Text(StompFrame::new("DISCONNECT").encode())).await?;
                    let _ = sink.close().await;
                    tracing::info!(channel = %self.channel, "Live channel disconnected");
                    return Ok(());
                }
                incoming = stream.next() => {
                    let text = match incoming {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Binary(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(channel = %self.channel, "Live channel closed by server");
                            return Ok(());
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                    };

                    let frame = match StompFrame::parse(&text) {
                        Ok(Some(frame)) => frame,
                        Ok(None) => continue,
                        Err(e) => {
                            tracing::warn!(error = %e, "Skipping unparsable frame");
                            continue;
                        }
                    };

                    match frame.command.as_str() {
                        "CONNECTED" => {
                            let subscribe = StompFrame::new("SUBSCRIBE")
                                .header("id", self.id.as_str())
                                .header("destination", self.channel.as_str())
                                .header("ack", "auto");
                            sink.send(Message::Text(subscribe.encode())).await?;
                            subscribed = true;
                            tracing::info!(channel = %self.channel, "Subscribed to live channel");
                        }
                        "MESSAGE" => self.deliver(&frame),
                        "ERROR" => {
                            let message = frame.get("message").unwrap_or(frame.body.as_str());
                            return Err(GatewayError::WebSocket(format!("STOMP error: {}", message)));
                        }
                        other => tracing::debug!(command = %other, "Ignoring frame"),
                    }
                }
            }
        }
    }

    fn deliver(&mut self, frame: &StompFrame) {
        if frame.get("subscription").is_some_and(|id| id != self.id) {
            return;
        }
        match serde_json::from_str::<LiveRaceUpdate>(&frame.body) {
            Ok(update) => (self.on_message)(update),
            Err(e) => tracing::warn!(channel = %self.channel, error = %e, "Skipping undecodable update"),
        }
    }
}
