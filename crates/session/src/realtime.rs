use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::{
    runtime::Handle,
    sync::{broadcast, oneshot},
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        Message,
        client::IntoClientRequest,
        http::{HeaderValue, header::AUTHORIZATION},
    },
};
use url::Url;

/// Opens push connections for a bearer token.
pub trait Transport: Send + Sync {
    fn open(&self, token: &str) -> Box<dyn Link>;
}

/// A live connection. Closing consumes it.
pub trait Link: Send {
    fn close(self: Box<Self>);
}

/// At most one live link at a time: connecting again closes the previous one.
pub struct RealtimeChannel {
    transport: Arc<dyn Transport>,
    link: Mutex<Option<Box<dyn Link>>>,
}

impl RealtimeChannel {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            link: Mutex::new(None),
        }
    }

    pub fn connect(&self, token: &str) {
        let mut link = self.link.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = link.take() {
            tracing::debug!("closing previous realtime link");
            previous.close();
        }

        *link = Some(self.transport.open(token));
        tracing::info!("realtime channel connected");
    }

    pub fn disconnect(&self) {
        let previous = self
            .link
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(previous) = previous {
            previous.close();
            tracing::info!("realtime channel disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// A server push: `{"event": "...", "data": ...}`.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct RealtimeMessage {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Websocket transport authenticating with `Authorization: Bearer`.
/// Decoded pushes are fanned out to [`WsTransport::subscribe`]rs.
pub struct WsTransport {
    url: Url,
    events: broadcast::Sender<RealtimeMessage>,
}

impl WsTransport {
    pub fn new(url: Url) -> Self {
        let (events, _) = broadcast::channel(64);
        Self { url, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeMessage> {
        self.events.subscribe()
    }
}

impl Transport for WsTransport {
    fn open(&self, token: &str) -> Box<dyn Link> {
        let (shutdown, shutdown_rx) = oneshot::channel();

        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("no async runtime, realtime link not started");
            return Box::new(WsLink { shutdown: None });
        };

        handle.spawn(run(
            self.url.clone(),
            token.to_owned(),
            self.events.clone(),
            shutdown_rx,
        ));

        Box::new(WsLink {
            shutdown: Some(shutdown),
        })
    }
}

struct WsLink {
    shutdown: Option<oneshot::Sender<()>>,
}

impl Link for WsLink {
    fn close(mut self: Box<Self>) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl Drop for WsLink {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

#[tracing::instrument(skip_all, fields(url = %url))]
async fn run(
    url: Url,
    token: String,
    events: broadcast::Sender<RealtimeMessage>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut request = match url.as_str().into_client_request() {
        Ok(request) => request,
        Err(err) => {
            tracing::error!(err = %err, "invalid realtime url");
            return;
        }
    };

    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(value) => {
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Err(err) => {
            tracing::error!(err = %err, "token is not a valid header value");
            return;
        }
    }

    let stream = tokio::select! {
        _ = &mut shutdown => return,
        connected = connect_async(request) => match connected {
            Ok((stream, _)) => stream,
            Err(err) => {
                tracing::error!(err = %err, "realtime connection failed");
                return;
            }
        },
    };

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if let Err(err) = write.send(Message::Close(None)).await {
                    tracing::debug!(err = %err, "close frame not delivered");
                }
                break;
            }
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<RealtimeMessage>(&text) {
                        Ok(message) => {
                            tracing::debug!(event = %message.event, "realtime push");
                            let _ = events.send(message);
                        }
                        Err(err) => tracing::debug!(err = %err, "ignoring undecodable push"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("realtime connection closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!(err = %err, "realtime connection lost");
                    break;
                }
            },
        }
    }
}

/// Transport that opens no connection and counts what it was asked to do.
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    opened: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicUsize>,
}

impl RecordingTransport {
    /// Tokens links were opened with, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Links currently open.
    pub fn live(&self) -> usize {
        self.opened().len() - self.closed()
    }
}

impl Transport for RecordingTransport {
    fn open(&self, token: &str) -> Box<dyn Link> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(token.to_owned());

        Box::new(RecordingLink {
            closed: self.closed.clone(),
        })
    }
}

struct RecordingLink {
    closed: Arc<AtomicUsize>,
}

impl Link for RecordingLink {
    fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
