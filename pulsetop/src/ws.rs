//! WebSocket connection supervisor: connects to the telemetry endpoint, forwards
//! every text frame, and reconnects after a fixed delay whenever the transport
//! closes.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{
    connect_async, connect_async_tls_with_config, tungstenite::Message, Connector,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);
pub const MIN_RECONNECT_DELAY: Duration = Duration::from_millis(100);
/// Upper bound on TCP connect plus WebSocket handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("websocket: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("tls: {0}")]
    Tls(#[from] rustls::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("no certificates found in {0}")]
    NoCerts(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Connecting,
    Open,
    Closed,
}

impl ConnState {
    pub fn label(self) -> &'static str {
        match self {
            ConnState::Connecting => "Connecting...",
            ConnState::Open => "Live connection active",
            ConnState::Closed => "Disconnected - Reconnecting...",
        }
    }

    /// The only legal edges; anything else is ignored.
    pub fn next(self, t: Transition) -> Option<ConnState> {
        match (self, t) {
            (ConnState::Connecting, Transition::Connected) => Some(ConnState::Open),
            (ConnState::Connecting | ConnState::Open, Transition::Lost) => Some(ConnState::Closed),
            (ConnState::Closed, Transition::DelayElapsed) => Some(ConnState::Connecting),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Connected,
    Lost,
    DelayElapsed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WsEvent {
    State(ConnState),
    Message(String),
}

// Connect to the server and return the WS stream
pub async fn connect(url: &str, tls_ca: Option<&Path>) -> Result<WsStream, ConnectError> {
    let ws = match tls_ca {
        None => connect_async(url).await?.0,
        Some(path) => {
            let cfg = tls_config(path)?;
            let connector = Connector::Rustls(Arc::new(cfg));
            connect_async_tls_with_config(url, None, false, Some(connector))
                .await?
                .0
        }
    };
    Ok(ws)
}

fn tls_config(path: &Path) -> Result<rustls::ClientConfig, ConnectError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut roots = rustls::RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut reader) {
        roots.add(cert?)?;
    }
    if roots.is_empty() {
        return Err(ConnectError::NoCerts(path.to_path_buf()));
    }
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    Ok(rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

/// Owns the connection lifecycle. There is no terminal state: it keeps
/// reconnecting until the receiving side of its channel is dropped.
#[derive(Debug)]
pub struct Supervisor {
    url: String,
    tls_ca: Option<PathBuf>,
    delay: Duration,
    connect_timeout: Duration,
    state: ConnState,
}

impl Supervisor {
    pub fn new(url: impl Into<String>, tls_ca: Option<PathBuf>, delay: Duration) -> Self {
        Self {
            url: url.into(),
            tls_ca,
            delay,
            connect_timeout: CONNECT_TIMEOUT,
            state: ConnState::Connecting,
        }
    }

    pub fn with_connect_timeout(mut self, t: Duration) -> Self {
        self.connect_timeout = t;
        self
    }

    pub fn start(self, tx: mpsc::Sender<WsEvent>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(tx))
    }

    pub async fn run(mut self, tx: mpsc::Sender<WsEvent>) {
        if tx.send(WsEvent::State(self.state)).await.is_err() {
            return;
        }
        loop {
            let t = match self.state {
                ConnState::Connecting => {
                    let attempt = connect(&self.url, self.tls_ca.as_deref());
                    match timeout(self.connect_timeout, attempt).await {
                        Ok(Ok(ws)) => {
                            info!(url = %self.url, "connected");
                            if !self.step(Transition::Connected, &tx).await {
                                return;
                            }
                            if !pump(ws, &tx).await {
                                return;
                            }
                            Transition::Lost
                        }
                        Ok(Err(e)) => {
                            warn!(url = %self.url, error = %e, "connect failed");
                            Transition::Lost
                        }
                        Err(_) => {
                            warn!(
                                url = %self.url,
                                timeout_ms = self.connect_timeout.as_millis() as u64,
                                "connect timed out"
                            );
                            Transition::Lost
                        }
                    }
                }
                ConnState::Open => Transition::Lost,
                ConnState::Closed => {
                    sleep(self.delay).await;
                    Transition::DelayElapsed
                }
            };
            if !self.step(t, &tx).await {
                return;
            }
        }
    }

    async fn step(&mut self, t: Transition, tx: &mpsc::Sender<WsEvent>) -> bool {
        let Some(next) = self.state.next(t) else {
            return true;
        };
        debug!(from = ?self.state, to = ?next, "connection transition");
        self.state = next;
        tx.send(WsEvent::State(next)).await.is_ok()
    }
}

// Forward frames until the transport closes; false once nobody is listening.
async fn pump(mut ws: WsStream, tx: &mpsc::Sender<WsEvent>) -> bool {
    while let Some(msg) = ws.next().await {
        let text = match msg {
            Ok(Message::Text(t)) => t,
            Ok(Message::Binary(b)) => match String::from_utf8(b) {
                Ok(t) => t,
                Err(_) => {
                    debug!("ignoring non-utf8 binary frame");
                    continue;
                }
            },
            Ok(Message::Close(frame)) => {
                info!(?frame, "server closed connection");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "websocket error");
                break;
            }
        };
        if tx.send(WsEvent::Message(text)).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_edges() {
        use ConnState::*;
        use Transition::*;
        assert_eq!(Connecting.next(Connected), Some(Open));
        assert_eq!(Open.next(Lost), Some(Closed));
        assert_eq!(Connecting.next(Lost), Some(Closed));
        assert_eq!(Closed.next(DelayElapsed), Some(Connecting));
        assert_eq!(Open.next(Connected), None);
        assert_eq!(Closed.next(Lost), None);
        assert_eq!(Open.next(DelayElapsed), None);
    }

    #[tokio::test]
    async fn failed_connect_retries_after_delay() {
        // nothing listens on port 9 on a test box
        let sup = Supervisor::new("ws://127.0.0.1:9/ws", None, Duration::from_millis(20));
        let (tx, mut rx) = mpsc::channel(16);
        let handle = sup.start(tx);
        let mut seen = Vec::new();
        while seen.len() < 4 {
            match rx.recv().await {
                Some(WsEvent::State(s)) => seen.push(s),
                Some(WsEvent::Message(_)) => {}
                None => break,
            }
        }
        assert_eq!(
            seen,
            vec![
                ConnState::Connecting,
                ConnState::Closed,
                ConnState::Connecting,
                ConnState::Closed
            ]
        );
        drop(rx);
        handle.abort();
    }

    #[tokio::test]
    async fn stalled_handshake_times_out_and_retries() {
        // accepted by the kernel backlog, never answered
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        let sup = Supervisor::new(url, None, Duration::from_millis(20))
            .with_connect_timeout(Duration::from_millis(50));
        let (tx, mut rx) = mpsc::channel(16);
        let handle = sup.start(tx);
        let mut seen = Vec::new();
        let done = tokio::time::timeout(Duration::from_secs(5), async {
            while seen.len() < 4 {
                if let Some(WsEvent::State(s)) = rx.recv().await {
                    seen.push(s);
                }
            }
        })
        .await;
        handle.abort();
        drop(listener);
        assert!(done.is_ok(), "stuck in {seen:?}");
        assert_eq!(
            seen,
            vec![
                ConnState::Connecting,
                ConnState::Closed,
                ConnState::Connecting,
                ConnState::Closed
            ]
        );
    }

    #[test]
    fn labels_match_header_badges() {
        assert_eq!(ConnState::Open.label(), "Live connection active");
        assert_eq!(ConnState::Closed.label(), "Disconnected - Reconnecting...");
        assert_eq!(ConnState::Connecting.label(), "Connecting...");
    }

    #[test]
    fn missing_ca_file_is_an_error() {
        let err = tls_config(Path::new("/nonexistent/ca.pem")).unwrap_err();
        assert!(matches!(err, ConnectError::Io(_)));
    }
}
