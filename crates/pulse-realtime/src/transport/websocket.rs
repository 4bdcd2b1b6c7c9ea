//! WebSocket connector
//!
//! Speaks Engine.IO v4 over a single WebSocket: waits for the open handshake, sends the
//! Socket.IO connect packet with the bearer token, then splits the socket into a reader
//! task and a writer task bridged to the [`Link`] channels.

use async_trait::async_trait;
use futures_util::stream::SplitStream;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use pulse_common::RealtimeConfig;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::link::{AuthPayload, Connector, Link, LinkEvent};
use crate::error::TransportError;
use crate::protocol::{DisconnectReason, Handshake, Packet};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type SocketStream = SplitStream<Socket>;

/// Channel buffer size for packets queued for the server
const OUTBOUND_BUFFER_SIZE: usize = 64;

/// Channel buffer size for packets delivered to the channel driver
const INBOUND_BUFFER_SIZE: usize = 256;

pub struct WebSocketConnector {
    endpoint: Url,
    connect_timeout: Duration,
}

impl WebSocketConnector {
    pub fn new(config: &RealtimeConfig) -> Result<Self, TransportError> {
        Ok(Self {
            endpoint: socket_url(&config.url, &config.path)?,
            connect_timeout: config.connect_timeout(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn open(&self, auth: &AuthPayload) -> Result<Link, TransportError> {
        let (socket, _response) = connect_async(self.endpoint.as_str())
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))?;
        let (mut sink, mut stream) = socket.split();

        let handshake = loop {
            match next_packet(&mut stream).await? {
                Packet::Open(handshake) => break handshake,
                Packet::Noop => {}
                other => {
                    return Err(TransportError::Handshake(format!(
                        "expected open, got {other}"
                    )))
                }
            }
        };
        tracing::debug!(
            sid = %handshake.sid,
            ping_interval = handshake.ping_interval,
            "Engine.IO session opened"
        );

        let auth = serde_json::to_value(auth).map_err(crate::error::ProtocolError::from)?;
        send_packet(&mut sink, &Packet::Connect(Some(auth))).await?;

        loop {
            match next_packet(&mut stream).await? {
                Packet::Connect(_) => break,
                Packet::ConnectError(message) => return Err(TransportError::Rejected(message)),
                Packet::Ping => send_packet(&mut sink, &Packet::Pong).await?,
                other => tracing::trace!(packet = %other, "Ignoring packet before connect"),
            }
        }

        Ok(spawn_link(sink, stream, &handshake))
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, auth: &AuthPayload) -> Result<Link, TransportError> {
        tokio::time::timeout(self.connect_timeout, self.open(auth))
            .await
            .map_err(|_| TransportError::Timeout(self.connect_timeout))?
    }
}

/// Build the `ws(s)://host/socket.io/?EIO=4&transport=websocket` endpoint
fn socket_url(base: &str, path: &str) -> Result<Url, TransportError> {
    let mut url = Url::parse(base).map_err(|e| TransportError::InvalidUrl(format!("{base}: {e}")))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(TransportError::InvalidUrl(format!("unsupported scheme {other}"))),
    };
    url.set_scheme(scheme)
        .map_err(|()| TransportError::InvalidUrl(base.to_string()))?;

    url.set_path(path);
    url.query_pairs_mut()
        .clear()
        .append_pair("EIO", "4")
        .append_pair("transport", "websocket");
    Ok(url)
}

async fn next_packet(stream: &mut SocketStream) -> Result<Packet, TransportError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => return Ok(Packet::decode(&text)?),
            Some(Ok(Message::Close(_))) | None => {
                return Err(TransportError::Handshake("connection closed".into()))
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(TransportError::WebSocket(e.to_string())),
        }
    }
}

async fn send_packet<K>(sink: &mut K, packet: &Packet) -> Result<(), TransportError>
where
    K: Sink<Message, Error = WsError> + Unpin,
{
    sink.send(Message::Text(packet.encode()))
        .await
        .map_err(|e| TransportError::WebSocket(e.to_string()))
}

/// How the writer ended, as seen by the reader
#[derive(Clone, Default)]
struct WriterExit {
    /// The owner dropped the link
    released: CancellationToken,
    /// A frame could not be written
    failed: CancellationToken,
}

fn spawn_link<K, S>(sink: K, stream: S, handshake: &Handshake) -> Link
where
    K: Sink<Message, Error = WsError> + Unpin + Send + 'static,
    S: Stream<Item = Result<Message, WsError>> + Unpin + Send + 'static,
{
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER_SIZE);
    let (pong_tx, pong_rx) = mpsc::channel(4);
    let exit = WriterExit::default();
    let ping_deadline = Duration::from_millis(handshake.ping_interval + handshake.ping_timeout);

    tokio::spawn(write_loop(sink, outbound_rx, pong_rx, exit.clone()));
    tokio::spawn(read_loop(stream, inbound_tx, pong_tx, ping_deadline, exit));

    Link {
        outbound: outbound_tx,
        inbound: inbound_rx,
    }
}

async fn read_loop<S>(
    mut stream: S,
    inbound: mpsc::Sender<LinkEvent>,
    pongs: mpsc::Sender<()>,
    ping_deadline: Duration,
    writer: WriterExit,
) where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    let reason = loop {
        let next = tokio::select! {
            () = writer.released.cancelled() => break DisconnectReason::IoClientDisconnect,
            () = writer.failed.cancelled() => break DisconnectReason::TransportError,
            next = tokio::time::timeout(ping_deadline, stream.next()) => next,
        };

        let message = match next {
            Err(_) => break DisconnectReason::PingTimeout,
            Ok(None | Some(Ok(Message::Close(_)))) => break DisconnectReason::TransportClose,
            Ok(Some(Err(e))) => {
                tracing::debug!(error = %e, "WebSocket read failed");
                break DisconnectReason::TransportError;
            }
            Ok(Some(Ok(message))) => message,
        };

        let Message::Text(text) = message else {
            continue;
        };

        match Packet::decode(&text) {
            Ok(Packet::Ping) => {
                if pongs.send(()).await.is_err() {
                    break DisconnectReason::TransportClose;
                }
            }
            Ok(Packet::Close) => break DisconnectReason::TransportClose,
            Ok(Packet::Disconnect) => break DisconnectReason::IoServerDisconnect,
            Ok(packet) if packet.is_transport_level() => {}
            Ok(packet) => {
                if inbound.send(LinkEvent::Packet(packet)).await.is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Dropping undecodable frame"),
        }
    };

    tracing::debug!(reason = %reason, "WebSocket reader finished");
    let _ = inbound.send(LinkEvent::Closed(reason)).await;
}

async fn write_loop<K>(
    mut sink: K,
    mut outbound: mpsc::Receiver<Packet>,
    mut pongs: mpsc::Receiver<()>,
    exit: WriterExit,
) where
    K: Sink<Message, Error = WsError> + Unpin,
{
    let ended = loop {
        let packet = tokio::select! {
            packet = outbound.recv() => match packet {
                Some(packet) => packet,
                None => {
                    // Owner dropped the link: say goodbye
                    let _ = send_packet(&mut sink, &Packet::Disconnect).await;
                    break &exit.released;
                }
            },
            Some(()) = pongs.recv() => Packet::Pong,
        };

        if let Err(e) = send_packet(&mut sink, &packet).await {
            tracing::debug!(error = %e, "WebSocket write failed");
            break &exit.failed;
        }
    };

    let _ = sink.close().await;
    ended.cancel();
}
