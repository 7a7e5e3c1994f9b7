//! Session management.
//!
//! A [`Session`] owns one stream and runs every command as a single
//! exchange: write one frame, then read one inbound chunk as its response.
//! Frames carry no request identifier, so the only thing tying a response
//! to its command is ordering. The stream therefore sits behind an async
//! mutex that is held for the whole exchange; callers that arrive while an
//! exchange is outstanding queue on the mutex in FIFO order and nothing is
//! ever interleaved on the wire.
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected --close--> Closed
//!                               |                  |
//!                               +--error--> Disconnected
//!                                                  +--timeout/EOF/I/O error/cancel--> Closed
//! ```

use crate::config::ConnectionConfig;
use crate::error::ClientError;
use bytes::{Bytes, BytesMut};
use std::future::Future;
use std::time::Duration;
use tinykv_protocol::{
    build_frame, decode_get_response, decode_status_response, encode_key, encode_value, Command,
    GetResponse, Value, ValueKind,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex, MutexGuard};

/// Lifecycle of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

/// A session with a tinykv server over one stream.
pub struct Session<S = TcpStream> {
    config: ConnectionConfig,
    /// The stream; locked for the full write-then-read exchange.
    stream: Mutex<Option<S>>,
    state: parking_lot::Mutex<SessionState>,
    /// Flipped to `true` once the session is closed, waking any exchange in
    /// flight.
    closed: watch::Sender<bool>,
}

impl Session<TcpStream> {
    /// Creates a TCP session (not yet connected).
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_stream(config, None, SessionState::Disconnected)
    }

    /// Connects to the configured server.
    ///
    /// Connection failures are returned as-is and never retried; the session
    /// goes back to `Disconnected` and may be connected again.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let mut slot = self.stream.lock().await;

        {
            let mut state = self.state.lock();
            match *state {
                SessionState::Connected => return Ok(()),
                SessionState::Closed => return Err(ClientError::SessionClosed),
                SessionState::Disconnected | SessionState::Connecting => {
                    *state = SessionState::Connecting;
                }
            }
        }

        let addr = self.config.addr();
        tracing::debug!("Connecting to {}...", addr);

        let connecting = tokio::time::timeout(
            self.config.connect_timeout(),
            TcpStream::connect(addr.as_str()),
        );
        let result = tokio::select! {
            result = connecting => result,
            _ = wait_closed(self.closed.subscribe()) => return Err(ClientError::SessionClosed),
        };

        let stream = match result {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::debug!("Connection to {} failed: {}", addr, e);
                self.transition(SessionState::Connecting, SessionState::Disconnected);
                return Err(ClientError::Connection(e));
            }
            Err(_) => {
                tracing::debug!("Connection to {} timed out", addr);
                self.transition(SessionState::Connecting, SessionState::Disconnected);
                return Err(ClientError::ConnectTimeout);
            }
        };

        stream.set_nodelay(true).ok();

        if !self.transition(SessionState::Connecting, SessionState::Connected) {
            return Err(ClientError::SessionClosed);
        }
        *slot = Some(stream);

        tracing::debug!("Connected to {}", addr);
        Ok(())
    }
}

impl<S> Session<S> {
    fn with_stream(config: ConnectionConfig, stream: Option<S>, state: SessionState) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            config,
            stream: Mutex::new(stream),
            state: parking_lot::Mutex::new(state),
            closed,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        let mut state = self.state.lock();
        if *state != from {
            return false;
        }
        tracing::debug!("Session state {:?} -> {:?}", from, to);
        *state = to;
        true
    }

    /// Moves to `Closed` and wakes any outstanding exchange.
    /// Returns `false` if the session was already closed.
    fn mark_closed(&self) -> bool {
        {
            let mut state = self.state.lock();
            if *state == SessionState::Closed {
                return false;
            }
            *state = SessionState::Closed;
        }
        self.closed.send_replace(true);
        true
    }

    fn ensure_connected(&self) -> Result<(), ClientError> {
        match self.state() {
            SessionState::Connected => Ok(()),
            SessionState::Closed => Err(ClientError::SessionClosed),
            SessionState::Disconnected | SessionState::Connecting => {
                Err(ClientError::NotConnected)
            }
        }
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wraps an already established stream; the session starts `Connected`.
    pub fn from_stream(config: ConnectionConfig, stream: S) -> Self {
        Self::with_stream(config, Some(stream), SessionState::Connected)
    }

    /// Pings the server.
    ///
    /// Any reply counts as success; PING has no failure encoding.
    pub async fn ping(&self) -> Result<bool, ClientError> {
        let frame = build_frame(Command::Ping, &[], self.config.max_key_size(), None)?;
        self.exchange(Command::Ping, frame).await?;
        Ok(true)
    }

    /// Fetches the raw reply for `key`.
    pub async fn get(&self, key: &str) -> Result<GetResponse, ClientError> {
        let frame = self.key_frame(Command::Get, key)?;
        let response = self.exchange(Command::Get, frame).await?;
        Ok(decode_get_response(response))
    }

    /// Fetches `key` and decodes it as `kind`, or `None` if absent.
    ///
    /// For [`ValueKind::Bool`] the absence sentinel decodes as `false`, since
    /// the two cannot be told apart on the wire.
    pub async fn get_as(&self, key: &str, kind: ValueKind) -> Result<Option<Value>, ClientError> {
        let response = self.get(key).await?;
        if response.is_absent() && kind != ValueKind::Bool {
            return Ok(None);
        }
        Ok(Some(response.decode(kind)?))
    }

    pub async fn get_text(&self, key: &str) -> Result<Option<String>, ClientError> {
        let response = self.get(key).await?;
        if response.is_absent() {
            return Ok(None);
        }
        Ok(Some(response.as_text()?))
    }

    pub async fn get_number(&self, key: &str) -> Result<Option<f64>, ClientError> {
        let response = self.get(key).await?;
        if response.is_absent() {
            return Ok(None);
        }
        Ok(Some(response.as_number()?))
    }

    /// Fetches a boolean. A missing key reads as `false`.
    pub async fn get_bool(&self, key: &str) -> Result<bool, ClientError> {
        let response = self.get(key).await?;
        Ok(response.as_bool()?)
    }

    /// Stores `value` under `key`.
    pub async fn set(&self, key: &str, value: impl Into<Value>) -> Result<bool, ClientError> {
        let value = value.into();
        let max_key_size = self.config.max_key_size();

        let key = encode_key(key, max_key_size)?;
        let value = encode_value(&value, self.config.max_value_size())?;
        let frame = build_frame(Command::Set, &key, max_key_size, Some(&value[..]))?;

        let response = self.exchange(Command::Set, frame).await?;
        Ok(decode_status_response(&response))
    }

    pub async fn exists(&self, key: &str) -> Result<bool, ClientError> {
        let frame = self.key_frame(Command::Exists, key)?;
        let response = self.exchange(Command::Exists, frame).await?;
        Ok(decode_status_response(&response))
    }

    pub async fn delete(&self, key: &str) -> Result<bool, ClientError> {
        let frame = self.key_frame(Command::Delete, key)?;
        let response = self.exchange(Command::Delete, frame).await?;
        Ok(decode_status_response(&response))
    }

    /// Closes the session.
    ///
    /// An exchange still waiting for its response fails with
    /// `SessionClosed`. Closing twice is a no-op.
    pub async fn close(&self) -> Result<(), ClientError> {
        if !self.mark_closed() {
            return Ok(());
        }
        tracing::debug!("Closing session...");

        if let Some(mut stream) = self.stream.lock().await.take() {
            let _ = stream.shutdown().await;
        }

        tracing::debug!("Session closed");
        Ok(())
    }

    fn key_frame(&self, command: Command, key: &str) -> Result<BytesMut, ClientError> {
        let max_key_size = self.config.max_key_size();
        let key = encode_key(key, max_key_size)?;
        Ok(build_frame(command, &key, max_key_size, None)?)
    }

    /// Writes `frame` and returns the next inbound chunk.
    async fn exchange(&self, command: Command, frame: BytesMut) -> Result<Bytes, ClientError> {
        self.ensure_connected()?;

        let closed = self.closed.subscribe();
        let slot = self.stream.lock().await;

        // Closed while queued behind another exchange?
        self.ensure_connected()?;

        let mut in_flight = InFlight {
            session: self,
            slot,
            done: false,
        };
        let Some(stream) = in_flight.slot.as_mut() else {
            in_flight.done = true;
            return Err(ClientError::NotConnected);
        };

        let buffer_size = match command {
            Command::Get => self.config.get_buffer_size(),
            _ => self.config.read_buffer_size(),
        };

        tracing::debug!("Sending {} frame ({} bytes)", command, frame.len());

        let request = round_trip(stream, &frame, buffer_size);
        let outcome = tokio::select! {
            result = with_timeout(self.config.request_timeout(), request) => result,
            _ = wait_closed(closed) => Err(ClientError::SessionClosed),
        };

        match outcome {
            Ok(response) => {
                in_flight.done = true;
                tracing::debug!("{} response received ({} bytes)", command, response.len());
                Ok(response)
            }
            Err(ClientError::SessionClosed) => {
                // `close` shuts the stream down once the slot is released.
                in_flight.done = true;
                tracing::debug!("{} abandoned: session closed", command);
                Err(ClientError::SessionClosed)
            }
            Err(e) => {
                // A late response would be read as the answer to the next
                // command, so the stream cannot be reused.
                tracing::warn!("{} failed ({}), closing session", command, e);
                self.mark_closed();
                if let Some(mut stream) = in_flight.slot.take() {
                    let _ = stream.shutdown().await;
                }
                in_flight.done = true;
                Err(e)
            }
        }
    }
}

/// The locked stream for one exchange.
///
/// Dropped before `done` is set, the caller gave up mid-exchange: part of a
/// frame may be on the wire or a response may still be on its way. The
/// session is closed and the stream discarded.
struct InFlight<'a, S> {
    session: &'a Session<S>,
    slot: MutexGuard<'a, Option<S>>,
    done: bool,
}

impl<S> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        tracing::warn!("Exchange cancelled, closing session");
        self.session.mark_closed();
        self.slot.take();
    }
}

async fn round_trip<S>(
    stream: &mut S,
    frame: &[u8],
    buffer_size: usize,
) -> Result<Bytes, ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(frame).await?;
    stream.flush().await?;

    let mut buf = BytesMut::with_capacity(buffer_size);
    let n = stream.read_buf(&mut buf).await?;
    if n == 0 {
        return Err(ClientError::ConnectionClosed);
    }

    Ok(buf.freeze())
}

async fn with_timeout<F, T>(timeout: Option<Duration>, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, fut)
            .await
            .map_err(|_| ClientError::ResponseTimeout)?,
        None => fut.await,
    }
}

/// Resolves once the session's close flag is set.
async fn wait_closed(mut closed: watch::Receiver<bool>) {
    loop {
        if *closed.borrow_and_update() {
            return;
        }
        if closed.changed().await.is_err() {
            return;
        }
    }
}
