//! Connection loop — keeps one MQTT session alive and drives the scheduler.
//!
//! Each wake-up (socket readiness or the poll timeout) runs one synchronous
//! step under the hub lock: read what the socket has, feed the session, run
//! [`synchronize`], then write what the socket accepts. Any transport error
//! tears the session down; a fresh one is built after the reconnect delay.
//!
//! Name resolution and the TCP connect race the shutdown flag. An abandoned
//! lookup keeps its blocking resolver thread until the system resolver
//! returns.

use std::time::{Duration, Instant};

use homeauto_app::hub::Hub;
use homeauto_app::ports::MessagingSession;
use homeauto_app::sync::synchronize;
use homeauto_domain::time;
use tokio::io::{Interest, Ready};
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::config::MqttConfig;
use crate::error::MqttError;
use crate::session::{MqttSession, SessionOptions};

/// Bytes read from the socket per wake-up.
const READ_CHUNK: usize = 1024;
/// Bytes handed to the socket per wake-up.
const WRITE_CHUNK: usize = 16 * 1024;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the loop is in the connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Why a socket wait returned.
enum Wake {
    Socket(Option<Ready>),
    Shutdown { closed: bool },
}

/// Owns the broker link for the lifetime of the daemon.
pub struct ConnectionLoop {
    hub: Hub,
    config: MqttConfig,
    topics: Vec<String>,
    state: LinkState,
}

impl ConnectionLoop {
    /// Build a loop subscribing to the topic of every device in `hub`.
    #[must_use]
    pub fn new(hub: Hub, config: MqttConfig) -> Self {
        let topics = hub.devices().into_iter().map(|dev| dev.topic).collect();
        Self {
            hub,
            config,
            topics,
            state: LinkState::Disconnected,
        }
    }

    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    fn transition(&mut self, next: LinkState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "link state");
            self.state = next;
        }
    }

    /// Run until `shutdown` turns `true` (or its sender is dropped).
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(host = %self.config.host, port = self.config.port, "connection loop started");

        while !*shutdown.borrow() {
            self.transition(LinkState::Connecting);
            let mut session = MqttSession::new(&SessionOptions::from_config(&self.config));
            for topic in &self.topics {
                session.subscribe(topic);
            }

            let attempt = tokio::select! {
                result = self.connect() => result,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            };

            match attempt {
                Ok(stream) => {
                    self.transition(LinkState::Connected);
                    tracing::info!(host = %self.config.host, port = self.config.port, "connected to broker");
                    self.hub.lock().scheduler.request_full_push();

                    match self.serve(&stream, &mut session, &mut shutdown).await {
                        Ok(()) => break,
                        Err(err) => tracing::warn!(%err, "broker connection lost"),
                    }
                }
                Err(err) => tracing::warn!(%err, "broker connection failed"),
            }

            self.transition(LinkState::Disconnected);
            let delay = self.config.reconnect_delay();
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.transition(LinkState::Disconnected);
        tracing::info!("connection loop stopped");
    }

    async fn connect(&self) -> Result<TcpStream, MqttError> {
        let host = self.config.host.as_str();
        let port = self.config.port;

        let mut addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| MqttError::Resolve {
                host: host.to_string(),
                port,
                source,
            })?;
        let addr = addrs.next().ok_or_else(|| MqttError::NoAddress {
            host: host.to_string(),
            port,
        })?;

        let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| MqttError::ConnectTimeout)?
            .map_err(MqttError::Connect)?;
        stream.set_nodelay(true).map_err(MqttError::Connect)?;
        Ok(stream)
    }

    /// Serve one connection. `Ok` means shutdown was requested.
    async fn serve(
        &self,
        stream: &TcpStream,
        session: &mut MqttSession,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), MqttError> {
        let mut buf = [0u8; READ_CHUNK];

        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            let interest = if session.has_pending_output() {
                Interest::READABLE | Interest::WRITABLE
            } else {
                Interest::READABLE
            };

            let wake = tokio::select! {
                ready = tokio::time::timeout(self.config.poll_timeout(), stream.ready(interest)) => {
                    match ready {
                        Ok(ready) => Wake::Socket(Some(ready.map_err(MqttError::Io)?)),
                        Err(_elapsed) => Wake::Socket(None),
                    }
                }
                changed = shutdown.changed() => Wake::Shutdown { closed: changed.is_err() },
            };

            match wake {
                Wake::Shutdown { closed: true } => return Ok(()),
                Wake::Shutdown { closed: false } => continue,
                Wake::Socket(ready) => {
                    tracing::trace!(?ready, "wake");
                }
            }

            self.step(stream, session, &mut buf)?;
        }
    }

    /// Read, synchronize, write. Never awaits, so the hub lock is held for
    /// the whole step without blocking other tasks for long.
    fn step(
        &self,
        stream: &TcpStream,
        session: &mut MqttSession,
        buf: &mut [u8],
    ) -> Result<(), MqttError> {
        let mut state = self.hub.lock();

        match stream.try_read(buf) {
            Ok(0) => return Err(MqttError::Closed),
            Ok(n) => session.feed_input(&buf[..n])?,
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(err) => return Err(MqttError::Io(err)),
        }

        session.poll_timers(Instant::now());
        synchronize(&mut state, session, time::now());

        if session.has_pending_output() {
            match stream.try_write(session.drain_output(WRITE_CHUNK)) {
                Ok(n) => session.acknowledge_sent(n),
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(err) => return Err(MqttError::Io(err)),
            }
        }

        Ok(())
    }
}
