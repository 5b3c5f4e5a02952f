//! Messaging session port — a sans-IO publish/subscribe session.
//!
//! The session never touches a socket. The connection loop feeds it the bytes
//! read from the transport, drains the bytes it wants written, and reports how
//! many of them the transport accepted.

use std::time::Instant;

/// Delivery guarantee requested for an outbound publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Protocol session driven by the connection loop.
pub trait MessagingSession {
    /// Error raised when inbound bytes cannot be decoded.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Queue a subscription to `topic`.
    fn subscribe(&mut self, topic: &str);

    /// Queue a publish of `payload` on `topic`.
    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS);

    /// Whether outbound bytes are waiting to be written.
    fn has_pending_output(&self) -> bool;

    /// Up to `max_bytes` of pending outbound bytes, without consuming them.
    fn drain_output(&mut self, max_bytes: usize) -> &[u8];

    /// Mark the first `n` drained bytes as written.
    fn acknowledge_sent(&mut self, n: usize);

    /// Hand over bytes read from the transport.
    ///
    /// # Errors
    ///
    /// Returns an error when the peer sent something that cannot be decoded;
    /// the caller should drop the connection.
    fn feed_input(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Next complete inbound message, if any.
    fn pop_message(&mut self) -> Option<InboundMessage>;

    /// Whether the protocol handshake has completed.
    fn is_connected(&self) -> bool;

    /// Give the session a chance to queue keep-alive traffic.
    fn poll_timers(&mut self, _now: Instant) {}
}
