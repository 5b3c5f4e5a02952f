//! Sans-IO MQTT 3.1.1 session built on the `rumqttc` packet codecs.
//!
//! The session owns two byte buffers. Everything it wants to send is encoded
//! into the outbound buffer and stays there until the connection loop reports
//! it written; everything the loop reads is appended to the inbound buffer and
//! decoded as soon as a whole packet is available.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use bytes::{Buf, BytesMut};
use homeauto_app::ports::{InboundMessage, MessagingSession, QoS};
use rumqttc::mqttbytes::Error as PacketError;
use rumqttc::{ConnectReturnCode, Packet};

use crate::config::MqttConfig;
use crate::error::MqttError;

/// Largest packet accepted from or sent to the broker.
const MAX_PACKET_SIZE: usize = 256 * 1024;

/// Encoded PINGREQ: fixed header only.
const PING_REQUEST: [u8; 2] = [0xC0, 0x00];

/// Parameters of the CONNECT packet.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub client_id: String,
    pub credentials: Option<(String, String)>,
    pub keep_alive: Duration,
}

impl SessionOptions {
    #[must_use]
    pub fn from_config(config: &MqttConfig) -> Self {
        Self {
            client_id: config.client_id(),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
            keep_alive: config.keep_alive(),
        }
    }
}

/// One MQTT session, from CONNECT to the end of its transport.
#[derive(Debug)]
pub struct MqttSession {
    outbound: BytesMut,
    inbound: BytesMut,
    messages: VecDeque<InboundMessage>,
    connected: bool,
    keep_alive: Duration,
    last_sent: Instant,
    next_packet_id: u16,
}

impl MqttSession {
    /// Create a session with CONNECT already queued.
    #[must_use]
    pub fn new(options: &SessionOptions) -> Self {
        let mut session = Self {
            outbound: BytesMut::with_capacity(1024),
            inbound: BytesMut::with_capacity(1024),
            messages: VecDeque::new(),
            connected: false,
            keep_alive: options.keep_alive,
            last_sent: Instant::now(),
            next_packet_id: 1,
        };

        let mut connect = rumqttc::Connect::new(options.client_id.as_str());
        connect.keep_alive = u16::try_from(options.keep_alive.as_secs()).unwrap_or(u16::MAX);
        connect.clean_session = true;
        if let Some((user, pass)) = &options.credentials {
            connect.set_login(user.as_str(), pass.as_str());
        }
        session.encode(Packet::Connect(connect));
        session
    }

    fn encode(&mut self, packet: Packet) {
        if let Err(err) = packet.write(&mut self.outbound, MAX_PACKET_SIZE) {
            tracing::warn!(%err, "dropping packet that cannot be encoded");
        }
    }

    fn packet_id(&mut self) -> u16 {
        let id = self.next_packet_id;
        self.next_packet_id = self.next_packet_id.checked_add(1).unwrap_or(1);
        id
    }

    fn handle(&mut self, packet: Packet) -> Result<(), MqttError> {
        match packet {
            Packet::ConnAck(ack) => {
                if ack.code != ConnectReturnCode::Success {
                    return Err(MqttError::Refused(format!("{:?}", ack.code)));
                }
                tracing::info!("MQTT session established");
                self.connected = true;
            }
            Packet::Publish(publish) => match std::str::from_utf8(publish.topic.as_ref()) {
                Ok(topic) => self.messages.push_back(InboundMessage {
                    topic: topic.to_string(),
                    payload: publish.payload.to_vec(),
                }),
                Err(_) => tracing::debug!("ignoring publish with non-UTF-8 topic"),
            },
            other => tracing::trace!(packet = ?other, "ignoring packet"),
        }
        Ok(())
    }
}

fn wire_qos(qos: QoS) -> rumqttc::QoS {
    match qos {
        QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
        QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
        QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
    }
}

impl MessagingSession for MqttSession {
    type Error = MqttError;

    fn subscribe(&mut self, topic: &str) {
        let mut subscribe = rumqttc::Subscribe::new(topic, rumqttc::QoS::AtMostOnce);
        subscribe.pkid = self.packet_id();
        self.encode(Packet::Subscribe(subscribe));
    }

    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) {
        let mut publish = rumqttc::Publish::new(topic, wire_qos(qos), payload.to_vec());
        if qos != QoS::AtMostOnce {
            publish.pkid = self.packet_id();
        }
        self.encode(Packet::Publish(publish));
    }

    fn has_pending_output(&self) -> bool {
        !self.outbound.is_empty()
    }

    fn drain_output(&mut self, max_bytes: usize) -> &[u8] {
        let len = self.outbound.len().min(max_bytes);
        &self.outbound[..len]
    }

    fn acknowledge_sent(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.outbound.advance(n.min(self.outbound.len()));
        self.last_sent = Instant::now();
    }

    fn feed_input(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.inbound.extend_from_slice(bytes);
        loop {
            match Packet::read(&mut self.inbound, MAX_PACKET_SIZE) {
                Ok(packet) => self.handle(packet)?,
                Err(PacketError::InsufficientBytes(_)) => return Ok(()),
                Err(err) => return Err(MqttError::Protocol(err)),
            }
        }
    }

    fn pop_message(&mut self) -> Option<InboundMessage> {
        self.messages.pop_front()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn poll_timers(&mut self, now: Instant) {
        if !self.connected || self.keep_alive.is_zero() || self.has_pending_output() {
            return;
        }
        if now.saturating_duration_since(self.last_sent) >= self.keep_alive {
            tracing::trace!("queueing keep-alive ping");
            self.outbound.extend_from_slice(&PING_REQUEST);
            self.last_sent = now;
        }
    }
}
