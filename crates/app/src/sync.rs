//! One synchronization step between the session and the shared state.
//!
//! Inbound messages are state echoes from the devices, so they are written
//! straight into the registry without going through the scheduler. The
//! scheduler then runs once and every device it changed is published.

use homeauto_domain::device::{DeviceId, SwitchState};
use homeauto_domain::time::Timestamp;

use crate::hub::HubState;
use crate::ports::{MessagingSession, QoS};

/// Drain inbound echoes, tick the scheduler, and queue the resulting
/// publishes on `session`.
///
/// When the scheduler's full-push latch is set, every device with a known
/// state is published, not only the ones that changed. Returns the ids that
/// were published.
pub fn synchronize<S: MessagingSession>(
    state: &mut HubState,
    session: &mut S,
    now: Timestamp,
) -> Vec<DeviceId> {
    if session.is_connected() {
        while let Some(message) = session.pop_message() {
            match state.devices.apply_echo(&message.topic, &message.payload) {
                Some(id) => tracing::debug!(device = %id, topic = %message.topic, "state echo received"),
                None => tracing::trace!(topic = %message.topic, "message on unknown topic"),
            }
        }
    }

    let full_push = state.scheduler.needs_push();
    let changed = state.tick(now);

    let to_publish: Vec<DeviceId> = if full_push {
        state
            .devices
            .iter()
            .filter(|dev| dev.status != SwitchState::Unknown)
            .map(|dev| dev.id)
            .collect()
    } else {
        changed
    };

    for id in &to_publish {
        let Some(device) = state.devices.get(*id) else {
            continue;
        };
        if let Some(payload) = device.status.as_payload() {
            tracing::info!(device = %device.name, topic = %device.topic, state = %device.status, "publishing state");
            session.publish(&device.topic, payload.as_bytes(), QoS::AtMostOnce);
        }
    }

    to_publish
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{EventSpec, Hub};
    use crate::ports::InboundMessage;
    use chrono::{TimeZone, Utc};
    use homeauto_domain::device::DeviceRegistry;
    use homeauto_domain::schedule::ScheduleStore;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeSession {
        connected: bool,
        inbound: VecDeque<InboundMessage>,
        published: Vec<(String, Vec<u8>)>,
    }

    impl MessagingSession for FakeSession {
        type Error = std::io::Error;

        fn subscribe(&mut self, _topic: &str) {}

        fn publish(&mut self, topic: &str, payload: &[u8], _qos: QoS) {
            self.published.push((topic.to_string(), payload.to_vec()));
        }

        fn has_pending_output(&self) -> bool {
            false
        }

        fn drain_output(&mut self, _max_bytes: usize) -> &[u8] {
            &[]
        }

        fn acknowledge_sent(&mut self, _n: usize) {}

        fn feed_input(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn pop_message(&mut self) -> Option<InboundMessage> {
            self.inbound.pop_front()
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn hub() -> Hub {
        let mut devices = DeviceRegistry::new();
        devices.register("Heater", "home/heater").unwrap();
        devices.register("Lamp", "home/lamp").unwrap();
        let hub = Hub::new(devices, ScheduleStore::new(), SwitchState::Off);
        hub.add_events(EventSpec {
            target: 1,
            hour: 8,
            minute: 0,
            duration_minutes: 60,
            recurrence: 0,
        });
        hub
    }

    fn at(hour: u32, minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 3, hour, minute, 0).unwrap()
    }

    #[test]
    fn should_publish_every_device_on_first_step() {
        let hub = hub();
        let mut session = FakeSession {
            connected: true,
            ..FakeSession::default()
        };

        synchronize(&mut hub.lock(), &mut session, at(8, 30));

        assert_eq!(
            session.published,
            vec![
                ("home/heater".to_string(), b"0".to_vec()),
                ("home/lamp".to_string(), b"1".to_vec()),
            ]
        );
    }

    #[test]
    fn should_publish_only_changes_after_first_step() {
        let hub = hub();
        let mut session = FakeSession::default();

        synchronize(&mut hub.lock(), &mut session, at(7, 30));
        session.published.clear();

        synchronize(&mut hub.lock(), &mut session, at(7, 45));
        assert!(session.published.is_empty());

        synchronize(&mut hub.lock(), &mut session, at(8, 0));
        assert_eq!(
            session.published,
            vec![("home/lamp".to_string(), b"1".to_vec())]
        );
    }

    #[test]
    fn should_republish_everything_after_push_request() {
        let hub = hub();
        let mut session = FakeSession::default();
        synchronize(&mut hub.lock(), &mut session, at(7, 30));
        session.published.clear();

        hub.lock().scheduler.request_full_push();
        let published = synchronize(&mut hub.lock(), &mut session, at(7, 31));
        assert_eq!(published.len(), 2);
        assert_eq!(session.published.len(), 2);
    }

    #[test]
    fn should_apply_echo_and_correct_divergence() {
        let hub = hub();
        let mut session = FakeSession {
            connected: true,
            ..FakeSession::default()
        };
        synchronize(&mut hub.lock(), &mut session, at(7, 30));
        session.published.clear();

        // Someone switched the heater on by hand; the schedule wants it off.
        session.inbound.push_back(InboundMessage {
            topic: "home/heater".to_string(),
            payload: b"1".to_vec(),
        });
        synchronize(&mut hub.lock(), &mut session, at(7, 31));

        assert_eq!(
            session.published,
            vec![("home/heater".to_string(), b"0".to_vec())]
        );
    }

    #[test]
    fn should_not_drain_messages_before_handshake() {
        let hub = hub();
        let mut session = FakeSession::default();
        session.inbound.push_back(InboundMessage {
            topic: "home/heater".to_string(),
            payload: b"1".to_vec(),
        });

        synchronize(&mut hub.lock(), &mut session, at(7, 30));
        assert_eq!(session.inbound.len(), 1);
    }
}
