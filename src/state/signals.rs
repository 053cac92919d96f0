use tokio::sync::broadcast;

use crate::dto::device::DeviceReading;

/// Broadcast hub carrying raw device readings from the ingress route to every
/// interested consumer (the session engine, and anything else that subscribes).
///
/// Publishing never blocks and never fails: with no subscribers attached the
/// reading is simply dropped, which is the correct behavior for a live signal
/// that has no value once the moment has passed.
#[derive(Clone)]
pub struct SignalHub {
    sender: broadcast::Sender<DeviceReading>,
}

impl SignalHub {
    /// Construct a hub backed by a broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent readings.
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceReading> {
        self.sender.subscribe()
    }

    /// Fan a reading out to all current subscribers.
    pub fn publish(&self, reading: DeviceReading) {
        let _ = self.sender.send(reading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publishing_without_subscribers_is_a_no_op() {
        let hub = SignalHub::new(4);
        hub.publish(DeviceReading::default());
    }

    #[tokio::test]
    async fn subscribers_receive_published_readings() {
        let hub = SignalHub::new(4);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        hub.publish(DeviceReading {
            pad: Some("RED".into()),
            force: Some(42),
            ..Default::default()
        });

        let reading = first.recv().await.expect("reading delivered");
        assert_eq!(reading.pad.as_deref(), Some("RED"));
        let reading = second.recv().await.expect("reading delivered");
        assert_eq!(reading.force, Some(42));
    }
}
