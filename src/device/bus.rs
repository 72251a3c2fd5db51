//! Device-wide battery notification bus.
//!
//! Some devices report their battery voltage on a different cluster than the
//! one exposing battery attributes. The reporting cluster publishes on the bus
//! and every subscribed cluster receives the reading.

use parking_lot::RwLock;
use std::sync::Arc;

/// Receiver of battery voltage readings.
pub trait BatteryListener: Send + Sync {
    fn battery_reported(&self, millivolts: u16);
}

/// Fan-out of battery readings to the clusters of one device.
#[derive(Default)]
pub struct BatteryBus {
    listeners: RwLock<Vec<Arc<dyn BatteryListener>>>,
}

impl BatteryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn BatteryListener>) {
        self.listeners.write().push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Deliver a reading to every listener.
    pub fn battery_reported(&self, millivolts: u16) {
        let listeners: Vec<_> = self.listeners.read().clone();
        for listener in listeners {
            listener.battery_reported(millivolts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct LastReading(AtomicU32);

    impl BatteryListener for LastReading {
        fn battery_reported(&self, millivolts: u16) {
            self.0.store(millivolts as u32, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_fan_out() {
        let bus = BatteryBus::new();
        let a = Arc::new(LastReading::default());
        let b = Arc::new(LastReading::default());
        bus.add_listener(a.clone());
        bus.add_listener(b.clone());
        assert_eq!(bus.listener_count(), 2);

        bus.battery_reported(3005);
        assert_eq!(a.0.load(Ordering::SeqCst), 3005);
        assert_eq!(b.0.load(Ordering::SeqCst), 3005);
    }
}
