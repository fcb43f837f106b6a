use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("not connected to the broker")]
    NotConnected,
    #[error("broker at '{address}' rejected the connection: {reason}")]
    ConnectionRefused { address: String, reason: String },
    #[error("publish to topic '{topic}' failed: {reason}")]
    PublishFailed { topic: String, reason: String },
}

/// The port the session writes all its messages to. Real brokers live
/// behind this trait as external collaborators; the core only decides what
/// is sent, when, and in which order. QoS and retain are passed through as
/// plain configuration values.
pub trait Transport: Send + Sync {
    /// Registers the message the transport delivers on our behalf if the
    /// connection drops without an explicit [`Transport::disconnect`].
    /// Must be called before [`Transport::connect`].
    fn register_last_will(
        &self,
        topic: &str,
        payload: &[u8],
        qos: u8,
        retain: bool,
    ) -> Result<(), TransportError>;

    fn connect(&self) -> Result<(), TransportError>;

    fn publish(&self, topic: &str, payload: &[u8], qos: u8, retain: bool)
        -> Result<(), TransportError>;

    fn disconnect(&self) -> Result<(), TransportError>;
}

/// Transport that prints every message instead of talking to a broker.
/// Useful for running the simulator without any infrastructure, and the
/// default sink of the `vehicle_sim` binary.
#[derive(Debug, Default)]
pub struct ConsoleTransport {
    connected: AtomicBool,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for ConsoleTransport {
    fn register_last_will(
        &self,
        topic: &str,
        payload: &[u8],
        _qos: u8,
        _retain: bool,
    ) -> Result<(), TransportError> {
        info!(
            "Registered last will on topic '{}': {}",
            topic,
            String::from_utf8_lossy(payload)
        );
        Ok(())
    }

    fn connect(&self) -> Result<(), TransportError> {
        self.connected.store(true, Ordering::SeqCst);
        info!("Connected");
        Ok(())
    }

    fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        _qos: u8,
        _retain: bool,
    ) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }
        info!("{} -> {}", topic, String::from_utf8_lossy(payload));
        Ok(())
    }

    fn disconnect(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);
        info!("Disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_transport_rejects_publish_before_connect() {
        let transport = ConsoleTransport::new();
        let result = transport.publish("vehicles", b"{}", 0, false);
        assert!(matches!(result, Err(TransportError::NotConnected)));

        transport.connect().unwrap();
        transport.publish("vehicles", b"{}", 0, false).unwrap();

        transport.disconnect().unwrap();
        let result = transport.publish("vehicles", b"{}", 0, false);
        assert!(matches!(result, Err(TransportError::NotConnected)));
    }
}
