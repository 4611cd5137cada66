//! Spam notifications.

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Emitted when a check classifies an IP as spam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpamEvent {
    pub ip: String,
    pub score: u8,
}

impl SpamEvent {
    pub const NAME: &'static str = "IsSpamIp";
}

/// Receives spam events. Fire-and-forget.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: &SpamEvent);
}

/// Logs spam events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn emit(&self, event: &SpamEvent) {
        warn!(event = SpamEvent::NAME, ip = %event.ip, score = event.score, "Spam IP detected");
    }
}

/// Forwards spam events over a channel.
pub struct ChannelSink {
    tx: UnboundedSender<SpamEvent>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<SpamEvent>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelSink {
    fn emit(&self, event: &SpamEvent) {
        // Receiver gone means nobody is listening
        let _ = self.tx.send(event.clone());
    }
}
