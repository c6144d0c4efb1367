//! Hook-side dispatch: per-event switches in front of the logger.
//!
//! Host integrations call [`EventDispatcher::dispatch_with`] from their
//! packet interceptors with a closure that adapts the host's packet into a
//! [`ProtocolEvent`]. The closure only runs when the event kind is enabled,
//! and an adapter failure is swallowed so the protocol path never notices.

use crate::config::{EventToggles, MessageLogConfig};
use crate::event::{Direction, MessageType, ProtocolEvent};
use crate::logger::MessageLogger;
use crate::output::create_sink;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

pub struct EventDispatcher {
    logger: MessageLogger,
    toggles: EventToggles,
    /// Events skipped because their switch is off
    events_filtered: AtomicU64,
    /// Adapter closures that returned an error
    adapter_failures: AtomicU64,
}

impl EventDispatcher {
    pub fn new(logger: MessageLogger, toggles: EventToggles) -> Self {
        Self {
            logger,
            toggles,
            events_filtered: AtomicU64::new(0),
            adapter_failures: AtomicU64::new(0),
        }
    }

    /// Build the logger, sinks and switches from a loaded configuration.
    pub fn from_config(config: &MessageLogConfig) -> Self {
        let sink = create_sink(&config.outputs);
        let logger = MessageLogger::new(config.formatter_config(), sink);

        info!(
            format = ?config.format,
            verbose = config.verbose,
            outputs = config.outputs.len(),
            "MQTT message logging initialized"
        );

        Self::new(logger, config.events)
    }

    /// Whether events of this kind and direction get logged.
    pub fn is_enabled(&self, message_type: MessageType, direction: Direction) -> bool {
        let t = &self.toggles;
        let inbound = direction == Direction::Inbound;
        match message_type {
            MessageType::Connect => t.client_connect,
            MessageType::Disconnect => t.client_disconnect,
            MessageType::Connack => t.connack_send,
            MessageType::Publish if inbound => t.publish_received,
            MessageType::Publish => t.publish_send,
            MessageType::Subscribe => t.subscribe_received,
            MessageType::Suback => t.suback_send,
            MessageType::Unsubscribe => t.unsubscribe_received,
            MessageType::Unsuback => t.unsuback_send,
            MessageType::Pingreq => t.ping_request_received,
            MessageType::Pingresp => t.ping_response_send,
            MessageType::Puback if inbound => t.puback_received,
            MessageType::Puback => t.puback_send,
            MessageType::Pubrec if inbound => t.pubrec_received,
            MessageType::Pubrec => t.pubrec_send,
            MessageType::Pubrel if inbound => t.pubrel_received,
            MessageType::Pubrel => t.pubrel_send,
            MessageType::Pubcomp if inbound => t.pubcomp_received,
            MessageType::Pubcomp => t.pubcomp_send,
        }
    }

    /// Log an already-built event if its switch is on. Returns whether a line
    /// was handed to the logger.
    pub fn dispatch(&self, event: &ProtocolEvent) -> bool {
        if !self.is_enabled(event.message_type(), event.direction()) {
            self.events_filtered.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.logger.log(event);
        true
    }

    /// Check the switch, then run the adapter and log its event.
    ///
    /// An adapter error is logged at DEBUG and dropped; nothing reaches the
    /// sink for that call.
    pub fn dispatch_with<F, E>(
        &self,
        message_type: MessageType,
        direction: Direction,
        build: F,
    ) -> bool
    where
        F: FnOnce() -> Result<ProtocolEvent, E>,
        E: Display,
    {
        if !self.is_enabled(message_type, direction) {
            self.events_filtered.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        match build() {
            Ok(event) => {
                self.logger.log(&event);
                true
            }
            Err(e) => {
                debug!(
                    message_type = %message_type,
                    direction = %direction,
                    error = %e,
                    "Could not log MQTT packet"
                );
                self.adapter_failures.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn logger(&self) -> &MessageLogger {
        &self.logger
    }

    pub fn events_filtered(&self) -> u64 {
        self.events_filtered.load(Ordering::Relaxed)
    }

    pub fn adapter_failures(&self) -> u64 {
        self.adapter_failures.load(Ordering::Relaxed)
    }
}
