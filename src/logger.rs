//! Message logger: one formatter, one sink, one line per event.

use crate::config::FormatterConfig;
use crate::event::{
    AckEvent, ConnackEvent, ConnectEvent, DisconnectEvent, DisconnectLifecycleEvent, PingEvent,
    ProtocolEvent, PublishEvent, SubackEvent, SubscribeEvent, UnsubackEvent, UnsubscribeEvent,
};
use crate::format::{create_formatter, Formatter};
use crate::output::LogSink;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Formats protocol events and hands each line to a sink.
///
/// The formatter is chosen once, at construction. Every `log_*` call writes
/// exactly one line. A failing sink is reported at DEBUG and otherwise
/// ignored, so logging never disturbs the caller.
pub struct MessageLogger {
    config: FormatterConfig,
    formatter: Box<dyn Formatter>,
    sink: Arc<dyn LogSink>,
    /// Lines accepted by the sink
    lines_written: AtomicU64,
    /// Lines the sink rejected
    sink_errors: AtomicU64,
}

impl MessageLogger {
    pub fn new(config: FormatterConfig, sink: Arc<dyn LogSink>) -> Self {
        Self::with_formatter(config, create_formatter(&config), sink)
    }

    /// Use a specific formatter instead of the one `config.format` selects.
    pub fn with_formatter(
        config: FormatterConfig,
        formatter: Box<dyn Formatter>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        debug!(
            format = ?config.format,
            verbose = config.verbose,
            payload = config.include_payload,
            redact_password = config.redact_password,
            "Message logger initialized"
        );
        Self {
            config,
            formatter,
            sink,
            lines_written: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Format and write any event.
    pub fn log(&self, event: &ProtocolEvent) {
        let line = self.formatter.format(event);
        match self.sink.info(&line) {
            Ok(()) => {
                self.lines_written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                debug!(
                    message_type = %event.message_type(),
                    error = %e,
                    "Failed to write message log line"
                );
                self.sink_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn log_connect(&self, event: ConnectEvent) {
        self.log(&ProtocolEvent::Connect(event));
    }

    pub fn log_connack(&self, event: ConnackEvent) {
        self.log(&ProtocolEvent::Connack(event));
    }

    pub fn log_publish(&self, event: PublishEvent) {
        self.log(&ProtocolEvent::Publish(event));
    }

    pub fn log_subscribe(&self, event: SubscribeEvent) {
        self.log(&ProtocolEvent::Subscribe(event));
    }

    pub fn log_suback(&self, event: SubackEvent) {
        self.log(&ProtocolEvent::Suback(event));
    }

    pub fn log_unsubscribe(&self, event: UnsubscribeEvent) {
        self.log(&ProtocolEvent::Unsubscribe(event));
    }

    pub fn log_unsuback(&self, event: UnsubackEvent) {
        self.log(&ProtocolEvent::Unsuback(event));
    }

    pub fn log_pingreq(&self, event: PingEvent) {
        self.log(&ProtocolEvent::Pingreq(event));
    }

    pub fn log_pingresp(&self, event: PingEvent) {
        self.log(&ProtocolEvent::Pingresp(event));
    }

    pub fn log_puback(&self, event: AckEvent) {
        self.log(&ProtocolEvent::Puback(event));
    }

    pub fn log_pubrec(&self, event: AckEvent) {
        self.log(&ProtocolEvent::Pubrec(event));
    }

    pub fn log_pubrel(&self, event: AckEvent) {
        self.log(&ProtocolEvent::Pubrel(event));
    }

    pub fn log_pubcomp(&self, event: AckEvent) {
        self.log(&ProtocolEvent::Pubcomp(event));
    }

    pub fn log_disconnect(&self, event: DisconnectEvent) {
        self.log(&ProtocolEvent::Disconnect(event));
    }

    pub fn log_disconnect_lifecycle(&self, event: DisconnectLifecycleEvent) {
        self.log(&ProtocolEvent::DisconnectLifecycle(event));
    }

    /// Flush the sink. Errors are reported at DEBUG only.
    pub fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            debug!(error = %e, "Failed to flush message log sink");
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::Relaxed)
    }

    pub fn sink_errors(&self) -> u64 {
        self.sink_errors.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::event::{PacketDirection, PublishMessage, Qos};
    use crate::output::{MemorySink, SinkError};

    struct FailingSink;

    impl LogSink for FailingSink {
        fn info(&self, _line: &str) -> Result<(), SinkError> {
            Err(SinkError::Poisoned)
        }
    }

    struct Fixed;

    impl Formatter for Fixed {
        fn format(&self, _event: &ProtocolEvent) -> String {
            "fixed".to_string()
        }
    }

    #[test]
    fn test_one_line_per_call() {
        let sink = Arc::new(MemorySink::new());
        let logger = MessageLogger::new(FormatterConfig::default(), sink.clone());

        logger.log_pingreq(PingEvent::new("c1"));
        logger.log_pingresp(PingEvent::new("c1"));

        assert_eq!(
            sink.lines(),
            vec![
                "Received PING REQUEST from client 'c1'",
                "Sent PING RESPONSE to client 'c1'"
            ]
        );
        assert_eq!(logger.lines_written(), 2);
        assert_eq!(logger.sink_errors(), 0);
    }

    #[test]
    fn test_formatter_selected_from_config() {
        let sink = Arc::new(MemorySink::new());
        let config = FormatterConfig {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let logger = MessageLogger::new(config, sink.clone());

        logger.log_publish(PublishEvent {
            direction: PacketDirection::Outbound,
            client_id: Some("c1".to_string()),
            message: PublishMessage::new("t", Qos::AtMostOnce),
        });

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("{\"timestamp\":"));
    }

    #[test]
    fn test_sink_error_is_suppressed() {
        let logger = MessageLogger::new(FormatterConfig::default(), Arc::new(FailingSink));

        logger.log_puback(AckEvent::default());
        logger.log_puback(AckEvent::default());

        assert_eq!(logger.lines_written(), 0);
        assert_eq!(logger.sink_errors(), 2);
    }

    #[test]
    fn test_custom_formatter() {
        let sink = Arc::new(MemorySink::new());
        let logger =
            MessageLogger::with_formatter(FormatterConfig::default(), Box::new(Fixed), sink.clone());

        logger.log_disconnect(DisconnectEvent::default());
        assert_eq!(sink.lines(), vec!["fixed"]);
    }
}
