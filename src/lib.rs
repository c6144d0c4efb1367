//! MQTT Message Log
//!
//! Formats MQTT protocol events (CONNECT, PUBLISH, acknowledgements,
//! disconnects, ...) as single-line plain text or JSON log records, with
//! switches for verbosity, payload inclusion and password redaction.

pub mod config;
pub mod dispatch;
pub mod encoding;
pub mod event;
pub mod format;
pub mod logger;
pub mod output;

pub use config::{
    ConfigError, EventToggles, FormatterConfig, MessageLogConfig, OutputConfig, OutputFormat,
};
pub use dispatch::EventDispatcher;
pub use event::{
    AckEvent, ConnackEvent, ConnectEvent, Direction, DisconnectCause, DisconnectEvent,
    DisconnectLifecycleEvent, MessageType, PacketDirection, PayloadFormatIndicator, PingEvent,
    ProtocolEvent, ProtocolVersion, PublishEvent, PublishMessage, Qos, ReasonCode,
    RetainHandling, SubackEvent, SubscribeEvent, Subscription, UnsubackEvent, UnsubscribeEvent,
    UserProperty, WillMessage,
};
pub use format::{create_formatter, Formatter, JsonFormatter, TextFormatter};
pub use logger::MessageLogger;
pub use output::{create_sink, LogSink, MemorySink, SinkError};
