//! Human-readable single-line formatter.

use super::Formatter;
use crate::config::FormatterConfig;
use crate::encoding::{self, BinaryText, REDACTED};
use crate::event::{
    AckEvent, ConnackEvent, ConnectEvent, Direction, DisconnectCause, DisconnectEvent,
    DisconnectLifecycleEvent, MessageType, PacketDirection, PingEvent, ProtocolEvent,
    PublishEvent, PublishMessage, SubackEvent, SubscribeEvent, UnsubscribeEvent, UserProperty,
    WillMessage,
};
use std::fmt::Display;

/// Plain text formatter.
///
/// Line shape: `<Received|Sent> <TYPE> <from|to> client '<id>': <Field>: '<value>', ...`.
/// Absent optional values that are part of the field set render as `'null'`.
pub struct TextFormatter {
    verbose: bool,
    include_payload: bool,
    redact_password: bool,
}

impl TextFormatter {
    pub fn new(config: &FormatterConfig) -> Self {
        Self {
            verbose: config.verbose,
            include_payload: config.include_payload,
            redact_password: config.redact_password,
        }
    }

    fn connect(&self, e: &ConnectEvent) -> String {
        let mut f = Fields::default();
        f.value("Protocol version", e.protocol_version)
            .value("Clean Start", e.clean_start)
            .value("Session Expiry Interval", e.session_expiry_interval);

        if self.verbose {
            f.value("Keep Alive", e.keep_alive)
                .value("Maximum Packet Size", e.maximum_packet_size)
                .value("Receive Maximum", e.receive_maximum)
                .value("Topic Alias Maximum", e.topic_alias_maximum)
                .value("Request Problem Information", e.request_problem_information)
                .value("Request Response Information", e.request_response_information)
                .optional("Username", e.username.as_deref());

            if self.redact_password {
                f.raw(format!("Password: {}", REDACTED));
            } else {
                f.binary("Password", e.password.as_deref());
            }

            f.optional("Auth Method", e.auth_method.as_deref())
                .binary("Auth Data", e.auth_data.as_deref())
                .user_properties(&e.user_properties);

            if let Some(ref will) = e.will {
                f.raw(self.will(will));
            }
        }

        f.finish(headline(Direction::Inbound, "CONNECT", e.client_id.as_deref()))
    }

    fn connack(&self, e: &ConnackEvent) -> String {
        let mut f = Fields::default();
        f.value("Reason Code", e.reason_code)
            .value("Session Present", e.session_present);

        if self.verbose {
            f.optional("Session Expiry Interval", e.session_expiry_interval);
            // no colon after this label
            f.raw(format!(
                "Assigned ClientId '{}'",
                escape(e.assigned_client_id.as_deref().unwrap_or("null"))
            ));
            f.optional("Maximum QoS", e.maximum_qos.map(|q| q.name()))
                .value("Maximum Packet Size", e.maximum_packet_size)
                .value("Receive Maximum", e.receive_maximum)
                .value("Topic Alias Maximum", e.topic_alias_maximum)
                .optional("Reason String", e.reason_string.as_deref())
                .optional("Response Information", e.response_information.as_deref())
                .optional("Server Keep Alive", e.server_keep_alive)
                .optional("Server Reference", e.server_reference.as_deref())
                .value("Shared Subscription Available", e.shared_subscriptions_available)
                .value("Wildcards Available", e.wildcard_subscriptions_available)
                .value("Retain Available", e.retain_available)
                .value(
                    "Subscription Identifiers Available",
                    e.subscription_identifiers_available,
                )
                .optional("Auth Method", e.auth_method.as_deref())
                .binary("Auth Data", e.auth_data.as_deref())
                .user_properties(&e.user_properties);
        }

        f.finish(headline(Direction::Outbound, "CONNACK", e.client_id.as_deref()))
    }

    fn publish(&self, e: &PublishEvent) -> String {
        let mut f = Fields::default();
        self.message_fields(&mut f, &e.message);

        let client_id = escape(e.client_id.as_deref().unwrap_or("null"));
        let topic = escape(&e.message.topic);
        let head = match e.direction {
            PacketDirection::Inbound => format!(
                "Received PUBLISH from client '{}' for topic '{}'",
                client_id, topic
            ),
            PacketDirection::Outbound => {
                format!("Sent PUBLISH to client '{}' on topic '{}'", client_id, topic)
            }
        };
        f.finish(head)
    }

    /// Fields shared by PUBLISH and the will message.
    fn message_fields(&self, f: &mut Fields, m: &PublishMessage) {
        if self.include_payload {
            match m.payload.as_deref() {
                Some(bytes) => {
                    f.binary("Payload", Some(bytes));
                }
                None if self.verbose => {
                    f.value("Payload", "null");
                }
                None => {}
            }
        }

        f.value("QoS", m.qos.number()).value("Retained", m.retain);

        if self.verbose {
            f.optional("Message Expiry Interval", m.message_expiry_interval)
                .value("Duplicate Delivery", m.duplicate_delivery)
                // decoded as-is, never hex
                .optional(
                    "Correlation Data",
                    m.correlation_data.as_deref().map(encoding::decode),
                )
                .optional("Response Topic", m.response_topic.as_deref())
                .optional("Content Type", m.content_type.as_deref())
                .optional(
                    "Payload Format Indicator",
                    m.payload_format_indicator.map(|p| p.as_str()),
                )
                .value(
                    "Subscription Identifiers",
                    bracketed(&m.subscription_identifiers),
                )
                .user_properties(&m.user_properties);
        }
    }

    fn will(&self, will: &WillMessage) -> String {
        let mut inner = Fields::default();
        inner.value("Topic", &will.message.topic);
        self.message_fields(&mut inner, &will.message);
        inner.value("Will Delay", will.delay_interval);
        format!("Will: {{ {} }}", inner.join())
    }

    fn subscribe(&self, e: &SubscribeEvent) -> String {
        let topics = e.subscriptions.iter().map(|s| {
            if self.verbose {
                format!(
                    "[Topic: '{}', QoS: '{}', Retain As Published: '{}', No Local: '{}', Retain Handling: '{}']",
                    escape(&s.topic_filter),
                    s.qos.number(),
                    s.retain_as_published,
                    s.no_local,
                    s.retain_handling.as_str()
                )
            } else {
                format!("[Topic: '{}', QoS: '{}']", escape(&s.topic_filter), s.qos.number())
            }
        });

        let mut f = Fields::default();
        f.list("Topics", topics);
        if self.verbose {
            f.optional("Subscription Identifier", e.subscription_identifier)
                .user_properties(&e.user_properties);
        }
        f.finish(headline(Direction::Inbound, "SUBSCRIBE", e.client_id.as_deref()))
    }

    fn reason_codes(&self, kind: MessageType, label: &str, e: &SubackEvent) -> String {
        let mut f = Fields::default();
        f.list(
            label,
            e.reason_codes
                .iter()
                .map(|code| format!("[Reason Code: '{}']", code)),
        );
        if self.verbose {
            f.optional("Reason String", e.reason_string.as_deref())
                .user_properties(&e.user_properties);
        }
        f.finish(headline(
            Direction::Outbound,
            kind.display_name(),
            e.client_id.as_deref(),
        ))
    }

    fn unsubscribe(&self, e: &UnsubscribeEvent) -> String {
        let mut f = Fields::default();
        f.list(
            "Topics",
            e.topic_filters
                .iter()
                .map(|t| format!("[Topic: '{}']", escape(t))),
        );
        if self.verbose {
            f.user_properties(&e.user_properties);
        }
        f.finish(headline(Direction::Inbound, "UNSUBSCRIBE", e.client_id.as_deref()))
    }

    fn ping(&self, kind: MessageType, direction: Direction, e: &PingEvent) -> String {
        headline(direction, kind.display_name(), e.client_id.as_deref())
    }

    fn ack(&self, kind: MessageType, e: &AckEvent) -> String {
        let mut f = Fields::default();
        f.value("Reason Code", e.reason_code);
        if self.verbose {
            f.optional("Reason String", e.reason_string.as_deref())
                .user_properties(&e.user_properties);
        }
        f.finish(headline(
            e.direction.into(),
            kind.display_name(),
            e.client_id.as_deref(),
        ))
    }

    fn disconnect(&self, e: &DisconnectEvent) -> String {
        let mut f = Fields::default();
        f.value("Reason Code", e.reason_code);
        if self.verbose {
            f.optional("Reason String", e.reason_string.as_deref())
                .optional("Server Reference", e.server_reference.as_deref())
                .optional("Session Expiry", e.session_expiry_interval)
                .user_properties(&e.user_properties);
        }
        f.finish(headline(
            e.direction.into(),
            "DISCONNECT",
            e.client_id.as_deref(),
        ))
    }

    fn disconnect_lifecycle(&self, e: &DisconnectLifecycleEvent) -> String {
        let mut f = Fields::default();
        f.optional("Reason Code", e.reason_code);
        if self.verbose {
            f.optional("Reason String", e.reason_string.as_deref())
                .user_properties(&e.user_properties);
        }
        let head = escape(&e.headline());
        match e.cause {
            // the headline is a full sentence here
            DisconnectCause::AuthenticationFailed => format!("{} {}", head, f.join()),
            _ => f.finish(head),
        }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, event: &ProtocolEvent) -> String {
        let kind = event.message_type();
        match event {
            ProtocolEvent::Connect(e) => self.connect(e),
            ProtocolEvent::Connack(e) => self.connack(e),
            ProtocolEvent::Publish(e) => self.publish(e),
            ProtocolEvent::Subscribe(e) => self.subscribe(e),
            ProtocolEvent::Suback(e) => self.reason_codes(kind, "Suback Reason Codes", e),
            ProtocolEvent::Unsubscribe(e) => self.unsubscribe(e),
            ProtocolEvent::Unsuback(e) => self.reason_codes(kind, "Unsuback Reason Codes", e),
            ProtocolEvent::Pingreq(e) => self.ping(kind, Direction::Inbound, e),
            ProtocolEvent::Pingresp(e) => self.ping(kind, Direction::Outbound, e),
            ProtocolEvent::Puback(e)
            | ProtocolEvent::Pubrec(e)
            | ProtocolEvent::Pubrel(e)
            | ProtocolEvent::Pubcomp(e) => self.ack(kind, e),
            ProtocolEvent::Disconnect(e) => self.disconnect(e),
            ProtocolEvent::DisconnectLifecycle(e) => self.disconnect_lifecycle(e),
        }
    }
}

/// Escape backslashes and every line terminator so a value can never split
/// the line or be confused with an escaped one.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\u{0b}' | '\u{0c}' | '\u{85}' | '\u{2028}' | '\u{2029}' => {
                out.push_str(&format!("\\u{{{:04x}}}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

fn headline(direction: Direction, kind: &str, client_id: Option<&str>) -> String {
    let client_id = escape(client_id.unwrap_or("null"));
    match direction {
        Direction::Inbound => format!("Received {} from client '{}'", kind, client_id),
        Direction::Outbound | Direction::Event => {
            format!("Sent {} to client '{}'", kind, client_id)
        }
    }
}

fn bracketed(ids: &[u32]) -> String {
    let items: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Comma-separated `Label: 'value'` parts of one line.
#[derive(Default)]
struct Fields(Vec<String>);

impl Fields {
    fn value(&mut self, label: &str, value: impl Display) -> &mut Self {
        self.0
            .push(format!("{}: '{}'", label, escape(&value.to_string())));
        self
    }

    fn optional<T: Display>(&mut self, label: &str, value: Option<T>) -> &mut Self {
        match value {
            Some(v) => self.value(label, v),
            None => self.value(label, "null"),
        }
    }

    fn binary(&mut self, label: &str, bytes: Option<&[u8]>) -> &mut Self {
        match bytes.map(encoding::for_text) {
            Some(BinaryText::Printable(text)) => self.value(label, text),
            Some(BinaryText::Encoded(hex)) => self.value(&format!("{} (Hex)", label), hex),
            None => self.value(label, "null"),
        }
    }

    fn raw(&mut self, part: String) -> &mut Self {
        self.0.push(part);
        self
    }

    fn list(&mut self, label: &str, items: impl Iterator<Item = String>) -> &mut Self {
        let items: Vec<String> = items.collect();
        if items.is_empty() {
            return self.raw(format!("{}: {{ }}", label));
        }
        self.raw(format!("{}: {{ {} }}", label, items.join(", ")))
    }

    fn user_properties(&mut self, properties: &[UserProperty]) -> &mut Self {
        if properties.is_empty() {
            return self.raw("User Properties: 'null'".to_string());
        }
        let rendered: Vec<String> = properties
            .iter()
            .map(|p| {
                format!(
                    "[Name: '{}', Value: '{}']",
                    escape(&p.name),
                    escape(&p.value)
                )
            })
            .collect();
        self.raw(format!("User Properties: {}", rendered.join(", ")))
    }

    fn join(&self) -> String {
        self.0.join(", ")
    }

    fn finish(self, headline: String) -> String {
        if self.0.is_empty() {
            headline
        } else {
            format!("{}: {}", headline, self.join())
        }
    }
}
