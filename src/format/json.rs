//! Single-line JSON formatter.

use super::Formatter;
use crate::config::FormatterConfig;
use crate::encoding::{self, BinaryText, REDACTED};
use crate::event::{
    AckEvent, ConnackEvent, ConnectEvent, DisconnectEvent, DisconnectLifecycleEvent,
    ProtocolEvent, PublishEvent, PublishMessage, SubackEvent, SubscribeEvent, UnsubscribeEvent,
    UserProperty, WillMessage,
};
use chrono::Utc;
use serde_json::{json, Map, Value};

/// Source of the `timestamp` value, in epoch milliseconds.
pub type Clock = fn() -> i64;

fn system_clock() -> i64 {
    Utc::now().timestamp_millis()
}

/// JSON log formatter.
///
/// Every record starts with `timestamp`, `messageType` and `direction`. Keys
/// of absent optional fields are left out rather than set to `null`.
pub struct JsonFormatter {
    verbose: bool,
    include_payload: bool,
    redact_password: bool,
    clock: Clock,
}

impl JsonFormatter {
    pub fn new(config: &FormatterConfig) -> Self {
        Self {
            verbose: config.verbose,
            include_payload: config.include_payload,
            redact_password: config.redact_password,
            clock: system_clock,
        }
    }

    /// Replace the wall clock, e.g. with a constant in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn connect(&self, r: &mut Record, e: &ConnectEvent) {
        r.opt("clientId", e.client_id.as_deref())
            .put("protocolVersion", e.protocol_version.as_str())
            .put("cleanStart", e.clean_start)
            .put("sessionExpiryInterval", e.session_expiry_interval);

        if !self.verbose {
            return;
        }

        r.put("keepAlive", e.keep_alive)
            .put("maximumPacketSize", e.maximum_packet_size)
            .put("receiveMaximum", e.receive_maximum)
            .put("topicAliasMaximum", e.topic_alias_maximum)
            .put("requestProblemInformation", e.request_problem_information)
            .put("requestResponseInformation", e.request_response_information)
            .opt("username", e.username.as_deref());

        if self.redact_password {
            r.put("password", REDACTED);
        } else {
            r.binary("password", "passwordBase64", e.password.as_deref());
        }

        r.opt("authMethod", e.auth_method.as_deref())
            .binary("authData", "authDataBase64", e.auth_data.as_deref())
            .user_properties(&e.user_properties);

        if let Some(ref will) = e.will {
            r.put("will", self.will(will));
        }
    }

    fn will(&self, will: &WillMessage) -> Value {
        let mut inner = Record::default();
        inner.put("topic", will.message.topic.as_str());
        self.message(&mut inner, &will.message);
        inner.put("willDelay", will.delay_interval);
        Value::Object(inner.0)
    }

    fn connack(&self, r: &mut Record, e: &ConnackEvent) {
        r.opt("clientId", e.client_id.as_deref())
            .put("reasonCode", e.reason_code.as_str())
            .put("sessionPresent", e.session_present);

        if !self.verbose {
            return;
        }

        r.opt("sessionExpiryInterval", e.session_expiry_interval)
            .opt("assignedClientId", e.assigned_client_id.as_deref())
            .opt("maximumQoS", e.maximum_qos.map(|q| q.number()))
            .put("maximumPacketSize", e.maximum_packet_size)
            .put("receiveMaximum", e.receive_maximum)
            .put("topicAliasMaximum", e.topic_alias_maximum)
            .opt("reasonString", e.reason_string.as_deref())
            .opt("responseInformation", e.response_information.as_deref())
            .opt("serverKeepAlive", e.server_keep_alive)
            .opt("serverReference", e.server_reference.as_deref())
            .put("sharedSubscriptionsAvailable", e.shared_subscriptions_available)
            .put("wildCardSubscriptionAvailable", e.wildcard_subscriptions_available)
            .put("retainAvailable", e.retain_available)
            .put(
                "subscriptionIdentifiersAvailable",
                e.subscription_identifiers_available,
            )
            .opt("authMethod", e.auth_method.as_deref())
            .binary("authData", "authDataBase64", e.auth_data.as_deref())
            .user_properties(&e.user_properties);
    }

    fn publish(&self, r: &mut Record, e: &PublishEvent) {
        r.put("topic", e.message.topic.as_str());
        self.message(r, &e.message);
    }

    /// Keys shared by PUBLISH and the will message, after `topic`.
    fn message(&self, r: &mut Record, m: &PublishMessage) {
        if self.include_payload {
            r.binary("payload", "payloadBase64", m.payload.as_deref());
        }
        r.put("qos", m.qos.number()).put("retained", m.retain);

        if !self.verbose {
            return;
        }

        r.opt("messageExpiryInterval", m.message_expiry_interval)
            .put("duplicateDelivery", m.duplicate_delivery)
            .opt(
                "correlationData",
                m.correlation_data.as_deref().map(encoding::decode),
            )
            .opt("responseTopic", m.response_topic.as_deref())
            .opt("contentType", m.content_type.as_deref())
            .opt(
                "payloadFormatIndicator",
                m.payload_format_indicator.map(|p| p.as_str()),
            );
        if !m.subscription_identifiers.is_empty() {
            r.put("subscriptionIdentifiers", m.subscription_identifiers.clone());
        }
        r.user_properties(&m.user_properties);
    }

    fn subscribe(&self, r: &mut Record, e: &SubscribeEvent) {
        let subscriptions: Vec<Value> = e
            .subscriptions
            .iter()
            .map(|s| {
                let mut sub = Record::default();
                sub.put("topicFilter", s.topic_filter.as_str())
                    .put("qos", s.qos.number());
                if self.verbose {
                    sub.put("retainAsPublished", s.retain_as_published)
                        .put("noLocal", s.no_local)
                        .put("retainHandling", s.retain_handling.as_str());
                }
                Value::Object(sub.0)
            })
            .collect();

        r.opt("clientId", e.client_id.as_deref())
            .put("subscriptions", subscriptions);
        if self.verbose {
            r.opt("subscriptionIdentifier", e.subscription_identifier)
                .user_properties(&e.user_properties);
        }
    }

    fn reason_codes(&self, r: &mut Record, e: &SubackEvent) {
        let codes: Vec<&str> = e.reason_codes.iter().map(|c| c.as_str()).collect();
        r.opt("clientId", e.client_id.as_deref())
            .put("reasonCodes", codes);
        if self.verbose {
            r.opt("reasonString", e.reason_string.as_deref())
                .user_properties(&e.user_properties);
        }
    }

    fn unsubscribe(&self, r: &mut Record, e: &UnsubscribeEvent) {
        r.opt("clientId", e.client_id.as_deref())
            .put("topicFilters", e.topic_filters.clone());
        if self.verbose {
            r.user_properties(&e.user_properties);
        }
    }

    fn ack(&self, r: &mut Record, e: &AckEvent) {
        r.opt("clientId", e.client_id.as_deref())
            .put("reasonCode", e.reason_code.as_str());
        if self.verbose {
            r.opt("reasonString", e.reason_string.as_deref())
                .user_properties(&e.user_properties);
        }
    }

    fn disconnect(&self, r: &mut Record, e: &DisconnectEvent) {
        r.opt("clientId", e.client_id.as_deref())
            .put("reasonCode", e.reason_code.as_str());
        if self.verbose {
            r.opt("reasonString", e.reason_string.as_deref())
                .opt("serverReference", e.server_reference.as_deref())
                .opt("sessionExpiryInterval", e.session_expiry_interval)
                .user_properties(&e.user_properties);
        }
    }

    fn disconnect_lifecycle(&self, r: &mut Record, e: &DisconnectLifecycleEvent) {
        r.put("message", e.headline())
            .opt("reasonCode", e.reason_code.map(|c| c.as_str()));
        if self.verbose {
            r.opt("reasonString", e.reason_string.as_deref())
                .user_properties(&e.user_properties);
        }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, event: &ProtocolEvent) -> String {
        let mut r = Record::default();
        r.put("timestamp", (self.clock)())
            .put("messageType", event.message_type().as_str())
            .put("direction", event.direction().as_str());

        match event {
            ProtocolEvent::Connect(e) => self.connect(&mut r, e),
            ProtocolEvent::Connack(e) => self.connack(&mut r, e),
            ProtocolEvent::Publish(e) => self.publish(&mut r, e),
            ProtocolEvent::Subscribe(e) => self.subscribe(&mut r, e),
            ProtocolEvent::Suback(e) | ProtocolEvent::Unsuback(e) => self.reason_codes(&mut r, e),
            ProtocolEvent::Unsubscribe(e) => self.unsubscribe(&mut r, e),
            ProtocolEvent::Pingreq(e) | ProtocolEvent::Pingresp(e) => {
                r.opt("clientId", e.client_id.as_deref());
            }
            ProtocolEvent::Puback(e)
            | ProtocolEvent::Pubrec(e)
            | ProtocolEvent::Pubrel(e)
            | ProtocolEvent::Pubcomp(e) => self.ack(&mut r, e),
            ProtocolEvent::Disconnect(e) => self.disconnect(&mut r, e),
            ProtocolEvent::DisconnectLifecycle(e) => self.disconnect_lifecycle(&mut r, e),
        }

        Value::Object(r.0).to_string()
    }
}

/// Ordered key/value pairs of one JSON object.
#[derive(Default)]
struct Record(Map<String, Value>);

impl Record {
    fn put(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    fn opt<T: Into<Value>>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.put(key, v);
        }
        self
    }

    fn binary(&mut self, key: &str, base64_key: &str, bytes: Option<&[u8]>) -> &mut Self {
        match bytes.map(encoding::for_json) {
            Some(BinaryText::Printable(text)) => self.put(key, text),
            Some(BinaryText::Encoded(b64)) => self.put(base64_key, b64),
            None => self,
        }
    }

    fn user_properties(&mut self, properties: &[UserProperty]) -> &mut Self {
        if properties.is_empty() {
            return self;
        }
        let list: Vec<Value> = properties
            .iter()
            .map(|p| json!({ "name": p.name, "value": p.value }))
            .collect();
        self.put("userProperties", list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{
        DisconnectCause, PacketDirection, PingEvent, ProtocolVersion, Qos, ReasonCode,
        Subscription,
    };

    fn fixed_clock() -> i64 {
        1700000000000
    }

    fn formatter(verbose: bool) -> JsonFormatter {
        JsonFormatter::new(&FormatterConfig {
            verbose,
            ..Default::default()
        })
        .with_clock(fixed_clock)
    }

    fn props() -> Vec<UserProperty> {
        vec![
            UserProperty::new("name0", "value0"),
            UserProperty::new("name1", "value1"),
        ]
    }

    #[test]
    fn test_publish_short() {
        let event = PublishEvent {
            direction: PacketDirection::Outbound,
            client_id: Some("clientid".to_string()),
            message: PublishMessage::new("topic", Qos::AtLeastOnce).with_payload("message"),
        };
        let line = formatter(false).format(&ProtocolEvent::Publish(event));
        assert_eq!(
            line,
            r#"{"timestamp":1700000000000,"messageType":"PUBLISH","direction":"OUTBOUND","topic":"topic","payload":"message","qos":1,"retained":false}"#
        );
    }

    #[test]
    fn test_publish_verbose() {
        let mut message = PublishMessage::new("topic", Qos::AtLeastOnce).with_payload("message");
        message.message_expiry_interval = Some(60);
        message.correlation_data = Some(b"corr".to_vec());
        message.content_type = Some("text/plain".to_string());
        message.subscription_identifiers = vec![1, 2];
        message.user_properties = props();
        let event = PublishEvent {
            direction: PacketDirection::Inbound,
            client_id: Some("clientid".to_string()),
            message,
        };
        let line = formatter(true).format(&ProtocolEvent::Publish(event));
        assert_eq!(
            line,
            concat!(
                r#"{"timestamp":1700000000000,"messageType":"PUBLISH","direction":"INBOUND","topic":"topic","#,
                r#""payload":"message","qos":1,"retained":false,"messageExpiryInterval":60,"#,
                r#""duplicateDelivery":false,"correlationData":"corr","contentType":"text/plain","#,
                r#""subscriptionIdentifiers":[1,2],"#,
                r#""userProperties":[{"name":"name0","value":"value0"},{"name":"name1","value":"value1"}]}"#
            )
        );
    }

    #[test]
    fn test_binary_payload_base64() {
        let event = PublishEvent {
            direction: PacketDirection::Outbound,
            client_id: None,
            message: PublishMessage::new("t", Qos::AtMostOnce).with_payload(vec![0xCA, 0xFE]),
        };
        let line = formatter(false).format(&ProtocolEvent::Publish(event));
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["payloadBase64"], "yv4=");
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn test_connect_password_base64() {
        let event = ConnectEvent {
            client_id: Some("clientid".to_string()),
            password: Some(vec![0x00, 0x01, 0x02, 0xFF, 0xFE, 0x7F]),
            ..Default::default()
        };
        let line = formatter(true).format(&ProtocolEvent::Connect(event));
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["passwordBase64"], "AAEC//5/");
        assert!(value.get("password").is_none());
    }

    #[test]
    fn test_connect_redacted_password() {
        let config = FormatterConfig {
            verbose: true,
            redact_password: true,
            ..Default::default()
        };
        let event = ConnectEvent {
            client_id: Some("clientid".to_string()),
            password: Some(vec![0xFF]),
            ..Default::default()
        };
        let line = JsonFormatter::new(&config).format(&ProtocolEvent::Connect(event));
        assert!(line.contains(r#""password":"<redacted>""#));
        assert!(!line.contains("passwordBase64"));
    }

    #[test]
    fn test_connect_verbose_key_order() {
        let event = ConnectEvent {
            client_id: Some("clientid".to_string()),
            protocol_version: ProtocolVersion::V3_1_1,
            clean_start: true,
            username: Some("user".to_string()),
            password: Some(b"pass".to_vec()),
            will: Some(WillMessage {
                message: PublishMessage::new("will", Qos::ExactlyOnce).with_payload("bye"),
                delay_interval: 5,
            }),
            ..Default::default()
        };
        let line = formatter(true).format(&ProtocolEvent::Connect(event));
        assert_eq!(
            line,
            concat!(
                r#"{"timestamp":1700000000000,"messageType":"CONNECT","direction":"INBOUND","#,
                r#""clientId":"clientid","protocolVersion":"V_3_1_1","cleanStart":true,"#,
                r#""sessionExpiryInterval":0,"keepAlive":0,"maximumPacketSize":0,"receiveMaximum":0,"#,
                r#""topicAliasMaximum":0,"requestProblemInformation":false,"#,
                r#""requestResponseInformation":false,"username":"user","password":"pass","#,
                r#""will":{"topic":"will","payload":"bye","qos":2,"retained":false,"#,
                r#""duplicateDelivery":false,"willDelay":5}}"#
            )
        );
    }

    #[test]
    fn test_connack_short() {
        let event = ConnackEvent {
            client_id: Some("clientid".to_string()),
            reason_code: ReasonCode::NotAuthorized,
            session_present: true,
            assigned_client_id: Some("hidden".to_string()),
            ..Default::default()
        };
        let line = formatter(false).format(&ProtocolEvent::Connack(event));
        assert_eq!(
            line,
            r#"{"timestamp":1700000000000,"messageType":"CONNACK","direction":"OUTBOUND","clientId":"clientid","reasonCode":"NOT_AUTHORIZED","sessionPresent":true}"#
        );
    }

    #[test]
    fn test_connack_maximum_qos_is_number() {
        let event = ConnackEvent {
            client_id: Some("clientid".to_string()),
            maximum_qos: Some(Qos::AtLeastOnce),
            auth_data: Some(vec![0x00]),
            ..Default::default()
        };
        let line = formatter(true).format(&ProtocolEvent::Connack(event));
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["maximumQoS"], 1);
        assert_eq!(value["authDataBase64"], "AA==");
        assert!(value.get("assignedClientId").is_none());
        assert!(value.get("userProperties").is_none());
    }

    #[test]
    fn test_subscribe() {
        let event = SubscribeEvent {
            client_id: Some("clientid".to_string()),
            subscriptions: vec![Subscription::new("a/#", Qos::AtLeastOnce)],
            subscription_identifier: Some(7),
            user_properties: Vec::new(),
        };
        let short = formatter(false).format(&ProtocolEvent::Subscribe(event.clone()));
        assert_eq!(
            short,
            r#"{"timestamp":1700000000000,"messageType":"SUBSCRIBE","direction":"INBOUND","clientId":"clientid","subscriptions":[{"topicFilter":"a/#","qos":1}]}"#
        );
        let verbose = formatter(true).format(&ProtocolEvent::Subscribe(event));
        assert!(verbose.contains(
            r#""subscriptions":[{"topicFilter":"a/#","qos":1,"retainAsPublished":false,"noLocal":false,"retainHandling":"SEND"}],"subscriptionIdentifier":7}"#
        ));
    }

    #[test]
    fn test_unsuback_omits_absent_keys() {
        let event = SubackEvent {
            client_id: Some("clientid".to_string()),
            reason_codes: vec![ReasonCode::NotAuthorized],
            ..Default::default()
        };
        let line = formatter(true).format(&ProtocolEvent::Unsuback(event));
        assert_eq!(
            line,
            r#"{"timestamp":1700000000000,"messageType":"UNSUBACK","direction":"OUTBOUND","clientId":"clientid","reasonCodes":["NOT_AUTHORIZED"]}"#
        );
    }

    #[test]
    fn test_unsubscribe() {
        let event = UnsubscribeEvent {
            client_id: Some("clientid".to_string()),
            topic_filters: vec!["a".to_string(), "b".to_string()],
            user_properties: props(),
        };
        let line = formatter(true).format(&ProtocolEvent::Unsubscribe(event));
        assert!(line.contains(r#""topicFilters":["a","b"],"userProperties":[{"name":"name0""#));
    }

    #[test]
    fn test_ping() {
        let line = formatter(true).format(&ProtocolEvent::Pingreq(PingEvent::new("clientid")));
        assert_eq!(
            line,
            r#"{"timestamp":1700000000000,"messageType":"PINGREQ","direction":"INBOUND","clientId":"clientid"}"#
        );
    }

    #[test]
    fn test_ack_and_disconnect() {
        let ack = AckEvent {
            direction: PacketDirection::Outbound,
            client_id: Some("clientid".to_string()),
            reason_code: ReasonCode::Success,
            reason_string: Some("ok".to_string()),
            user_properties: Vec::new(),
        };
        let line = formatter(true).format(&ProtocolEvent::Pubrec(ack));
        assert_eq!(
            line,
            r#"{"timestamp":1700000000000,"messageType":"PUBREC","direction":"OUTBOUND","clientId":"clientid","reasonCode":"SUCCESS","reasonString":"ok"}"#
        );

        let disconnect = DisconnectEvent {
            direction: PacketDirection::Inbound,
            client_id: Some("clientid".to_string()),
            reason_code: ReasonCode::NormalDisconnection,
            session_expiry_interval: Some(30),
            ..Default::default()
        };
        let line = formatter(true).format(&ProtocolEvent::Disconnect(disconnect));
        assert!(line.ends_with(r#""reasonCode":"NORMAL_DISCONNECTION","sessionExpiryInterval":30}"#));
    }

    #[test]
    fn test_disconnect_lifecycle() {
        let mut event = DisconnectLifecycleEvent::new(DisconnectCause::AuthenticationFailed, "c1");
        event.reason_code = Some(ReasonCode::BadAuthenticationMethod);
        let line = formatter(false).format(&ProtocolEvent::DisconnectLifecycle(event));
        assert_eq!(
            line,
            r#"{"timestamp":1700000000000,"messageType":"DISCONNECT","direction":"EVENT","message":"Sent DISCONNECT to client 'c1' because authentication failed.","reasonCode":"BAD_AUTHENTICATION_METHOD"}"#
        );
    }

    #[test]
    fn test_string_escaping() {
        let event = AckEvent {
            direction: PacketDirection::Inbound,
            client_id: Some("a\"b\\c\nd\re\tf\u{8}g\u{c}h\u{1}i".to_string()),
            ..Default::default()
        };
        let line = formatter(false).format(&ProtocolEvent::Puback(event));
        assert!(line.contains(r#""clientId":"a\"b\\c\nd\re\tf\bg\fh\u0001i""#));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_default_clock_is_recent() {
        let line = JsonFormatter::new(&FormatterConfig::default())
            .format(&ProtocolEvent::Pingresp(PingEvent::new("c")));
        let value: Value = serde_json::from_str(&line).unwrap();
        assert!(value["timestamp"].as_i64().unwrap() > 1_600_000_000_000);
    }
}
