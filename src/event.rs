//! Protocol event model.
//!
//! Immutable snapshots of the MQTT packets and lifecycle events that get
//! logged. The host hook layer builds one of these right before a format call
//! and drops it right after; formatters only ever see these types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a packet travelled, from the broker's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Received from the client
    #[default]
    Inbound,
    /// Sent to the client
    Outbound,
    /// Not a packet; a connection lifecycle event
    Event,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "INBOUND",
            Self::Outbound => "OUTBOUND",
            Self::Event => "EVENT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an actual packet. Lifecycle events are not packets and have
/// no `PacketDirection`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketDirection {
    #[default]
    Inbound,
    Outbound,
}

impl From<PacketDirection> for Direction {
    fn from(direction: PacketDirection) -> Self {
        match direction {
            PacketDirection::Inbound => Direction::Inbound,
            PacketDirection::Outbound => Direction::Outbound,
        }
    }
}

/// MQTT control packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Connect,
    Connack,
    Publish,
    Subscribe,
    Suback,
    Unsubscribe,
    Unsuback,
    Pingreq,
    Pingresp,
    Puback,
    Pubrec,
    Pubrel,
    Pubcomp,
    Disconnect,
}

impl MessageType {
    /// Protocol name, as used for the JSON `messageType` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connack => "CONNACK",
            Self::Publish => "PUBLISH",
            Self::Subscribe => "SUBSCRIBE",
            Self::Suback => "SUBACK",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Unsuback => "UNSUBACK",
            Self::Pingreq => "PINGREQ",
            Self::Pingresp => "PINGRESP",
            Self::Puback => "PUBACK",
            Self::Pubrec => "PUBREC",
            Self::Pubrel => "PUBREL",
            Self::Pubcomp => "PUBCOMP",
            Self::Disconnect => "DISCONNECT",
        }
    }

    /// Human-readable name used in plain text headlines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pingreq => "PING REQUEST",
            Self::Pingresp => "PING RESPONSE",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol version announced in CONNECT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[serde(rename = "V_3_1")]
    V3_1,
    #[serde(rename = "V_3_1_1")]
    V3_1_1,
    #[default]
    #[serde(rename = "V_5")]
    V5,
}

impl ProtocolVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V3_1 => "V_3_1",
            Self::V3_1_1 => "V_3_1_1",
            Self::V5 => "V_5",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality of service level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Qos {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl Qos {
    pub fn number(&self) -> u8 {
        match self {
            Self::AtMostOnce => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AtMostOnce => "AT_MOST_ONCE",
            Self::AtLeastOnce => "AT_LEAST_ONCE",
            Self::ExactlyOnce => "EXACTLY_ONCE",
        }
    }
}

/// Retain handling option of a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetainHandling {
    #[default]
    Send,
    SendIfNewSubscription,
    DoNotSend,
}

impl RetainHandling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "SEND",
            Self::SendIfNewSubscription => "SEND_IF_NEW_SUBSCRIPTION",
            Self::DoNotSend => "DO_NOT_SEND",
        }
    }
}

/// Payload format indicator of a PUBLISH or WILL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadFormatIndicator {
    #[serde(rename = "UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "UTF_8")]
    Utf8,
}

impl PayloadFormatIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Utf8 => "UTF_8",
        }
    }
}

/// MQTT 5 reason codes, rendered by name.
///
/// One enumeration covers every packet kind; which codes a given packet may
/// carry is the protocol decoder's business, not the formatter's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    #[default]
    Success,
    NormalDisconnection,
    #[serde(rename = "GRANTED_QOS_0")]
    GrantedQos0,
    #[serde(rename = "GRANTED_QOS_1")]
    GrantedQos1,
    #[serde(rename = "GRANTED_QOS_2")]
    GrantedQos2,
    DisconnectWithWillMessage,
    NoMatchingSubscribers,
    NoSubscriptionsExisted,
    ContinueAuthentication,
    Reauthenticate,
    UnspecifiedError,
    MalformedPacket,
    ProtocolError,
    ImplementationSpecificError,
    UnsupportedProtocolVersion,
    ClientIdentifierNotValid,
    BadUserNameOrPassword,
    NotAuthorized,
    ServerUnavailable,
    ServerBusy,
    Banned,
    ServerShuttingDown,
    BadAuthenticationMethod,
    KeepAliveTimeout,
    SessionTakenOver,
    TopicFilterInvalid,
    TopicNameInvalid,
    PacketIdentifierInUse,
    PacketIdentifierNotFound,
    ReceiveMaximumExceeded,
    TopicAliasInvalid,
    PacketTooLarge,
    MessageRateTooHigh,
    QuotaExceeded,
    AdministrativeAction,
    PayloadFormatInvalid,
    RetainNotSupported,
    QosNotSupported,
    UseAnotherServer,
    ServerMoved,
    SharedSubscriptionsNotSupported,
    ConnectionRateExceeded,
    MaximumConnectTime,
    SubscriptionIdentifiersNotSupported,
    WildcardSubscriptionsNotSupported,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::NormalDisconnection => "NORMAL_DISCONNECTION",
            Self::GrantedQos0 => "GRANTED_QOS_0",
            Self::GrantedQos1 => "GRANTED_QOS_1",
            Self::GrantedQos2 => "GRANTED_QOS_2",
            Self::DisconnectWithWillMessage => "DISCONNECT_WITH_WILL_MESSAGE",
            Self::NoMatchingSubscribers => "NO_MATCHING_SUBSCRIBERS",
            Self::NoSubscriptionsExisted => "NO_SUBSCRIPTIONS_EXISTED",
            Self::ContinueAuthentication => "CONTINUE_AUTHENTICATION",
            Self::Reauthenticate => "REAUTHENTICATE",
            Self::UnspecifiedError => "UNSPECIFIED_ERROR",
            Self::MalformedPacket => "MALFORMED_PACKET",
            Self::ProtocolError => "PROTOCOL_ERROR",
            Self::ImplementationSpecificError => "IMPLEMENTATION_SPECIFIC_ERROR",
            Self::UnsupportedProtocolVersion => "UNSUPPORTED_PROTOCOL_VERSION",
            Self::ClientIdentifierNotValid => "CLIENT_IDENTIFIER_NOT_VALID",
            Self::BadUserNameOrPassword => "BAD_USER_NAME_OR_PASSWORD",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::ServerUnavailable => "SERVER_UNAVAILABLE",
            Self::ServerBusy => "SERVER_BUSY",
            Self::Banned => "BANNED",
            Self::ServerShuttingDown => "SERVER_SHUTTING_DOWN",
            Self::BadAuthenticationMethod => "BAD_AUTHENTICATION_METHOD",
            Self::KeepAliveTimeout => "KEEP_ALIVE_TIMEOUT",
            Self::SessionTakenOver => "SESSION_TAKEN_OVER",
            Self::TopicFilterInvalid => "TOPIC_FILTER_INVALID",
            Self::TopicNameInvalid => "TOPIC_NAME_INVALID",
            Self::PacketIdentifierInUse => "PACKET_IDENTIFIER_IN_USE",
            Self::PacketIdentifierNotFound => "PACKET_IDENTIFIER_NOT_FOUND",
            Self::ReceiveMaximumExceeded => "RECEIVE_MAXIMUM_EXCEEDED",
            Self::TopicAliasInvalid => "TOPIC_ALIAS_INVALID",
            Self::PacketTooLarge => "PACKET_TOO_LARGE",
            Self::MessageRateTooHigh => "MESSAGE_RATE_TOO_HIGH",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::AdministrativeAction => "ADMINISTRATIVE_ACTION",
            Self::PayloadFormatInvalid => "PAYLOAD_FORMAT_INVALID",
            Self::RetainNotSupported => "RETAIN_NOT_SUPPORTED",
            Self::QosNotSupported => "QOS_NOT_SUPPORTED",
            Self::UseAnotherServer => "USE_ANOTHER_SERVER",
            Self::ServerMoved => "SERVER_MOVED",
            Self::SharedSubscriptionsNotSupported => "SHARED_SUBSCRIPTIONS_NOT_SUPPORTED",
            Self::ConnectionRateExceeded => "CONNECTION_RATE_EXCEEDED",
            Self::MaximumConnectTime => "MAXIMUM_CONNECT_TIME",
            Self::SubscriptionIdentifiersNotSupported => "SUBSCRIPTION_IDENTIFIERS_NOT_SUPPORTED",
            Self::WildcardSubscriptionsNotSupported => "WILDCARD_SUBSCRIPTIONS_NOT_SUPPORTED",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user property name/value pair. Lists of these keep source order and
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProperty {
    pub name: String,
    pub value: String,
}

impl UserProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Application message fields shared by PUBLISH and the CONNECT will.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishMessage {
    pub topic: String,
    pub qos: Qos,
    pub retain: bool,
    pub payload: Option<Vec<u8>>,
    pub message_expiry_interval: Option<u64>,
    pub duplicate_delivery: bool,
    pub correlation_data: Option<Vec<u8>>,
    pub response_topic: Option<String>,
    pub content_type: Option<String>,
    pub payload_format_indicator: Option<PayloadFormatIndicator>,
    pub subscription_identifiers: Vec<u32>,
    pub user_properties: Vec<UserProperty>,
}

impl PublishMessage {
    pub fn new(topic: impl Into<String>, qos: Qos) -> Self {
        Self {
            topic: topic.into(),
            qos,
            ..Default::default()
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// Will message attached to CONNECT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WillMessage {
    #[serde(flatten)]
    pub message: PublishMessage,
    /// Will delay interval in seconds
    pub delay_interval: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectEvent {
    pub client_id: Option<String>,
    pub protocol_version: ProtocolVersion,
    pub clean_start: bool,
    pub session_expiry_interval: u64,
    pub keep_alive: u32,
    pub maximum_packet_size: u32,
    pub receive_maximum: u32,
    pub topic_alias_maximum: u32,
    pub request_problem_information: bool,
    pub request_response_information: bool,
    pub username: Option<String>,
    pub password: Option<Vec<u8>>,
    pub auth_method: Option<String>,
    pub auth_data: Option<Vec<u8>>,
    pub user_properties: Vec<UserProperty>,
    pub will: Option<WillMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnackEvent {
    pub client_id: Option<String>,
    pub reason_code: ReasonCode,
    pub session_present: bool,
    pub session_expiry_interval: Option<u64>,
    pub assigned_client_id: Option<String>,
    pub maximum_qos: Option<Qos>,
    pub maximum_packet_size: u32,
    pub receive_maximum: u32,
    pub topic_alias_maximum: u32,
    pub reason_string: Option<String>,
    pub response_information: Option<String>,
    pub server_keep_alive: Option<u32>,
    pub server_reference: Option<String>,
    pub shared_subscriptions_available: bool,
    pub wildcard_subscriptions_available: bool,
    pub retain_available: bool,
    pub subscription_identifiers_available: bool,
    pub auth_method: Option<String>,
    pub auth_data: Option<Vec<u8>>,
    pub user_properties: Vec<UserProperty>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishEvent {
    pub direction: PacketDirection,
    pub client_id: Option<String>,
    #[serde(flatten)]
    pub message: PublishMessage,
}

/// One entry of a SUBSCRIBE packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub topic_filter: String,
    pub qos: Qos,
    pub retain_as_published: bool,
    pub no_local: bool,
    pub retain_handling: RetainHandling,
}

impl Subscription {
    pub fn new(topic_filter: impl Into<String>, qos: Qos) -> Self {
        Self {
            topic_filter: topic_filter.into(),
            qos,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscribeEvent {
    pub client_id: Option<String>,
    pub subscriptions: Vec<Subscription>,
    pub subscription_identifier: Option<u32>,
    pub user_properties: Vec<UserProperty>,
}

/// SUBACK and UNSUBACK share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubackEvent {
    pub client_id: Option<String>,
    pub reason_codes: Vec<ReasonCode>,
    pub reason_string: Option<String>,
    pub user_properties: Vec<UserProperty>,
}

pub type UnsubackEvent = SubackEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsubscribeEvent {
    pub client_id: Option<String>,
    pub topic_filters: Vec<String>,
    pub user_properties: Vec<UserProperty>,
}

/// PINGREQ / PINGRESP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingEvent {
    pub client_id: Option<String>,
}

impl PingEvent {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
        }
    }
}

/// PUBACK, PUBREC, PUBREL and PUBCOMP share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AckEvent {
    pub direction: PacketDirection,
    pub client_id: Option<String>,
    pub reason_code: ReasonCode,
    pub reason_string: Option<String>,
    pub user_properties: Vec<UserProperty>,
}

/// DISCONNECT packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisconnectEvent {
    pub direction: PacketDirection,
    pub client_id: Option<String>,
    pub reason_code: ReasonCode,
    pub reason_string: Option<String>,
    pub server_reference: Option<String>,
    pub session_expiry_interval: Option<u64>,
    pub user_properties: Vec<UserProperty>,
}

/// Why a connection ended, for lifecycle disconnect events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectCause {
    #[default]
    ClientInitiated,
    ServerInitiated,
    AuthenticationFailed,
}

/// Disconnect reported by the broker's lifecycle callbacks rather than by a
/// packet interceptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisconnectLifecycleEvent {
    pub cause: DisconnectCause,
    pub client_id: Option<String>,
    pub reason_code: Option<ReasonCode>,
    pub reason_string: Option<String>,
    pub user_properties: Vec<UserProperty>,
}

impl DisconnectLifecycleEvent {
    pub fn new(cause: DisconnectCause, client_id: impl Into<String>) -> Self {
        Self {
            cause,
            client_id: Some(client_id.into()),
            ..Default::default()
        }
    }

    /// Sentence describing the event, e.g.
    /// `Received DISCONNECT from client 'abc'`.
    pub fn headline(&self) -> String {
        let client_id = self.client_id.as_deref().unwrap_or("null");
        match self.cause {
            DisconnectCause::ClientInitiated => {
                format!("Received DISCONNECT from client '{}'", client_id)
            }
            DisconnectCause::ServerInitiated => {
                format!("Sent DISCONNECT to client '{}'", client_id)
            }
            DisconnectCause::AuthenticationFailed => format!(
                "Sent DISCONNECT to client '{}' because authentication failed.",
                client_id
            ),
        }
    }
}

/// Every loggable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    Connect(ConnectEvent),
    Connack(ConnackEvent),
    Publish(PublishEvent),
    Subscribe(SubscribeEvent),
    Suback(SubackEvent),
    Unsubscribe(UnsubscribeEvent),
    Unsuback(UnsubackEvent),
    Pingreq(PingEvent),
    Pingresp(PingEvent),
    Puback(AckEvent),
    Pubrec(AckEvent),
    Pubrel(AckEvent),
    Pubcomp(AckEvent),
    Disconnect(DisconnectEvent),
    DisconnectLifecycle(DisconnectLifecycleEvent),
}

impl ProtocolEvent {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Connect(_) => MessageType::Connect,
            Self::Connack(_) => MessageType::Connack,
            Self::Publish(_) => MessageType::Publish,
            Self::Subscribe(_) => MessageType::Subscribe,
            Self::Suback(_) => MessageType::Suback,
            Self::Unsubscribe(_) => MessageType::Unsubscribe,
            Self::Unsuback(_) => MessageType::Unsuback,
            Self::Pingreq(_) => MessageType::Pingreq,
            Self::Pingresp(_) => MessageType::Pingresp,
            Self::Puback(_) => MessageType::Puback,
            Self::Pubrec(_) => MessageType::Pubrec,
            Self::Pubrel(_) => MessageType::Pubrel,
            Self::Pubcomp(_) => MessageType::Pubcomp,
            Self::Disconnect(_) | Self::DisconnectLifecycle(_) => MessageType::Disconnect,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Connect(_) | Self::Subscribe(_) | Self::Unsubscribe(_) | Self::Pingreq(_) => {
                Direction::Inbound
            }
            Self::Connack(_) | Self::Suback(_) | Self::Unsuback(_) | Self::Pingresp(_) => {
                Direction::Outbound
            }
            Self::Publish(e) => e.direction.into(),
            Self::Puback(e) | Self::Pubrec(e) | Self::Pubrel(e) | Self::Pubcomp(e) => {
                e.direction.into()
            }
            Self::Disconnect(e) => e.direction.into(),
            Self::DisconnectLifecycle(_) => Direction::Event,
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::Connect(e) => e.client_id.as_deref(),
            Self::Connack(e) => e.client_id.as_deref(),
            Self::Publish(e) => e.client_id.as_deref(),
            Self::Subscribe(e) => e.client_id.as_deref(),
            Self::Suback(e) | Self::Unsuback(e) => e.client_id.as_deref(),
            Self::Unsubscribe(e) => e.client_id.as_deref(),
            Self::Pingreq(e) | Self::Pingresp(e) => e.client_id.as_deref(),
            Self::Puback(e) | Self::Pubrec(e) | Self::Pubrel(e) | Self::Pubcomp(e) => {
                e.client_id.as_deref()
            }
            Self::Disconnect(e) => e.client_id.as_deref(),
            Self::DisconnectLifecycle(e) => e.client_id.as_deref(),
        }
    }

    /// The single reason code of the event, if it carries one. SUBACK and
    /// UNSUBACK carry a list instead and report `None` here.
    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            Self::Connack(e) => Some(e.reason_code),
            Self::Puback(e) | Self::Pubrec(e) | Self::Pubrel(e) | Self::Pubcomp(e) => {
                Some(e.reason_code)
            }
            Self::Disconnect(e) => Some(e.reason_code),
            Self::DisconnectLifecycle(e) => e.reason_code,
            _ => None,
        }
    }

    pub fn reason_string(&self) -> Option<&str> {
        match self {
            Self::Connack(e) => e.reason_string.as_deref(),
            Self::Suback(e) | Self::Unsuback(e) => e.reason_string.as_deref(),
            Self::Puback(e) | Self::Pubrec(e) | Self::Pubrel(e) | Self::Pubcomp(e) => {
                e.reason_string.as_deref()
            }
            Self::Disconnect(e) => e.reason_string.as_deref(),
            Self::DisconnectLifecycle(e) => e.reason_string.as_deref(),
            _ => None,
        }
    }

    pub fn user_properties(&self) -> &[UserProperty] {
        match self {
            Self::Connect(e) => &e.user_properties,
            Self::Connack(e) => &e.user_properties,
            Self::Publish(e) => &e.message.user_properties,
            Self::Subscribe(e) => &e.user_properties,
            Self::Suback(e) | Self::Unsuback(e) => &e.user_properties,
            Self::Unsubscribe(e) => &e.user_properties,
            Self::Pingreq(_) | Self::Pingresp(_) => &[],
            Self::Puback(e) | Self::Pubrec(e) | Self::Pubrel(e) | Self::Pubcomp(e) => {
                &e.user_properties
            }
            Self::Disconnect(e) => &e.user_properties,
            Self::DisconnectLifecycle(e) => &e.user_properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_names() {
        assert_eq!(Direction::Inbound.as_str(), "INBOUND");
        assert_eq!(Direction::Outbound.to_string(), "OUTBOUND");
        assert_eq!(Direction::Event.as_str(), "EVENT");
    }

    #[test]
    fn test_fixed_directions() {
        let connect = ProtocolEvent::Connect(ConnectEvent::default());
        let suback = ProtocolEvent::Suback(SubackEvent::default());
        let lifecycle = ProtocolEvent::DisconnectLifecycle(DisconnectLifecycleEvent::default());

        assert_eq!(connect.direction(), Direction::Inbound);
        assert_eq!(suback.direction(), Direction::Outbound);
        assert_eq!(lifecycle.direction(), Direction::Event);
        assert_eq!(lifecycle.message_type(), MessageType::Disconnect);
    }

    #[test]
    fn test_carried_direction() {
        let puback = ProtocolEvent::Puback(AckEvent {
            direction: PacketDirection::Outbound,
            ..Default::default()
        });
        assert_eq!(puback.direction(), Direction::Outbound);
    }

    #[test]
    fn test_accessors_are_total() {
        let ping = ProtocolEvent::Pingreq(PingEvent::default());
        assert_eq!(ping.client_id(), None);
        assert_eq!(ping.reason_code(), None);
        assert_eq!(ping.reason_string(), None);
        assert!(ping.user_properties().is_empty());
    }

    #[test]
    fn test_reason_code_serde_names_match_display() {
        for code in [
            ReasonCode::GrantedQos0,
            ReasonCode::GrantedQos2,
            ReasonCode::NotAuthorized,
            ReasonCode::BadUserNameOrPassword,
            ReasonCode::SubscriptionIdentifiersNotSupported,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_headline_per_cause() {
        let event = DisconnectLifecycleEvent::new(DisconnectCause::AuthenticationFailed, "c1");
        assert_eq!(
            event.headline(),
            "Sent DISCONNECT to client 'c1' because authentication failed."
        );

        let event = DisconnectLifecycleEvent::new(DisconnectCause::ClientInitiated, "c1");
        assert_eq!(event.headline(), "Received DISCONNECT from client 'c1'");
    }

    #[test]
    fn test_event_from_json() {
        let json = r#"{"type":"publish","direction":"outbound","client_id":"c1","topic":"a/b","qos":"AT_LEAST_ONCE","payload":[104,105]}"#;
        let event: ProtocolEvent = serde_json::from_str(json).unwrap();
        match event {
            ProtocolEvent::Publish(publish) => {
                assert_eq!(publish.direction, PacketDirection::Outbound);
                assert_eq!(publish.message.topic, "a/b");
                assert_eq!(publish.message.qos, Qos::AtLeastOnce);
                assert_eq!(publish.message.payload.as_deref(), Some(&b"hi"[..]));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_packet_direction_rejects_event() {
        let json = r#"{"type":"puback","direction":"event","client_id":"c1"}"#;
        assert!(serde_json::from_str::<ProtocolEvent>(json).is_err());

        let json = r#"{"type":"disconnect","direction":"outbound","client_id":"c1"}"#;
        let event: ProtocolEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.direction(), Direction::Outbound);
    }

    #[test]
    fn test_qos_names() {
        assert_eq!(Qos::AtLeastOnce.number(), 1);
        assert_eq!(Qos::AtLeastOnce.name(), "AT_LEAST_ONCE");
    }
}
