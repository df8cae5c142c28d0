//! Control-channel operations.
//!
//! Operations are the typed messages the broker and a worker exchange
//! over their private channel. Every request kind that mutates state has
//! exactly one response kind, and responses carry no further side
//! effects.
//!
//! # Wire Shape
//!
//! An operation is always a JSON object with a `type` tag and an
//! optional `message` payload:
//!
//! ```json
//! { "type": "APP_GREET", "message": ["BillingApp", "TodoApp"] }
//! { "type": "APP_CREATE" }
//! ```
//!
//! # Operation Table
//!
//! | Request | Payload | Response | Response payload |
//! |---------|---------|----------|------------------|
//! | `APP_CREATE` | (none) | `APP_CREATE_RESPONSE` | lifecycle outcome |
//! | `APP_START` | (none) | `APP_START_RESPONSE` | lifecycle outcome |
//! | `APP_STOP` | (none) | `APP_STOP_RESPONSE` | lifecycle outcome |
//! | `REMOTE_CALL_PROCEDURE` | [`Call`] | `REMOTE_CALL_PROCEDURE_RESPONSE` | [`CallOutcome`] |
//! | `APP_GREET` | peer names | `APP_GREET_RESPONSE` | liveness booleans |
//! | `APP_PING` | (none) | `APP_PING_RESPONSE` | [`AppConfig`] snapshot |
//!
//! # Lifecycle Driven by Operations
//!
//! ```text
//! Uninitialized ──APP_CREATE──► Created ──APP_START──► Started
//!                                  ▲                      │
//!                                  └───── (APP_STOP) ─────┘
//!                                              ▼
//!                                           Stopped
//! ```
//!
//! Raw inbound messages are decoded with [`Operation::decode`], which
//! reports malformed input precisely enough for the dispatcher to send
//! its diagnostic back to the broker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::call::{Call, CallOutcome, Failure};
use crate::config::AppConfig;
use crate::error::ProtoError;

/// Outcome of one lifecycle transition (create/start/stop).
///
/// Serializes as `{"Ok": null}` or `{"Err": {"code", "message"}}`.
pub type LifecycleOutcome = Result<(), Failure>;

/// One control-channel message, request or response.
///
/// Serializes to the `{"type", "message"}` wire shape described in the
/// module docs. Payload-less kinds omit `message` entirely.
///
/// # Example
///
/// ```
/// use hive_proto::Operation;
/// use serde_json::json;
///
/// let op = Operation::call("echo", json!(["hi"]));
/// let wire = serde_json::to_value(&op).unwrap();
/// assert_eq!(wire["type"], "REMOTE_CALL_PROCEDURE");
/// assert_eq!(wire["message"]["method"], "echo");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Construct the application (factory, responser, streamer).
    AppCreate,
    /// Outcome of `APP_CREATE`.
    AppCreateResponse(LifecycleOutcome),
    /// Start the application and (unless disabled) the listener.
    AppStart,
    /// Outcome of `APP_START`.
    AppStartResponse(LifecycleOutcome),
    /// Close the listener, then stop the application.
    AppStop,
    /// Outcome of `APP_STOP`.
    AppStopResponse(LifecycleOutcome),
    /// Invoke one procedure on the hosted application.
    RemoteCallProcedure(Call),
    /// Outcome of `REMOTE_CALL_PROCEDURE`.
    RemoteCallProcedureResponse(CallOutcome),
    /// Probe the liveness of the named peer applications.
    AppGreet(Vec<String>),
    /// One liveness boolean per probed peer, in request order.
    AppGreetResponse(Vec<bool>),
    /// Ask for the worker's configuration snapshot.
    AppPing,
    /// The configuration snapshot, unchanged since process start.
    AppPingResponse(AppConfig),
}

impl Operation {
    /// Creates a `REMOTE_CALL_PROCEDURE` request.
    ///
    /// # Arguments
    ///
    /// * `method` - Identifier of the procedure to invoke
    /// * `args` - Arguments passed through to the handler unchanged
    #[must_use]
    pub fn call(method: impl Into<String>, args: Value) -> Self {
        Self::RemoteCallProcedure(Call::new(method, args))
    }

    /// Creates an `APP_GREET` request for the given peer names.
    #[must_use]
    pub fn greet<I, S>(peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AppGreet(peers.into_iter().map(Into::into).collect())
    }

    /// Returns this operation's kind tag.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::AppCreate => OperationKind::AppCreate,
            Self::AppCreateResponse(_) => OperationKind::AppCreateResponse,
            Self::AppStart => OperationKind::AppStart,
            Self::AppStartResponse(_) => OperationKind::AppStartResponse,
            Self::AppStop => OperationKind::AppStop,
            Self::AppStopResponse(_) => OperationKind::AppStopResponse,
            Self::RemoteCallProcedure(_) => OperationKind::RemoteCallProcedure,
            Self::RemoteCallProcedureResponse(_) => OperationKind::RemoteCallProcedureResponse,
            Self::AppGreet(_) => OperationKind::AppGreet,
            Self::AppGreetResponse(_) => OperationKind::AppGreetResponse,
            Self::AppPing => OperationKind::AppPing,
            Self::AppPingResponse(_) => OperationKind::AppPingResponse,
        }
    }

    /// Returns `true` if this is a `*_RESPONSE` operation.
    #[must_use]
    pub fn is_response(&self) -> bool {
        self.kind().is_response()
    }

    /// Decodes an operation from a raw control-channel value.
    ///
    /// The staged checks mirror what a worker can actually tell a broker
    /// about bad input:
    ///
    /// 1. not a JSON object → [`ProtoError::NotAnObject`]
    /// 2. no string `type` field → [`ProtoError::MissingType`]
    /// 3. unrecognized `type` → [`ProtoError::UnknownKind`]
    /// 4. payload does not fit the kind → [`ProtoError::BadPayload`]
    ///
    /// # Errors
    ///
    /// Returns the first failing check; the dispatcher turns it into a
    /// diagnostic string for the broker.
    ///
    /// # Example
    ///
    /// ```
    /// use hive_proto::{Operation, ProtoError};
    /// use serde_json::json;
    ///
    /// let op = Operation::decode(&json!({"type": "APP_PING"})).unwrap();
    /// assert_eq!(op, Operation::AppPing);
    ///
    /// let err = Operation::decode(&json!({"message": []})).unwrap_err();
    /// assert!(matches!(err, ProtoError::MissingType));
    /// ```
    pub fn decode(raw: &Value) -> Result<Self, ProtoError> {
        let obj = raw.as_object().ok_or(ProtoError::NotAnObject)?;
        let kind = match obj.get("type").and_then(Value::as_str) {
            Some(kind) => kind,
            None => return Err(ProtoError::MissingType),
        };
        if OperationKind::parse(kind).is_none() {
            return Err(ProtoError::UnknownKind(kind.to_string()));
        }
        serde_json::from_value(raw.clone()).map_err(|err| ProtoError::BadPayload {
            kind: kind.to_string(),
            reason: err.to_string(),
        })
    }

    /// Encodes this operation to its raw control-channel value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::Codec`] if serialization fails.
    pub fn encode(&self) -> Result<Value, ProtoError> {
        serde_json::to_value(self).map_err(ProtoError::from)
    }
}

/// Kind tag of an [`Operation`], without its payload.
///
/// Used for logging, decode diagnostics and request/response pairing.
/// [`std::fmt::Display`] renders the wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// `APP_CREATE`
    AppCreate,
    /// `APP_CREATE_RESPONSE`
    AppCreateResponse,
    /// `APP_START`
    AppStart,
    /// `APP_START_RESPONSE`
    AppStartResponse,
    /// `APP_STOP`
    AppStop,
    /// `APP_STOP_RESPONSE`
    AppStopResponse,
    /// `REMOTE_CALL_PROCEDURE`
    RemoteCallProcedure,
    /// `REMOTE_CALL_PROCEDURE_RESPONSE`
    RemoteCallProcedureResponse,
    /// `APP_GREET`
    AppGreet,
    /// `APP_GREET_RESPONSE`
    AppGreetResponse,
    /// `APP_PING`
    AppPing,
    /// `APP_PING_RESPONSE`
    AppPingResponse,
}

impl OperationKind {
    /// All kinds, in request/response pairs.
    pub const ALL: [Self; 12] = [
        Self::AppCreate,
        Self::AppCreateResponse,
        Self::AppStart,
        Self::AppStartResponse,
        Self::AppStop,
        Self::AppStopResponse,
        Self::RemoteCallProcedure,
        Self::RemoteCallProcedureResponse,
        Self::AppGreet,
        Self::AppGreetResponse,
        Self::AppPing,
        Self::AppPingResponse,
    ];

    /// Returns the wire name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppCreate => "APP_CREATE",
            Self::AppCreateResponse => "APP_CREATE_RESPONSE",
            Self::AppStart => "APP_START",
            Self::AppStartResponse => "APP_START_RESPONSE",
            Self::AppStop => "APP_STOP",
            Self::AppStopResponse => "APP_STOP_RESPONSE",
            Self::RemoteCallProcedure => "REMOTE_CALL_PROCEDURE",
            Self::RemoteCallProcedureResponse => "REMOTE_CALL_PROCEDURE_RESPONSE",
            Self::AppGreet => "APP_GREET",
            Self::AppGreetResponse => "APP_GREET_RESPONSE",
            Self::AppPing => "APP_PING",
            Self::AppPingResponse => "APP_PING_RESPONSE",
        }
    }

    /// Parses a wire name into a kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Returns `true` for `*_RESPONSE` kinds.
    #[must_use]
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            Self::AppCreateResponse
                | Self::AppStartResponse
                | Self::AppStopResponse
                | Self::RemoteCallProcedureResponse
                | Self::AppGreetResponse
                | Self::AppPingResponse
        )
    }

    /// Returns the response kind paired with this request kind, or
    /// `None` if this kind is itself a response.
    #[must_use]
    pub fn response_kind(&self) -> Option<Self> {
        match self {
            Self::AppCreate => Some(Self::AppCreateResponse),
            Self::AppStart => Some(Self::AppStartResponse),
            Self::AppStop => Some(Self::AppStopResponse),
            Self::RemoteCallProcedure => Some(Self::RemoteCallProcedureResponse),
            Self::AppGreet => Some(Self::AppGreetResponse),
            Self::AppPing => Some(Self::AppPingResponse),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_less_request_omits_message() {
        let wire = serde_json::to_value(&Operation::AppCreate).unwrap();
        assert_eq!(wire, json!({"type": "APP_CREATE"}));
    }

    #[test]
    fn remote_call_wire_shape() {
        let op = Operation::call("echo", json!([1, 2]));
        let wire = serde_json::to_value(&op).unwrap();
        assert_eq!(wire["type"], "REMOTE_CALL_PROCEDURE");
        assert_eq!(wire["message"]["method"], "echo");
        assert_eq!(wire["message"]["args"], json!([1, 2]));
    }

    #[test]
    fn greet_response_preserves_order() {
        let op = Operation::AppGreetResponse(vec![true, false, true]);
        let wire = serde_json::to_value(&op).unwrap();
        assert_eq!(wire["message"], json!([true, false, true]));

        let back = Operation::decode(&wire).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn ping_response_carries_config_snapshot() {
        let config = crate::AppConfig::new("10.0.0.1", 8080);
        let op = Operation::AppPingResponse(config.clone());
        let wire = serde_json::to_value(&op).unwrap();
        assert_eq!(wire["message"]["host"], "10.0.0.1");

        match Operation::decode(&wire).unwrap() {
            Operation::AppPingResponse(snapshot) => assert_eq!(snapshot, config),
            other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn lifecycle_outcome_wire_shape() {
        let ok = Operation::AppStartResponse(Ok(()));
        let wire = serde_json::to_value(&ok).unwrap();
        assert_eq!(wire["message"], json!({"Ok": null}));

        let failed = Operation::AppStartResponse(Err(Failure::new(
            "GATEWAY_BIND_FAILED",
            "address in use",
        )));
        let wire = serde_json::to_value(&failed).unwrap();
        assert_eq!(wire["message"]["Err"]["code"], "GATEWAY_BIND_FAILED");
    }

    #[test]
    fn decode_rejects_non_object() {
        assert!(matches!(
            Operation::decode(&json!(42)),
            Err(ProtoError::NotAnObject)
        ));
        assert!(matches!(
            Operation::decode(&json!(["APP_CREATE"])),
            Err(ProtoError::NotAnObject)
        ));
    }

    #[test]
    fn decode_rejects_missing_type() {
        assert!(matches!(
            Operation::decode(&json!({"message": {}})),
            Err(ProtoError::MissingType)
        ));
        // A non-string type is as unusable as an absent one
        assert!(matches!(
            Operation::decode(&json!({"type": 7})),
            Err(ProtoError::MissingType)
        ));
    }

    #[test]
    fn decode_rejects_unknown_kind() {
        match Operation::decode(&json!({"type": "APP_DESTROY"})) {
            Err(ProtoError::UnknownKind(kind)) => assert_eq!(kind, "APP_DESTROY"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_bad_payload() {
        match Operation::decode(&json!({"type": "APP_GREET", "message": "not-a-list"})) {
            Err(ProtoError::BadPayload { kind, .. }) => assert_eq!(kind, "APP_GREET"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn decode_accepts_null_message_for_payload_less_kind() {
        let op = Operation::decode(&json!({"type": "APP_PING", "message": null})).unwrap();
        assert_eq!(op, Operation::AppPing);
    }

    #[test]
    fn encode_decode_round_trip() {
        let ops = vec![
            Operation::AppCreate,
            Operation::AppCreateResponse(Ok(())),
            Operation::call("todo.add", json!({"text": "milk"})),
            Operation::greet(["A", "B"]),
            Operation::AppGreetResponse(vec![false]),
            Operation::AppPing,
        ];
        for op in ops {
            let wire = op.encode().unwrap();
            assert_eq!(Operation::decode(&wire).unwrap(), op);
        }
    }

    #[test]
    fn every_request_kind_has_a_response_kind() {
        for kind in OperationKind::ALL {
            if kind.is_response() {
                assert_eq!(kind.response_kind(), None);
            } else {
                let response = kind.response_kind().expect("request without response");
                assert!(response.is_response());
            }
        }
    }

    #[test]
    fn kind_parse_round_trips_wire_names() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(OperationKind::parse("NOT_A_KIND"), None);
    }

    #[test]
    fn kind_display_is_wire_name() {
        assert_eq!(
            OperationKind::RemoteCallProcedure.to_string(),
            "REMOTE_CALL_PROCEDURE"
        );
    }
}
