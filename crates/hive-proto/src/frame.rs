//! Network frames.
//!
//! Every connection to a worker's gateway exchanges newline-delimited
//! JSON frames. One line is one frame; the payload vocabulary covers
//! both halves of the data plane:
//!
//! ```text
//! RPC        peer ──Call{id}──────────► worker
//!            peer ◄─CallResult{id}───── worker
//!
//! Streams    peer ──Subscribe{id}─────► worker
//!            peer ◄─Subscribed{id}───── worker
//!            peer ──Publish────────────► worker
//!            peer ◄─Event────────────── worker   (fan-out, best effort)
//!            peer ──Unsubscribe────────► worker   (no acknowledgement)
//! ```
//!
//! `id` is a [`CallId`] correlating a request frame with its reply, so
//! several calls can be in flight on one socket and complete out of
//! order. `Unsubscribe` and `Publish` are fire-and-forget.

use hive_types::{CallId, SubscriptionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::call::{Call, CallOutcome};
use crate::error::ProtoError;

/// One framed message on a gateway connection.
///
/// # Example
///
/// ```
/// use hive_proto::{Call, Frame};
/// use hive_types::CallId;
/// use serde_json::json;
///
/// let frame = Frame::Call {
///     id: CallId::new(),
///     call: Call::new("echo", json!(["hi"])),
/// };
/// let line = frame.to_line().unwrap();
/// let back = Frame::from_line(&line).unwrap();
/// assert!(matches!(back, Frame::Call { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    /// Invoke a procedure on the hosted application.
    Call {
        /// Correlates the eventual [`Frame::CallResult`].
        id: CallId,
        /// Method identifier and arguments.
        call: Call,
    },
    /// Reply to a [`Frame::Call`] with the same `id`.
    CallResult {
        /// Id of the call this result answers.
        id: CallId,
        /// The procedure's value or a structured failure.
        outcome: CallOutcome,
    },
    /// Join a topic; answered by [`Frame::Subscribed`].
    Subscribe {
        /// Correlates the acknowledgement.
        id: CallId,
        /// Topic to join.
        topic: String,
    },
    /// Acknowledges a [`Frame::Subscribe`] with the same `id`.
    Subscribed {
        /// Id of the subscribe this acknowledges.
        id: CallId,
        /// Handle for a later [`Frame::Unsubscribe`].
        subscription: SubscriptionId,
    },
    /// Leave a topic. Idempotent, never acknowledged.
    Unsubscribe {
        /// Subscription to drop; a stale id is a no-op.
        subscription: SubscriptionId,
    },
    /// Publish a value to a topic. Never acknowledged; delivery is
    /// best-effort to the subscribers present right now.
    Publish {
        /// Topic to publish to.
        topic: String,
        /// Published value.
        value: Value,
    },
    /// One published value delivered to one subscription.
    Event {
        /// Subscription this delivery belongs to.
        subscription: SubscriptionId,
        /// Topic the value was published to.
        topic: String,
        /// Published value.
        value: Value,
    },
}

impl Frame {
    /// Encodes this frame as one JSON line (no trailing newline).
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::Codec`] if serialization fails.
    pub fn to_line(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(ProtoError::from)
    }

    /// Decodes one JSON line into a frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::Codec`] if the line is not a valid frame.
    pub fn from_line(line: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(line).map_err(ProtoError::from)
    }

    /// Returns a short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Call { .. } => "Call",
            Self::CallResult { .. } => "CallResult",
            Self::Subscribe { .. } => "Subscribe",
            Self::Subscribed { .. } => "Subscribed",
            Self::Unsubscribe { .. } => "Unsubscribe",
            Self::Publish { .. } => "Publish",
            Self::Event { .. } => "Event",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::Failure;
    use serde_json::json;

    #[test]
    fn call_frame_line_round_trip() {
        let frame = Frame::Call {
            id: CallId::new(),
            call: Call::new("todo.add", json!({"text": "milk"})),
        };
        let line = frame.to_line().unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(Frame::from_line(&line).unwrap(), frame);
    }

    #[test]
    fn call_result_carries_failure() {
        let id = CallId::new();
        let frame = Frame::CallResult {
            id,
            outcome: Err(Failure::new("APP_METHOD_NOT_FOUND", "no such method")),
        };
        let line = frame.to_line().unwrap();
        match Frame::from_line(&line).unwrap() {
            Frame::CallResult {
                id: back,
                outcome: Err(failure),
            } => {
                assert_eq!(back, id);
                assert_eq!(failure.code, "APP_METHOD_NOT_FOUND");
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn event_frame_round_trip() {
        let frame = Frame::Event {
            subscription: SubscriptionId::new(),
            topic: "ticks".into(),
            value: json!(3),
        };
        let line = frame.to_line().unwrap();
        assert_eq!(Frame::from_line(&line).unwrap(), frame);
    }

    #[test]
    fn garbage_line_is_a_codec_error() {
        let err = Frame::from_line("{ not json").unwrap_err();
        assert!(matches!(err, ProtoError::Codec(_)));
    }

    #[test]
    fn frame_names_for_logging() {
        let frame = Frame::Unsubscribe {
            subscription: SubscriptionId::new(),
        };
        assert_eq!(frame.name(), "Unsubscribe");
    }
}
