//! Protocol layer errors.
//!
//! This module defines the decode/encode errors for the control channel
//! and the network frame codec, implementing the [`ErrorCode`] trait for
//! unified error handling across the Hive system.
//!
//! # Error Code Convention
//!
//! All protocol errors use the `PROTO_` prefix for their codes:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`ProtoError::NotAnObject`] | `PROTO_NOT_AN_OBJECT` | No |
//! | [`ProtoError::MissingType`] | `PROTO_MISSING_TYPE` | No |
//! | [`ProtoError::UnknownKind`] | `PROTO_UNKNOWN_KIND` | No |
//! | [`ProtoError::BadPayload`] | `PROTO_BAD_PAYLOAD` | No |
//! | [`ProtoError::Codec`] | `PROTO_CODEC` | No |
//!
//! None of these are recoverable: a message that failed to decode will
//! fail the same way on every retry, so the sender has to be fixed. The
//! dispatcher answers them with a best-effort diagnostic instead of a
//! response operation.
//!
//! # Usage
//!
//! ```
//! use hive_proto::ProtoError;
//! use hive_types::ErrorCode;
//!
//! let err = ProtoError::MissingType;
//! assert_eq!(err.code(), "PROTO_MISSING_TYPE");
//! assert!(!err.is_recoverable());
//! ```

use hive_types::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol layer error.
///
/// Raised while turning raw bytes or raw JSON into typed operations and
/// frames. All variants implement [`ErrorCode`].
///
/// # Variants
///
/// | Variant | When |
/// |---------|------|
/// | [`NotAnObject`](Self::NotAnObject) | Control message is not a JSON object |
/// | [`MissingType`](Self::MissingType) | Control message has no usable `type` field |
/// | [`UnknownKind`](Self::UnknownKind) | `type` names no known operation |
/// | [`BadPayload`](Self::BadPayload) | Known `type`, undecodable `message` |
/// | [`Codec`](Self::Codec) | JSON (de)serialization failed |
///
/// # Example
///
/// ```
/// use hive_proto::ProtoError;
/// use hive_types::ErrorCode;
///
/// let err = ProtoError::UnknownKind("APP_EXPLODE".into());
/// assert_eq!(err.code(), "PROTO_UNKNOWN_KIND");
/// assert!(err.to_string().contains("APP_EXPLODE"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum ProtoError {
    /// The inbound control message is not a JSON object.
    ///
    /// Operations are always objects (`{"type": ..., "message": ...}`);
    /// scalars and arrays cannot carry an operation type.
    #[error("operation is not an object")]
    NotAnObject,

    /// The inbound control message has no usable `type` field.
    ///
    /// Covers both an absent `type` key and a `type` that is not a
    /// string.
    #[error("operation has no usable type field")]
    MissingType,

    /// The `type` field names no operation this worker understands.
    #[error("unknown operation type: {0}")]
    UnknownKind(String),

    /// The `type` was recognized but the `message` payload did not
    /// decode into that operation's shape.
    #[error("bad payload for {kind}: {reason}")]
    BadPayload {
        /// Wire name of the operation whose payload failed to decode.
        kind: String,
        /// Decoder error text.
        reason: String,
    },

    /// JSON (de)serialization failed outside the structured cases above,
    /// e.g. a network frame line that is not valid JSON.
    #[error("codec error: {0}")]
    Codec(String),
}

impl ErrorCode for ProtoError {
    /// Returns a machine-readable error code.
    ///
    /// All protocol errors use the `PROTO_` prefix.
    fn code(&self) -> &'static str {
        match self {
            Self::NotAnObject => "PROTO_NOT_AN_OBJECT",
            Self::MissingType => "PROTO_MISSING_TYPE",
            Self::UnknownKind(_) => "PROTO_UNKNOWN_KIND",
            Self::BadPayload { .. } => "PROTO_BAD_PAYLOAD",
            Self::Codec(_) => "PROTO_CODEC",
        }
    }

    /// Returns whether the error is recoverable.
    ///
    /// Decode failures are deterministic, so retrying never helps.
    fn is_recoverable(&self) -> bool {
        false
    }
}

impl From<serde_json::Error> for ProtoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec(err.to_string())
    }
}
