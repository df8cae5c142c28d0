//! Remote procedure call payloads.
//!
//! A [`Call`] travels inside a `REMOTE_CALL_PROCEDURE` operation on the
//! control channel and inside a `Call` frame on the network. Either way
//! its outcome is a [`CallOutcome`]: the procedure's JSON value on
//! success, a [`Failure`] on error. Channels never carry raw faults.

use hive_types::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default timeout for one outbound remote call, in milliseconds.
///
/// Applied by the RPC client when the caller does not override it via
/// `with_timeout`. Generous because a remote procedure may itself do
/// I/O before answering.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;

/// One remote procedure invocation.
///
/// `method` is the identifier the target application registered its
/// handler under. `args` is an arbitrary JSON value; by convention an
/// array for positional arguments, but the core does not inspect it.
///
/// The responser owns a `Call` only for the duration of one invocation;
/// nothing about it is retained afterwards.
///
/// # Example
///
/// ```
/// use hive_proto::Call;
/// use serde_json::json;
///
/// let call = Call::new("echo", json!(["hello"]));
/// assert_eq!(call.method, "echo");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Target method identifier.
    pub method: String,
    /// Arguments for the target method.
    #[serde(default)]
    pub args: Value,
}

impl Call {
    /// Creates a new call.
    ///
    /// # Arguments
    ///
    /// * `method` - Identifier of the procedure to invoke
    /// * `args` - Arguments passed through to the handler unchanged
    #[must_use]
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

impl std::fmt::Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call {}", self.method)
    }
}

/// Structured failure payload.
///
/// The serializable form every error takes before it crosses a process
/// boundary. `code` is the stable [`ErrorCode`] identifier of the
/// originating error; `message` is its human-readable rendering.
///
/// Receivers branch on `code`, never on `message`.
///
/// # Example
///
/// ```
/// use hive_proto::Failure;
///
/// let failure = Failure::new("APP_METHOD_NOT_FOUND", "no procedure named \"missing\"");
/// assert_eq!(failure.code, "APP_METHOD_NOT_FOUND");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Stable machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl Failure {
    /// Creates a failure from a code and a message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a failure from any error carrying an [`ErrorCode`].
    ///
    /// # Example
    ///
    /// ```
    /// use hive_proto::{Failure, ProtoError};
    ///
    /// let err = ProtoError::MissingType;
    /// let failure = Failure::from_error(&err);
    /// assert_eq!(failure.code, "PROTO_MISSING_TYPE");
    /// ```
    #[must_use]
    pub fn from_error<E>(err: &E) -> Self
    where
        E: ErrorCode + std::fmt::Display,
    {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Outcome of one remote procedure invocation.
///
/// Serializes as `{"Ok": value}` or `{"Err": {"code", "message"}}`.
pub type CallOutcome = Result<Value, Failure>;
