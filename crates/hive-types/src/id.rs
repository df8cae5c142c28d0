//! Identifier types for Hive.
//!
//! All identifiers are UUID-based so they stay unique across worker
//! processes and are safe to carry over the network.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one remote procedure call in flight.
///
/// A `CallId` correlates a call frame with its reply frame so that
/// several calls can share one connection and complete out of order.
///
/// # Call Correlation
///
/// ```text
/// ┌─────────────┐  Call{id: a}        ┌─────────────┐
/// │    Peer     │ ──────────────────► │   Worker    │
/// │             │  Call{id: b}        │             │
/// │             │ ──────────────────► │             │
/// │             │ ◄────────────────── │             │
/// │             │  CallResult{id: b}  │             │
/// │             │ ◄────────────────── │             │
/// └─────────────┘  CallResult{id: a}  └─────────────┘
/// ```
///
/// # Example
///
/// ```
/// use hive_types::CallId;
///
/// let id = CallId::new();
/// println!("Call: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub Uuid);

#[allow(clippy::new_without_default)] // Default intentionally not implemented - CallId is minted per outbound call
impl CallId {
    /// Creates a new [`CallId`] with a random UUID v4.
    ///
    /// # Example
    ///
    /// ```
    /// use hive_types::CallId;
    ///
    /// let id = CallId::new();
    /// println!("Call ID: {}", id);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

// NOTE: CallId intentionally does NOT implement Default.
// A CallId only means something while its call is in flight; minting one
// outside the call path would never be matched by a reply.

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call:{}", self.0)
    }
}

/// Identifier for one stream subscription.
///
/// Returned by the streamer when a connection subscribes to a topic;
/// the same id later removes the subscription. Removal is idempotent,
/// so a stale id is harmless.
///
/// # Example
///
/// ```
/// use hive_types::SubscriptionId;
///
/// let id = SubscriptionId::new();
/// println!("Subscription: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

#[allow(clippy::new_without_default)] // Default intentionally not implemented - see below
impl SubscriptionId {
    /// Creates a new [`SubscriptionId`] with a random UUID v4.
    ///
    /// # Example
    ///
    /// ```
    /// use hive_types::SubscriptionId;
    ///
    /// let id = SubscriptionId::new();
    /// println!("Subscription ID: {}", id);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

// NOTE: SubscriptionId intentionally does NOT implement Default.
// Default::default() would mint an id that is not registered in any topic,
// and unsubscribing it would silently do nothing. Ids come from subscribe().

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}

/// Identifier for one accepted network connection.
///
/// The gateway mints a `ConnectionId` per accepted socket. The streamer
/// keys subscriptions by it so that closing the socket can release
/// everything the connection still holds in one sweep.
///
/// # Connection Lifetime
///
/// ```text
/// accept ──► ConnectionId minted
///    │
///    ├── subscribe(topic) ──► SubscriptionId (owned by this connection)
///    │
/// close ──► every subscription keyed to the ConnectionId is released
/// ```
///
/// # Example
///
/// ```
/// use hive_types::ConnectionId;
///
/// let conn = ConnectionId::new();
/// println!("Connection: {}", conn);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Creates a new [`ConnectionId`] with a random UUID v4.
    ///
    /// # Example
    ///
    /// ```
    /// use hive_types::ConnectionId;
    ///
    /// let id = ConnectionId::new();
    /// println!("Connection ID: {}", id);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

// Tests are in lib.rs as integration tests for public API
