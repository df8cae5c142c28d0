//! Stream publishing seam.
//!
//! Applications push values onto named topics; whoever is subscribed on
//! a topic *at publish time* receives the value. Delivery is
//! at-most-once and best-effort: there is no replay for late
//! subscribers, no buffering for absent ones, and a subscriber that
//! cannot accept the value right now is skipped rather than awaited.
//!
//! The concrete fan-out lives behind [`Publisher`]:
//!
//! | Implementation | Where |
//! |----------------|-------|
//! | topic streamer | runtime crate |
//! | `RecordingPublisher` | [`testing`](crate::testing) |

use serde_json::Value;
use std::fmt::Debug;

/// Sink side of topic streaming, as seen by an application.
///
/// Injected into the application through its context; the application
/// never sees individual subscribers, only the delivered count.
pub trait Publisher: Send + Sync + Debug {
    /// Publishes `value` to every current subscriber of `topic`.
    ///
    /// Returns the number of subscribers the value was handed to. Zero
    /// subscribers is a legal no-op, not an error.
    fn publish(&self, topic: &str, value: &Value) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Counting {
        published: AtomicUsize,
    }

    impl Publisher for Counting {
        fn publish(&self, _topic: &str, _value: &Value) -> usize {
            self.published.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    #[test]
    fn usable_as_trait_object() {
        let counting = Arc::new(Counting::default());
        let publisher: Arc<dyn Publisher> = counting.clone();

        let delivered = publisher.publish("todos", &json!({"text": "read"}));
        assert_eq!(delivered, 0);
        assert_eq!(counting.published.load(Ordering::SeqCst), 1);
    }
}
