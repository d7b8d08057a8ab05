//! Deadline and cooperative cancellation for handler execution.
//!
//! Every call gets a child of the caller's context bounded by the registry
//! timeout. Handlers that care about abandoned work should watch
//! [`CallContext::cancelled`]; nothing forces them to stop.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Deadline plus cancellation signal carried by a request.
///
/// Clone-friendly: clones share the same cancellation token.
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl CallContext {
    /// Context with no deadline that is never cancelled unless asked to.
    pub fn background() -> Self {
        Self {
            deadline: None,
            token: CancellationToken::new(),
        }
    }

    /// Background context expiring `timeout` from now. A timeout too large
    /// to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            token: CancellationToken::new(),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: CancellationToken::new(),
        }
    }

    /// Derive a child bounded by `timeout` from now.
    ///
    /// A timeout that overflows the clock leaves only the parent's deadline.
    ///
    /// The child keeps the parent's deadline when it is earlier, and is
    /// cancelled whenever the parent is. Cancelling the child leaves the
    /// parent untouched.
    pub fn child(&self, timeout: Duration) -> Self {
        let own = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, own) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, None) => parent,
            (None, own) => own,
        };
        Self {
            deadline,
            token: self.token.child_token(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Resolves at the deadline or on cancellation, whichever comes first.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {}
                    _ = self.token.cancelled() => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}

/// Cancels its context when dropped, e.g. when a client disconnects and the
/// serving future is dropped.
#[must_use = "the context is cancelled as soon as the guard is dropped"]
#[derive(Debug)]
pub struct CancelGuard {
    ctx: CallContext,
}

impl CallContext {
    pub fn cancel_on_drop(&self) -> CancelGuard {
        CancelGuard { ctx: self.clone() }
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.ctx.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_has_no_deadline() {
        let ctx = CallContext::background();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_takes_earlier_deadline() {
        let parent = CallContext::with_timeout(Duration::from_secs(1));
        let child = parent.child(Duration::from_secs(10));
        assert_eq!(child.deadline(), parent.deadline());

        let parent = CallContext::with_timeout(Duration::from_secs(10));
        let child = parent.child(Duration::from_secs(1));
        assert!(child.deadline().unwrap() < parent.deadline().unwrap());
    }

    #[tokio::test]
    async fn test_parent_cancel_reaches_child() {
        let parent = CallContext::background();
        let child = parent.child(Duration::from_secs(60));
        parent.cancel();
        assert!(child.is_cancelled());
        child.done().await;
    }

    #[tokio::test]
    async fn test_child_cancel_leaves_parent() {
        let parent = CallContext::background();
        let child = parent.child(Duration::from_secs(60));
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_guard_cancels_on_drop() {
        let ctx = CallContext::background();
        {
            let _guard = ctx.cancel_on_drop();
            assert!(!ctx.is_cancelled());
        }
        assert!(ctx.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_fires_at_deadline() {
        let ctx = CallContext::with_timeout(Duration::from_millis(500));
        let start = Instant::now();
        ctx.done().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_has_no_deadline() {
        let ctx = CallContext::with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());

        let child = CallContext::background().child(Duration::MAX);
        assert!(child.deadline().is_none());

        let parent = CallContext::with_timeout(Duration::from_secs(5));
        let child = parent.child(Duration::MAX);
        assert_eq!(child.deadline(), parent.deadline());
    }
}
