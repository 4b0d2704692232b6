//! Per-call request context.

use ncfs_types::User;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// The authenticated caller and a cancellation signal.
///
/// Cloning shares the token, so cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct RequestContext {
    user: User,
    cancel: CancellationToken,
}

impl RequestContext {
    pub fn new(user: User) -> Self {
        Self {
            user,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach an existing token, typically a child of a server-wide one.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// The `~<username>` path segment for this caller.
    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncfs_types::UserId;

    #[test]
    fn test_clones_share_cancellation() {
        let ctx = RequestContext::new(User::new(UserId::primary("idp", "u"), "tester"));
        let clone = ctx.clone();
        assert!(!clone.is_cancelled());
        ctx.cancel();
        assert!(clone.is_cancelled());
        assert_eq!(clone.username(), "tester");
    }

    #[test]
    fn test_child_token() {
        let parent = CancellationToken::new();
        let ctx = RequestContext::new(User::default()).with_cancellation(parent.child_token());
        parent.cancel();
        assert!(ctx.is_cancelled());
    }
}
