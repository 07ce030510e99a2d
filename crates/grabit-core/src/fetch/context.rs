//! Cancellation and deadline for in-flight transfers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared abort token plus an optional deadline. Clones share the token, so a
/// clone handed to a signal handler can stop a transfer running elsewhere.
/// The core never imposes a deadline of its own; callers opt in.
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    abort: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl FetchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Request abort. Every transfer observing this context stops at its next progress tick.
    pub fn cancel(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    /// Why transfers must stop now, if they must.
    pub fn stop_reason(&self) -> Option<&'static str> {
        if self.is_cancelled() {
            return Some("cancelled");
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some("deadline exceeded"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_abort_token() {
        let ctx = FetchContext::new();
        let handle = ctx.clone();
        assert_eq!(ctx.stop_reason(), None);
        handle.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.stop_reason(), Some("cancelled"));
    }

    #[test]
    fn past_deadline_stops() {
        let ctx = FetchContext::new().with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.stop_reason(), Some("deadline exceeded"));
        let later = FetchContext::new().with_timeout(Duration::from_secs(3600));
        assert_eq!(later.stop_reason(), None);
    }
}
