//! Type-ahead debouncing.
//!
//! Every keystroke calls [`Debouncer::settle`]. Only the call that is still the
//! most recent once the delay has elapsed gets its term back; earlier calls
//! resolve to `None`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::trace;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    latest: AtomicU64,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, latest: AtomicU64::new(0) }
    }

    /// Wait out the delay; return the trimmed term if no newer input arrived.
    ///
    /// A blank term still supersedes pending input but returns `None` at once.
    pub async fn settle(&self, term: &str) -> Option<String> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        tokio::time::sleep(self.delay).await;

        if self.latest.load(Ordering::SeqCst) == ticket {
            Some(term.to_string())
        } else {
            trace!(%term, "input superseded before delay elapsed");
            None
        }
    }
}
