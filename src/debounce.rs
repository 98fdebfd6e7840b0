use std::time::{Duration, Instant};

use tracing::trace;

/// Text input that commits its draft only after a quiet period.
///
/// The timer is a deadline checked by `poll` on the event loop, so nothing
/// can fire once the input is dropped.
#[derive(Debug, Clone)]
pub struct DebouncedInput {
    draft: String,
    external: String,
    quiet: Duration,
    deadline: Option<Instant>,
}

impl DebouncedInput {
    pub fn new(value: impl Into<String>, quiet: Duration) -> Self {
        let value = value.into();
        Self {
            draft: value.clone(),
            external: value,
            quiet,
            deadline: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.draft
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Mirror the canonical value. A changed canonical value replaces the
    /// draft and drops any pending commit.
    pub fn sync(&mut self, canonical: &str) {
        if self.external != canonical {
            trace!("Mirroring external value {canonical:?}");
            self.external = canonical.to_string();
            self.draft = canonical.to_string();
            self.deadline = None;
        }
    }

    /// Replace the draft and restart the quiet period.
    pub fn edit(&mut self, draft: impl Into<String>, now: Instant) {
        let draft = draft.into();
        if draft != self.draft {
            self.draft = draft;
            self.deadline = Some(now + self.quiet);
        }
    }

    /// Returns the draft once the quiet period after the last edit is over.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                trace!("Committing {:?}", self.draft);
                Some(self.draft.clone())
            }
            _ => None,
        }
    }

    /// Drop the pending commit and restore the last canonical value.
    pub fn revert(&mut self) {
        self.deadline = None;
        self.draft = self.external.clone();
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
