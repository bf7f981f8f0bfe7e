//! Shared `loading`/`error`/`data` state for screen controllers.
//!
//! Every fetch takes a [`Ticket`] from [`Screen::begin`] and hands it back to
//! [`Screen::settle`]. Only the most recently issued ticket may write, so a slow
//! response to an old parameter set can not overwrite a newer one. Errors never
//! clear data: a failed refresh leaves the last good value in place.

use crate::api::ApiError;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use tracing::debug;

/// Point-in-time copy of a screen's state.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenState<T> {
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            data: None,
        }
    }
}

/// Proof that a fetch was started; carries its sequence number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// Whether a settled response was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settled {
    Applied,
    Stale,
}

#[derive(Clone)]
pub struct Screen<T> {
    name: &'static str,
    state: Arc<RwLock<ScreenState<T>>>,
    seq: Arc<AtomicU64>,
}

impl<T: Clone> Screen<T> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(RwLock::new(ScreenState::default())),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Marks the screen as loading and issues a new ticket. Existing data stays.
    pub fn begin(&self) -> Ticket {
        let ticket = Ticket(self.seq.fetch_add(1, Ordering::AcqRel) + 1);
        self.write().loading = true;
        ticket
    }

    /// Applies a fetch result if `ticket` is still the latest one issued.
    pub fn settle(&self, ticket: Ticket, result: Result<T, ApiError>) -> Settled {
        let mut state = self.write();
        // Checked under the write lock so two settles can not interleave.
        if self.seq.load(Ordering::Acquire) != ticket.0 {
            debug!(screen = self.name, ticket = ticket.0, "discarding stale response");
            return Settled::Stale;
        }

        state.loading = false;
        match result {
            Ok(data) => {
                state.data = Some(data);
                state.error = None;
            }
            Err(err) => {
                debug!(screen = self.name, error = %err, "fetch failed, keeping previous data");
                state.error = Some(err.user_message());
            }
        }
        Settled::Applied
    }

    /// Records an error that happened before any fetch was issued.
    pub fn fail(&self, message: impl Into<String>) {
        let mut state = self.write();
        state.loading = false;
        state.error = Some(message.into());
    }

    #[must_use]
    pub fn snapshot(&self) -> ScreenState<T> {
        self.read().clone()
    }

    #[must_use]
    pub fn data(&self) -> Option<T> {
        self.read().data.clone()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    fn read(&self) -> RwLockReadGuard<'_, ScreenState<T>> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ScreenState<T>> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
