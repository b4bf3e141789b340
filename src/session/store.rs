//! Process-wide session record guarded by a single mutex.
//!
//! Every operation takes the lock for its whole read-modify-write so a
//! poller never sees `processed_count` advanced without the matching
//! `latest_result`. The lock is never held across an `.await`.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};

use crate::models::session::{ended_banner, EndSummary, SessionSnapshot, STARTED_BANNER};
use crate::{AppError, Result};

/// Mutable session record shared by every request handler.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<SessionSnapshot>,
}

impl SessionStore {
    /// Create an inactive store with the "no results" banner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionSnapshot>> {
        self.inner
            .lock()
            .map_err(|_| AppError::SessionState("session lock poisoned".into()))
    }

    /// Activate the session, zero both counters, and record `test_mode`.
    ///
    /// Calling `start` on an active session restarts it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionState` if the lock is poisoned.
    pub fn start(&self, test_mode: bool) -> Result<SessionSnapshot> {
        let mut state = self.lock()?;
        if state.active {
            info!(
                processed_count = state.processed_count,
                "restarting an already active session"
            );
        }
        state.active = true;
        state.processed_count = 0;
        state.frame_number = 0;
        state.test_mode = test_mode;
        STARTED_BANNER.clone_into(&mut state.latest_result);
        state.last_update = Some(Utc::now());
        Ok(state.clone())
    }

    /// Record the outcome of one ingestion attempt.
    ///
    /// Both counters advance together with `latest_result`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionState` if the lock is poisoned.
    pub fn record_result(&self, text: impl Into<String>) -> Result<SessionSnapshot> {
        let text = text.into();
        let mut state = self.lock()?;
        state.processed_count = state.processed_count.saturating_add(1);
        state.frame_number = state.frame_number.saturating_add(1);
        state.latest_result = text;
        state.last_update = Some(Utc::now());
        debug!(
            processed_count = state.processed_count,
            frame_number = state.frame_number,
            "frame result recorded"
        );
        Ok(state.clone())
    }

    /// Deactivate the session and return the counters read in the same
    /// critical section. Counters are kept until the next [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionState` if the lock is poisoned.
    pub fn end(&self) -> Result<EndSummary> {
        let mut state = self.lock()?;
        let summary = EndSummary {
            processed_count: state.processed_count,
            total_frames: state.frame_number,
        };
        state.active = false;
        state.latest_result = ended_banner(summary.processed_count);
        state.last_update = Some(Utc::now());
        Ok(summary)
    }

    /// Owned copy of every field.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionState` if the lock is poisoned.
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        Ok(self.lock()?.clone())
    }
}
