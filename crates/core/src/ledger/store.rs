//! The single writer holding the current snapshot.

use std::sync::Arc;

use tracing::warn;

use super::command::{Command, EntityRef};
use super::engine::LedgerEngine;
use super::error::LedgerError;
use super::integrity::{IntegrityIssue, audit};
use crate::store::LedgerState;
use crate::sync::SyncHandle;

/// Owns the current snapshot and routes commands through the engine.
///
/// Readers get cheap `Arc` clones of the snapshot; a published snapshot is
/// never modified again. When a [`SyncHandle`] is attached every accepted
/// command schedules the new snapshot for persistence.
#[derive(Debug, Default)]
pub struct LedgerStore {
    state: Arc<LedgerState>,
    sync: Option<SyncHandle>,
}

impl LedgerStore {
    /// Wraps an existing snapshot.
    #[must_use]
    pub fn new(state: LedgerState) -> Self {
        Self {
            state: Arc::new(state),
            sync: None,
        }
    }

    /// Schedules every future snapshot on `sync`.
    #[must_use]
    pub fn with_sync(mut self, sync: SyncHandle) -> Self {
        self.sync = Some(sync);
        self
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<LedgerState> {
        Arc::clone(&self.state)
    }

    /// Applies a command and publishes the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns the engine's `LedgerError`; the current snapshot is kept.
    pub fn dispatch(&mut self, command: Command) -> Result<Option<EntityRef>, LedgerError> {
        let transition = LedgerEngine::apply(&self.state, command)?;
        self.publish(transition.state);
        Ok(transition.affected)
    }

    /// Replaces the whole snapshot, as on import or remote load.
    ///
    /// Integrity issues in the new snapshot are logged and returned; they
    /// never block the replacement.
    pub fn replace(&mut self, state: LedgerState) -> Vec<IntegrityIssue> {
        let issues = audit(&state);
        for issue in &issues {
            warn!(%issue, "snapshot failed integrity audit");
        }
        self.publish(state);
        issues
    }

    fn publish(&mut self, state: LedgerState) {
        self.state = Arc::new(state);
        if let Some(sync) = &self.sync {
            sync.schedule(self.snapshot());
        }
    }
}
