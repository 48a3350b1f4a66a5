use crate::clock::Clock;
use crate::filters::CardFilter;
use crate::repo::Persistence;
use crate::scheduler::{due_ids, record_judgment, ScheduleOutcome};
use crate::session::{SessionState, SessionSummary, SessionTracker};
use crate::store::CardStore;
use crate::{Card, CoreError, Judgment};
use tracing::info;

/// Card store, clock, and the running review session in one place. This is
/// what a presentation layer drives.
pub struct Trainer<P: Persistence, C: Clock> {
    store: CardStore<P>,
    clock: C,
    filter: CardFilter,
    session: SessionTracker,
    last_outcome: Option<ScheduleOutcome>,
}

impl<P: Persistence, C: Clock> Trainer<P, C> {
    pub fn open(persistence: P, clock: C) -> Result<Self, CoreError> {
        Self::open_filtered(persistence, clock, CardFilter::default())
    }

    pub fn open_filtered(persistence: P, clock: C, filter: CardFilter) -> Result<Self, CoreError> {
        let store = CardStore::open(persistence)?;
        Ok(Self::from_store(store, clock, filter))
    }

    pub fn from_store(store: CardStore<P>, clock: C, filter: CardFilter) -> Self {
        let mut trainer = Self {
            store,
            clock,
            filter,
            session: SessionTracker::default(),
            last_outcome: None,
        };
        trainer.reset_session();
        trainer
    }

    pub fn store(&self) -> &CardStore<P> {
        &self.store
    }

    /// Mutations made here are not seen by the running session until
    /// `reset_session`.
    pub fn store_mut(&mut self) -> &mut CardStore<P> {
        &mut self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn filter(&self) -> &CardFilter {
        &self.filter
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.session
            .current_id()
            .and_then(|id| self.store.get(id).ok())
    }

    pub fn last_outcome(&self) -> Option<ScheduleOutcome> {
        self.last_outcome
    }

    pub fn submit_judgment(&mut self, judgment: impl Into<Judgment>) -> Result<SessionState, CoreError> {
        let judgment = judgment.into();
        let id = self
            .session
            .current_id()
            .ok_or(CoreError::InvalidState("session is complete"))?
            .to_string();
        let now = self.clock.now();
        let out = record_judgment(&mut self.store, &id, judgment, now)?;
        self.last_outcome = Some(out);
        let state = self.session.record(judgment)?;
        if state.is_complete() {
            info!(
                correct = self.session.correct_count(),
                incorrect = self.session.incorrect_count(),
                "review session complete"
            );
        }
        Ok(state)
    }

    pub fn summary(&self) -> Result<SessionSummary, CoreError> {
        self.session.summary()
    }

    /// Starts a fresh pass over a newly computed due set.
    pub fn reset_session(&mut self) {
        let now = self.clock.now();
        let candidates: Vec<Card> = self
            .store
            .get_all()
            .iter()
            .filter(|c| self.filter.matches(c))
            .cloned()
            .collect();
        let due = due_ids(&candidates, now);
        info!(due = due.len(), total = self.store.len(), "review session started");
        self.session = SessionTracker::new(due);
        self.last_outcome = None;
    }

    /// Restores every card to seed state, then restarts the session.
    pub fn reset_cards(&mut self) -> Result<(), CoreError> {
        self.store.reset()?;
        self.reset_session();
        Ok(())
    }
}
