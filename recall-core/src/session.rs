use crate::{CardId, CoreError, Judgment};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// `position` is zero-based into a due set of `total` cards.
    Active {
        position: usize,
        total: usize,
        card_id: CardId,
    },
    Complete,
}

impl SessionState {
    pub fn is_complete(&self) -> bool {
        matches!(self, SessionState::Complete)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub accuracy: f64,
}

/// One pass over a due set snapshot.
#[derive(Clone, Debug, Default)]
pub struct SessionTracker {
    due: Vec<CardId>,
    cursor: usize,
    correct: u32,
    incorrect: u32,
}

impl SessionTracker {
    pub fn new(due: Vec<CardId>) -> Self {
        Self {
            due,
            ..Self::default()
        }
    }

    /// The due set snapshot this session walks.
    pub fn due(&self) -> &[CardId] {
        &self.due
    }

    pub fn total(&self) -> usize {
        self.due.len()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.due.len()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.due.get(self.cursor).map(String::as_str)
    }

    pub fn state(&self) -> SessionState {
        match self.due.get(self.cursor) {
            Some(id) => SessionState::Active {
                position: self.cursor,
                total: self.due.len(),
                card_id: id.clone(),
            },
            None => SessionState::Complete,
        }
    }

    /// Counts the judgment and moves to the next card.
    pub fn record(&mut self, judgment: Judgment) -> Result<SessionState, CoreError> {
        if self.is_complete() {
            return Err(CoreError::InvalidState("session is complete"));
        }
        match judgment {
            Judgment::Correct => self.correct += 1,
            Judgment::Incorrect => self.incorrect += 1,
        }
        self.cursor += 1;
        Ok(self.state())
    }

    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    pub fn incorrect_count(&self) -> u32 {
        self.incorrect
    }

    pub fn judged(&self) -> u32 {
        self.correct + self.incorrect
    }

    pub fn summary(&self) -> Result<SessionSummary, CoreError> {
        let judged = self.judged();
        if judged == 0 {
            return Err(CoreError::InvalidState("no judgments recorded"));
        }
        Ok(SessionSummary {
            correct_count: self.correct,
            incorrect_count: self.incorrect,
            accuracy: self.correct as f64 / judged as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<CardId> {
        (1..=n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn empty_due_set_starts_complete() {
        let mut t = SessionTracker::new(vec![]);
        assert_eq!(t.state(), SessionState::Complete);
        assert!(t.current_id().is_none());
        assert_eq!(
            t.record(Judgment::Correct),
            Err(CoreError::InvalidState("session is complete"))
        );
    }

    #[test]
    fn mixed_counts() {
        let mut t = SessionTracker::new(ids(4));
        t.record(Judgment::Correct).unwrap();
        t.record(Judgment::Incorrect).unwrap();
        t.record(Judgment::Correct).unwrap();
        let st = t.record(Judgment::Correct).unwrap();
        assert!(st.is_complete());
        let s = t.summary().unwrap();
        assert_eq!(s.correct_count, 3);
        assert_eq!(s.incorrect_count, 1);
        assert!((s.accuracy - 0.75).abs() < f64::EPSILON);
    }
}
