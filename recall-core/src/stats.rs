use crate::Card;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total: usize,
    pub never_reviewed: usize,
    pub due: usize,
    pub scheduled: usize,
    pub longest_streak: u32,
    /// Earliest upcoming review among cards not yet due.
    pub next_due_at: Option<DateTime<Utc>>,
}

pub fn summarize(cards: &[Card], now: DateTime<Utc>) -> CollectionStats {
    let mut stats = CollectionStats {
        total: cards.len(),
        ..CollectionStats::default()
    };
    for c in cards {
        if c.is_new() {
            stats.never_reviewed += 1;
        }
        if c.is_due(now) {
            stats.due += 1;
        } else {
            stats.scheduled += 1;
            stats.next_due_at = match (stats.next_due_at, c.next_review_at) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (None, b) => b,
                (a, None) => a,
            };
        }
        stats.longest_streak = stats.longest_streak.max(c.correct_streak);
    }
    stats
}
