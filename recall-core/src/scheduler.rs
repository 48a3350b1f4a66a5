use crate::repo::Persistence;
use crate::store::CardStore;
use crate::{Card, CardId, CoreError, Judgment, ReviewPatch, BASE_INTERVAL_HOURS};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleOutcome {
    pub patch: ReviewPatch,
    pub interval_hours: u64,
}

/// Cards whose next review is unset or not after `now`, in input order.
pub fn compute_due_set(cards: &[Card], now: DateTime<Utc>) -> Vec<Card> {
    cards.iter().filter(|c| c.is_due(now)).cloned().collect()
}

pub fn due_ids(cards: &[Card], now: DateTime<Utc>) -> Vec<CardId> {
    cards
        .iter()
        .filter(|c| c.is_due(now))
        .map(|c| c.id.clone())
        .collect()
}

/// `4 * 2^(streak + 1)` hours after a correct answer, 4 hours after a miss.
/// There is no ceiling; the value saturates at `u64::MAX` instead of
/// overflowing.
pub fn next_interval_hours(streak_before: u32, judgment: Judgment) -> u64 {
    if !judgment.is_correct() {
        return BASE_INTERVAL_HOURS;
    }
    streak_before
        .checked_add(1)
        .and_then(|exp| 2u64.checked_pow(exp))
        .and_then(|m| m.checked_mul(BASE_INTERVAL_HOURS))
        .unwrap_or(u64::MAX)
}

fn add_hours(now: DateTime<Utc>, hours: u64) -> DateTime<Utc> {
    i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Pure scheduling step: what the card's review fields become after
/// `judgment` at `now`.
pub fn schedule(card: &Card, judgment: Judgment, now: DateTime<Utc>) -> ScheduleOutcome {
    let hours = next_interval_hours(card.correct_streak, judgment);
    let correct_streak = if judgment.is_correct() {
        card.correct_streak.saturating_add(1)
    } else {
        0
    };
    ScheduleOutcome {
        patch: ReviewPatch {
            last_reviewed_at: Some(now),
            next_review_at: Some(add_hours(now, hours)),
            correct_streak,
        },
        interval_hours: hours,
    }
}

/// Schedules the identified card and writes the result through the store.
pub fn record_judgment<P: Persistence>(
    store: &mut CardStore<P>,
    card_id: &str,
    judgment: Judgment,
    now: DateTime<Utc>,
) -> Result<ScheduleOutcome, CoreError> {
    let card = store.get(card_id)?;
    let old_streak = card.correct_streak;
    let out = schedule(card, judgment, now);
    store.update(card_id, out.patch)?;
    debug!(
        card = card_id,
        ?judgment,
        old_streak,
        new_streak = out.patch.correct_streak,
        interval_hours = out.interval_hours,
        "judgment recorded"
    );
    Ok(out)
}
