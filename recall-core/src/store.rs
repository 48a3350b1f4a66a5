use crate::repo::Persistence;
use crate::{Card, CardId, CoreError, ReviewPatch};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Authoritative card collection, indexed by id, written through to
/// persistence after every mutation.
pub struct CardStore<P: Persistence> {
    persistence: P,
    cards: Vec<Card>,
    index: HashMap<CardId, usize>,
}

impl<P: Persistence> CardStore<P> {
    /// Hydrates the store from `persistence.load()`.
    pub fn open(persistence: P) -> Result<Self, CoreError> {
        let cards = persistence.load()?;
        let mut index = HashMap::with_capacity(cards.len());
        for (pos, card) in cards.iter().enumerate() {
            if index.insert(card.id.clone(), pos).is_some() {
                return Err(CoreError::Invalid(format!("duplicate card id: {}", card.id)));
            }
        }
        info!(cards = cards.len(), "card store hydrated");
        Ok(Self {
            persistence,
            cards,
            index,
        })
    }

    pub fn get_all(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, id: &str) -> Result<&Card, CoreError> {
        self.index
            .get(id)
            .map(|&pos| &self.cards[pos])
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Replaces the review fields of one card. On a failed save the card is
    /// left as it was.
    pub fn update(&mut self, id: &str, patch: ReviewPatch) -> Result<(), CoreError> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        let previous = self.cards[pos].review_state();
        self.cards[pos].apply(&patch);
        if let Err(e) = self.persistence.save(&self.cards) {
            self.cards[pos].apply(&previous);
            return Err(e);
        }
        debug!(card = id, streak = patch.correct_streak, "card updated");
        Ok(())
    }

    /// Restores every card to seed state.
    pub fn reset(&mut self) -> Result<(), CoreError> {
        let previous: Vec<ReviewPatch> = self.cards.iter().map(Card::review_state).collect();
        let seed = ReviewPatch::unreviewed();
        for card in &mut self.cards {
            card.apply(&seed);
        }
        if let Err(e) = self.persistence.save(&self.cards) {
            for (card, state) in self.cards.iter_mut().zip(&previous) {
                card.apply(state);
            }
            return Err(e);
        }
        info!(cards = self.cards.len(), "card store reset");
        Ok(())
    }

    /// Adds a new card in seed state.
    pub fn insert(&mut self, mut card: Card) -> Result<(), CoreError> {
        card.apply(&ReviewPatch::unreviewed());
        self.extend_records(vec![card])
    }

    /// Adds many cards in seed state with a single save.
    pub fn extend(&mut self, cards: Vec<Card>) -> Result<(), CoreError> {
        let seed = ReviewPatch::unreviewed();
        let cards = cards
            .into_iter()
            .map(|mut c| {
                c.apply(&seed);
                c
            })
            .collect();
        self.extend_records(cards)
    }

    /// Adds many full records with a single save. Nothing is added if any id
    /// collides or the save fails.
    pub fn extend_records(&mut self, cards: Vec<Card>) -> Result<(), CoreError> {
        {
            let mut seen = HashSet::new();
            for c in &cards {
                if self.index.contains_key(&c.id) || !seen.insert(c.id.as_str()) {
                    return Err(CoreError::Conflict(format!("card id already exists: {}", c.id)));
                }
            }
        }
        let start = self.cards.len();
        self.cards.extend(cards);
        if let Err(e) = self.persistence.save(&self.cards) {
            self.cards.truncate(start);
            return Err(e);
        }
        for pos in start..self.cards.len() {
            self.index.insert(self.cards[pos].id.clone(), pos);
        }
        debug!(added = self.cards.len() - start, "cards inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::memory::MemoryPersistence;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn seeded() -> (Arc<MemoryPersistence>, CardStore<Arc<MemoryPersistence>>) {
        let p = Arc::new(MemoryPersistence::with_cards(vec![
            Card::with_id("1", "a", "b"),
            Card::with_id("2", "c", "d"),
        ]));
        let store = CardStore::open(p.clone()).unwrap();
        (p, store)
    }

    #[test]
    fn update_replaces_only_review_fields() {
        let (p, mut store) = seeded();
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let patch = ReviewPatch {
            last_reviewed_at: Some(t),
            next_review_at: Some(t + chrono::Duration::hours(8)),
            correct_streak: 1,
        };
        store.update("1", patch).unwrap();

        let c = store.get("1").unwrap();
        assert_eq!(c.prompt, "a");
        assert_eq!(c.answer, "b");
        assert_eq!(c.review_state(), patch);
        assert_eq!(p.save_count(), 1);
        assert_eq!(p.snapshot()[0].correct_streak, 1);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let (p, mut store) = seeded();
        let err = store.update("nope", ReviewPatch::default()).unwrap_err();
        assert_eq!(err, CoreError::NotFound("nope".into()));
        assert_eq!(p.save_count(), 0);
    }

    #[test]
    fn failed_save_leaves_card_untouched() {
        let (p, mut store) = seeded();
        p.set_fail_saves(true);
        let patch = ReviewPatch {
            correct_streak: 5,
            ..ReviewPatch::default()
        };
        assert!(matches!(store.update("2", patch), Err(CoreError::Storage(_))));
        assert_eq!(store.get("2").unwrap().correct_streak, 0);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let p = MemoryPersistence::with_cards(vec![
            Card::with_id("1", "a", "b"),
            Card::with_id("1", "c", "d"),
        ]);
        assert!(matches!(CardStore::open(p), Err(CoreError::Invalid(_))));

        let (_, mut store) = seeded();
        let err = store.insert(Card::with_id("2", "x", "y")).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn extend_with_late_collision_adds_nothing() {
        let (p, mut store) = seeded();
        let batch = vec![
            Card::with_id("3", "e", "f"),
            Card::with_id("4", "g", "h"),
            Card::with_id("1", "dup", "dup"),
        ];
        let err = store.extend(batch).unwrap_err();
        assert_eq!(err, CoreError::Conflict("card id already exists: 1".into()));
        assert_eq!(store.len(), 2);
        assert!(matches!(store.get("3"), Err(CoreError::NotFound(_))));
        assert_eq!(store.get("1").unwrap().prompt, "a");
        assert_eq!(p.save_count(), 0);
    }

    #[test]
    fn extend_with_duplicate_inside_batch_adds_nothing() {
        let (p, mut store) = seeded();
        let batch = vec![Card::with_id("5", "e", "f"), Card::with_id("5", "g", "h")];
        assert!(matches!(store.extend(batch), Err(CoreError::Conflict(_))));
        assert_eq!(store.len(), 2);
        assert!(matches!(store.get("5"), Err(CoreError::NotFound(_))));
        assert_eq!(p.save_count(), 0);
    }

    #[test]
    fn failed_save_during_extend_rolls_back() {
        let (p, mut store) = seeded();
        p.set_fail_saves(true);
        let batch = vec![Card::with_id("3", "e", "f"), Card::with_id("4", "g", "h")];
        assert!(matches!(store.extend(batch), Err(CoreError::Storage(_))));
        assert_eq!(store.len(), 2);
        assert!(matches!(store.get("3"), Err(CoreError::NotFound(_))));

        // The ids are free again once saving works.
        p.set_fail_saves(false);
        store
            .extend(vec![Card::with_id("3", "e", "f")])
            .unwrap();
        assert_eq!(store.get_all()[2].id, "3");
        assert_eq!(store.get("3").unwrap().prompt, "e");
        assert_eq!(p.snapshot().len(), 3);
    }

    #[test]
    fn failed_save_during_reset_restores_review_fields() {
        let (p, mut store) = seeded();
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let patch = ReviewPatch {
            last_reviewed_at: Some(t),
            next_review_at: Some(t + chrono::Duration::hours(16)),
            correct_streak: 2,
        };
        store.update("2", patch).unwrap();

        p.set_fail_saves(true);
        assert!(matches!(store.reset(), Err(CoreError::Storage(_))));
        assert_eq!(store.get("2").unwrap().review_state(), patch);
        assert_eq!(store.get("1").unwrap().review_state(), ReviewPatch::unreviewed());

        p.set_fail_saves(false);
        store.reset().unwrap();
        assert_eq!(store.get("2").unwrap().review_state(), ReviewPatch::unreviewed());
        assert_eq!(p.snapshot()[1].correct_streak, 0);
    }

    #[test]
    fn insert_starts_in_seed_state() {
        let (_, mut store) = seeded();
        let mut c = Card::with_id("3", "e", "f");
        c.correct_streak = 9;
        store.insert(c).unwrap();
        let c = store.get("3").unwrap();
        assert_eq!(c.correct_streak, 0);
        assert!(c.next_review_at.is_none());
    }
}
