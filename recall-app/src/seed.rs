use anyhow::{Context, Result};
use recall_core::{Card, CardStore, Persistence};
use tracing::info;

const SEED_JSON: &str = include_str!("../seed/cards.json");

pub fn seed_cards() -> Result<Vec<Card>> {
    serde_json::from_str(SEED_JSON).context("built-in seed deck is malformed")
}

/// Fills an empty store with the built-in deck. Returns how many were added.
pub fn ensure_seeded<P: Persistence>(store: &mut CardStore<P>) -> Result<usize> {
    if !store.is_empty() {
        return Ok(0);
    }
    let cards = seed_cards()?;
    let n = cards.len();
    store.extend(cards)?;
    info!(cards = n, "seeded card store");
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::MemoryPersistence;
    use std::collections::HashSet;

    #[test]
    fn seed_deck_parses_with_unique_ids() {
        let cards = seed_cards().unwrap();
        assert!(!cards.is_empty());
        let ids: HashSet<_> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), cards.len());
        assert!(cards.iter().all(|c| c.next_review_at.is_none() && c.correct_streak == 0));
    }

    #[test]
    fn seeding_only_fills_empty_store() {
        let mut store = CardStore::open(MemoryPersistence::new()).unwrap();
        let n = ensure_seeded(&mut store).unwrap();
        assert_eq!(n, store.len());
        assert_eq!(ensure_seeded(&mut store).unwrap(), 0);
    }
}
