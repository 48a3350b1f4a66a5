use crate::{Card, Difficulty};
use serde::{Deserialize, Serialize};

pub fn filter_by_text(cards: &[Card], query: &str) -> Vec<Card> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return cards.to_vec();
    }
    cards
        .iter()
        .filter(|c| {
            c.prompt.to_lowercase().contains(&q)
                || c.answer.to_lowercase().contains(&q)
                || c.tags.category.to_lowercase().contains(&q)
                || c.tags
                    .source
                    .as_ref()
                    .map(|s| s.to_lowercase().contains(&q))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}

pub fn filter_by_category(cards: &[Card], category: &str) -> Vec<Card> {
    let q = category.trim();
    cards
        .iter()
        .filter(|c| c.tags.category.eq_ignore_ascii_case(q))
        .cloned()
        .collect()
}

pub fn filter_by_difficulty(cards: &[Card], difficulty: Difficulty) -> Vec<Card> {
    cards
        .iter()
        .filter(|c| c.tags.difficulty == difficulty)
        .cloned()
        .collect()
}

/// Tag constraints applied before due-set selection. Empty matches all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl CardFilter {
    pub fn matches(&self, card: &Card) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map(|c| card.tags.category.eq_ignore_ascii_case(c.trim()))
            .unwrap_or(true);
        let difficulty_ok = self.difficulty.map(|d| card.tags.difficulty == d).unwrap_or(true);
        category_ok && difficulty_ok
    }

    pub fn apply(&self, cards: &[Card]) -> Vec<Card> {
        cards.iter().filter(|c| self.matches(c)).cloned().collect()
    }
}
