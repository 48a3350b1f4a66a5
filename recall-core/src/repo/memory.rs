use crate::{Card, CoreError};
use parking_lot::RwLock;

/// In-memory persistence. Counts saves and can be switched to fail them.
#[derive(Default)]
pub struct MemoryPersistence {
    cards: RwLock<Vec<Card>>,
    saves: RwLock<usize>,
    fail_saves: RwLock<bool>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: RwLock::new(cards),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<Card> {
        self.cards.read().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.read()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.write() = fail;
    }
}

impl crate::repo::Persistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<Card>, CoreError> {
        Ok(self.cards.read().clone())
    }

    fn save(&self, cards: &[Card]) -> Result<(), CoreError> {
        if *self.fail_saves.read() {
            return Err(CoreError::Storage("memory save disabled".into()));
        }
        *self.cards.write() = cards.to_vec();
        *self.saves.write() += 1;
        Ok(())
    }
}
