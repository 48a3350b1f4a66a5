use crate::{Card, CoreError};
use std::sync::Arc;

pub mod memory;

pub use memory::MemoryPersistence;

/// Durable home for the card collection, written as one blob.
pub trait Persistence {
    fn load(&self) -> Result<Vec<Card>, CoreError>;
    fn save(&self, cards: &[Card]) -> Result<(), CoreError>;
}

impl<P: Persistence + ?Sized> Persistence for Arc<P> {
    fn load(&self) -> Result<Vec<Card>, CoreError> {
        (**self).load()
    }

    fn save(&self, cards: &[Card]) -> Result<(), CoreError> {
        (**self).save(cards)
    }
}

impl<P: Persistence + ?Sized> Persistence for Box<P> {
    fn load(&self) -> Result<Vec<Card>, CoreError> {
        (**self).load()
    }

    fn save(&self, cards: &[Card]) -> Result<(), CoreError> {
        (**self).save(cards)
    }
}
