//! Bag randomizer: two of each shape, drawn without replacement.

use crate::shapes::ShapeKind;
use rand::Rng;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

/// Copies of each shape put in the bag on refill.
pub const COPIES_PER_SHAPE: usize = 2;

/// Shapes handed out between two refills.
pub const BAG_SIZE: usize = COPIES_PER_SHAPE * ShapeKind::ALL.len();

/// Shuffled supply of shapes. Refills only once it runs dry.
#[derive(Debug, Clone)]
pub struct Bag {
    contents: Vec<ShapeKind>,
    rng: ChaCha8Rng,
}

impl Bag {
    /// Empty bag; the first `draw` fills it.
    pub fn new(seed: u64) -> Self {
        Self {
            contents: Vec::with_capacity(BAG_SIZE),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Replace the contents with two of each shape. Anything left over is dropped.
    pub fn refill(&mut self) {
        self.contents.clear();
        for _ in 0..COPIES_PER_SHAPE {
            self.contents.extend(ShapeKind::ALL);
        }
        tracing::trace!(size = self.contents.len(), "bag refilled");
    }

    /// Remove and return a uniformly chosen shape.
    pub fn draw(&mut self) -> ShapeKind {
        if self.contents.is_empty() {
            self.refill();
        }
        let i = self.rng.random_range(0..self.contents.len());
        // Bag order is not observable.
        self.contents.swap_remove(i)
    }

    /// Shapes left before the next refill.
    pub fn remaining(&self) -> usize {
        self.contents.len()
    }
}
