//! RNG module - seedable piece selection
//!
//! The session draws every new piece from a [`PieceSource`]. Three sources
//! are provided:
//!
//! - [`UniformSource`]: each kind equally likely on every draw
//! - [`BagSource`]: the "7-bag" randomizer; each bag holds one of each kind, shuffled
//! - [`ScriptedSource`]: replays a fixed sequence, for tests and replays
//!
//! Randomness comes from a small LCG so a seed fully determines the sequence.

use crate::types::PieceKind;

/// Supplies the kind of each newly spawned piece
pub trait PieceSource {
    fn next_kind(&mut self) -> PieceKind;
}

impl<S: PieceSource + ?Sized> PieceSource for Box<S> {
    fn next_kind(&mut self) -> PieceKind {
        (**self).next_kind()
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Current internal state (reseeding with it continues the sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Uniform choice over all seven kinds
#[derive(Debug, Clone)]
pub struct UniformSource {
    rng: SimpleRng,
}

impl UniformSource {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }
}

impl PieceSource for UniformSource {
    fn next_kind(&mut self) -> PieceKind {
        let idx = self.rng.next_range(PieceKind::ALL.len() as u32) as usize;
        PieceKind::ALL[idx]
    }
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct BagSource {
    /// Current bag of pieces
    bag: [PieceKind; 7],
    /// Index into current bag
    bag_index: usize,
    /// RNG for shuffling
    rng: SimpleRng,
}

impl BagSource {
    /// Create a new bag source with the given seed
    pub fn new(seed: u32) -> Self {
        let mut source = Self {
            bag: PieceKind::ALL,
            bag_index: 0,
            rng: SimpleRng::new(seed),
        };
        source.refill_bag();
        source
    }

    /// Generate a new shuffled bag
    fn refill_bag(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// Peek at the next piece without drawing it
    pub fn peek(&self) -> PieceKind {
        if let Some(&kind) = self.bag.get(self.bag_index) {
            return kind;
        }

        // Preview the next bag on a copy of the RNG so the following draw
        // produces the same shuffle.
        let mut preview_rng = self.rng.clone();
        let mut next_bag = PieceKind::ALL;
        preview_rng.shuffle(&mut next_bag);
        next_bag[0]
    }

    /// Pieces still waiting in the current bag
    pub fn remaining(&self) -> &[PieceKind] {
        &self.bag[self.bag_index.min(self.bag.len())..]
    }
}

impl PieceSource for BagSource {
    fn next_kind(&mut self) -> PieceKind {
        if self.bag_index >= self.bag.len() {
            self.refill_bag();
        }

        let piece = self.bag[self.bag_index];
        self.bag_index += 1;
        piece
    }
}

/// Replays a fixed sequence of kinds, cycling when it runs out
///
/// An empty script yields `I` forever.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    kinds: Vec<PieceKind>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(kinds: impl Into<Vec<PieceKind>>) -> Self {
        Self {
            kinds: kinds.into(),
            next: 0,
        }
    }
}

impl PieceSource for ScriptedSource {
    fn next_kind(&mut self) -> PieceKind {
        if self.kinds.is_empty() {
            return PieceKind::I;
        }
        let kind = self.kinds[self.next % self.kinds.len()];
        self.next = (self.next + 1) % self.kinds.len();
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);
        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_next_range_stays_in_range() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_range(7) < 7);
        }
    }

    #[test]
    fn test_uniform_source_reproducible_and_covers_all_kinds() {
        let mut a = UniformSource::new(99);
        let mut b = UniformSource::new(99);
        let mut seen = [false; 7];
        for _ in 0..200 {
            let kind = a.next_kind();
            assert_eq!(kind, b.next_kind());
            seen[kind.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_bag_draws_all_seven() {
        let mut source = BagSource::new(1);
        assert_eq!(source.remaining().len(), 7);

        let mut drawn: Vec<PieceKind> = (0..7).map(|_| source.next_kind()).collect();
        drawn.sort();
        assert_eq!(drawn, PieceKind::ALL.to_vec());
        assert!(source.remaining().is_empty());
    }

    #[test]
    fn test_bag_peek_matches_draw_across_refill() {
        let mut source = BagSource::new(1);
        for _ in 0..7 {
            let peeked = source.peek();
            assert_eq!(peeked, source.next_kind());
        }

        // Bag exhausted; peek previews the next bag
        let peeked = source.peek();
        assert_eq!(peeked, source.next_kind());
    }

    #[test]
    fn test_scripted_source_cycles() {
        let mut source = ScriptedSource::new([PieceKind::O, PieceKind::I]);
        assert_eq!(source.next_kind(), PieceKind::O);
        assert_eq!(source.next_kind(), PieceKind::I);
        assert_eq!(source.next_kind(), PieceKind::O);

        let mut empty = ScriptedSource::new(Vec::new());
        assert_eq!(empty.next_kind(), PieceKind::I);
    }
}
