//! Deterministic RNG plumbing
//!
//! All randomness in the engine flows through an injectable [`RngBundle`] so
//! that pair selection is reproducible from a single user-visible seed. Each
//! consumer gets its own stream, with stream seeds derived by domain-separated
//! HMAC so draws in one domain never shift another.

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

/// Deterministic bundle of RNG streams segregated by engine domain.
#[derive(Debug, Clone)]
pub struct RngBundle {
    pair: RefCell<CountingRng<SmallRng>>,
    fallback: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        let pair = CountingRng::new(derive_stream_seed(seed, b"pair"));
        let fallback = CountingRng::new(derive_stream_seed(seed, b"fallback"));
        Self {
            pair: RefCell::new(pair),
            fallback: RefCell::new(fallback),
        }
    }

    /// Stream used for constrained pair sampling.
    #[must_use]
    pub fn pair(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.pair.borrow_mut()
    }

    /// Stream used for the degraded unconstrained fallback pair.
    #[must_use]
    pub fn fallback(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.fallback.borrow_mut()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn same_seed_yields_identical_streams() {
        let a = RngBundle::from_user_seed(42);
        let b = RngBundle::from_user_seed(42);
        for _ in 0..8 {
            assert_eq!(a.pair().next_u64(), b.pair().next_u64());
        }
    }

    #[test]
    fn streams_are_domain_separated() {
        let bundle = RngBundle::from_user_seed(7);
        let from_pair: Vec<u64> = (0..4).map(|_| bundle.pair().next_u64()).collect();
        let fresh = RngBundle::from_user_seed(7);
        let from_fallback: Vec<u64> = (0..4).map(|_| fresh.fallback().next_u64()).collect();
        assert_ne!(from_pair, from_fallback);
    }

    #[test]
    fn draws_are_counted() {
        let bundle = RngBundle::from_user_seed(1);
        assert_eq!(bundle.pair().draws(), 0);
        let _ = bundle.pair().next_u32();
        let _ = bundle.pair().next_u64();
        assert_eq!(bundle.pair().draws(), 2);
        assert_eq!(bundle.fallback().draws(), 0);
    }
}
