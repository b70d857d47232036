//! Per-table salt generator.
//!
//! Each map owns its generator, so two maps never influence each other's salts
//! and a fixed seed makes placement reproducible.

#[derive(Debug, Clone)]
pub(crate) struct SaltSource {
    rng: fastrand::Rng,
}

impl SaltSource {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { rng }
    }

    #[inline]
    pub(crate) fn next_salt(&mut self) -> u32 {
        self.rng.u32(..)
    }

    /// Salts for the three table roles.
    pub(crate) fn triple(&mut self) -> [u32; 3] {
        [self.next_salt(), self.next_salt(), self.next_salt()]
    }
}
