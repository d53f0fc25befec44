/// Handshake core configuration.
#[derive(Clone)]
pub struct Config {
    max_queued_records: usize,
    rng_seed: Option<u64>,
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            max_queued_records: 30,
            rng_seed: None,
        }
    }

    /// Max amount of future-epoch records to queue before discarding more input.
    #[inline(always)]
    pub fn max_queued_records(&self) -> usize {
        self.max_queued_records
    }

    /// Seed for non-cryptographic randomness.
    ///
    /// When set, handshake randoms are deterministic.
    #[inline(always)]
    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for handshake core configuration.
pub struct ConfigBuilder {
    max_queued_records: usize,
    rng_seed: Option<u64>,
}

impl ConfigBuilder {
    /// Set the max amount of future-epoch records to queue before
    /// discarding more input.
    ///
    /// Defaults to 30.
    pub fn max_queued_records(mut self, max: usize) -> Self {
        self.max_queued_records = max;
        self
    }

    /// Set a seed for non-cryptographic randomness.
    ///
    /// Defaults to unset, which uses the thread-local random generator.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        Config {
            max_queued_records: self.max_queued_records,
            rng_seed: self.rng_seed,
        }
    }
}
