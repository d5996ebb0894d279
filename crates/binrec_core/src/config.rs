//! Record type configuration.

/// Default upper bound on an encoded record, version tag included.
pub const DEFAULT_MAX_RECORD_WIDTH: usize = 4096;

/// Options applied when a record type is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Keep every historical schema after definition instead of
    /// reconstructing it on each decode.
    pub precompute_history: bool,

    /// Largest encoded width any version of the type may have.
    pub max_record_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precompute_history: true,
            max_record_width: DEFAULT_MAX_RECORD_WIDTH,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether historical schemas are cached.
    #[must_use]
    pub const fn precompute_history(mut self, value: bool) -> Self {
        self.precompute_history = value;
        self
    }

    /// Sets the maximum encoded width.
    #[must_use]
    pub const fn max_record_width(mut self, width: usize) -> Self {
        self.max_record_width = width;
        self
    }
}
