//! Text repository configuration.

/// Default repository budget: 2 MB of text storage.
pub const DEFAULT_MAX_SIZE_IN_BYTES: usize = 2_000_000;

/// Environment override for [`TextRepositoryConfig::max_size_in_bytes`].
pub const MAX_SIZE_IN_BYTES_ENV: &str = "WEFT_TEXT_REPOSITORY_MAX_BYTES";

// Stored text is accounted at 2 bytes per char.
const BYTES_PER_CHAR: usize = 2;

#[derive(Clone, Debug)]
pub struct TextRepositoryConfig {
    /// Upper bound for stored text, in bytes.
    pub max_size_in_bytes: usize,
    /// Cache texts at all. When false, every intern call returns a fresh copy.
    pub cache: bool,
    /// Seed the unremovable set with standard element/attribute names and
    /// common whitespace runs.
    pub use_standard_unremovable_texts: bool,
    /// Additional texts that must never be evicted.
    pub extra_unremovable_texts: Vec<String>,
}

impl Default for TextRepositoryConfig {
    fn default() -> Self {
        Self {
            max_size_in_bytes: DEFAULT_MAX_SIZE_IN_BYTES,
            cache: true,
            use_standard_unremovable_texts: true,
            extra_unremovable_texts: Vec::new(),
        }
    }
}

impl TextRepositoryConfig {
    pub fn max_size_in_chars(&self) -> usize {
        self.max_size_in_bytes / BYTES_PER_CHAR
    }

    /// Defaults, with the size budget taken from `WEFT_TEXT_REPOSITORY_MAX_BYTES`
    /// when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(MAX_SIZE_IN_BYTES_ENV) {
            config.apply_max_size_override(&raw);
        }
        config
    }

    /// Apply a textual size override; unparsable values keep the current size.
    pub fn apply_max_size_override(&mut self, raw: &str) {
        match raw.trim().parse::<usize>() {
            Ok(bytes) => self.max_size_in_bytes = bytes,
            Err(err) => log::warn!(
                target: "text.config",
                "ignoring {MAX_SIZE_IN_BYTES_ENV}={raw:?}: {err}"
            ),
        }
    }
}
