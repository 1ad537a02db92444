use crate::TextRepository;
use std::sync::Arc;

/// Repository that never caches: every call yields a fresh `Arc<str>`.
///
/// Useful when memory must not be retained across parses, or to measure the
/// effect of interning.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCacheTextRepository;

impl NoCacheTextRepository {
    pub fn new() -> Self {
        Self
    }
}

impl TextRepository for NoCacheTextRepository {
    fn intern(&self, text: &str) -> Arc<str> {
        Arc::from(text)
    }
}
