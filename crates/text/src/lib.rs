//! Interning of recurring markup texts.
//!
//! Parsers hand the repository slices of their input buffer (element names,
//! attribute names, whitespace runs) and get back a shared `Arc<str>`. Equal
//! content always resolves to the instance already stored, so long-lived
//! template models share one allocation per distinct fragment.

pub mod config;
pub mod hash;
pub mod names;

mod index;
mod limited;
mod no_cache;
mod repositories;

use std::ops::Range;
use std::sync::Arc;

pub trait TextRepository: Send + Sync {
    /// Stored instance equal to `text`, storing it first on a miss.
    fn intern(&self, text: &str) -> Arc<str>;

    /// Intern the sub-slice `span` of `buffer`. `span` is a byte range on
    /// char boundaries.
    fn intern_slice(&self, buffer: &str, span: Range<usize>) -> Arc<str> {
        debug_assert!(
            buffer.is_char_boundary(span.start) && buffer.is_char_boundary(span.end),
            "span {span:?} not on char boundaries"
        );
        self.intern(&buffer[span])
    }

    /// Intern the concatenation of `parts`.
    fn intern_parts(&self, parts: &[&str]) -> Arc<str> {
        self.intern(&parts.concat())
    }

    fn intern_opt(&self, text: Option<&str>) -> Option<Arc<str>> {
        text.map(|text| self.intern(text))
    }
}

impl<R: TextRepository + ?Sized> TextRepository for &R {
    fn intern(&self, text: &str) -> Arc<str> {
        (**self).intern(text)
    }

    fn intern_slice(&self, buffer: &str, span: Range<usize>) -> Arc<str> {
        (**self).intern_slice(buffer, span)
    }

    fn intern_parts(&self, parts: &[&str]) -> Arc<str> {
        (**self).intern_parts(parts)
    }
}

impl<R: TextRepository + ?Sized> TextRepository for Arc<R> {
    fn intern(&self, text: &str) -> Arc<str> {
        (**self).intern(text)
    }

    fn intern_slice(&self, buffer: &str, span: Range<usize>) -> Arc<str> {
        (**self).intern_slice(buffer, span)
    }

    fn intern_parts(&self, parts: &[&str]) -> Arc<str> {
        (**self).intern_parts(parts)
    }
}

pub use crate::config::TextRepositoryConfig;
pub use crate::hash::{text_hash, text_hash_parts, text_len};
pub use crate::limited::{LimitedSizeCacheTextRepository, RepositoryStats};
pub use crate::no_cache::NoCacheTextRepository;
pub use crate::repositories::TextRepositories;
