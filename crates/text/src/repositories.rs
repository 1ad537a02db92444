use crate::config::TextRepositoryConfig;
use crate::limited::LimitedSizeCacheTextRepository;
use crate::names::standard_unremovable_texts;
use crate::no_cache::NoCacheTextRepository;
use crate::TextRepository;
use std::sync::{Arc, LazyLock};

static DEFAULT_REPOSITORY: LazyLock<Arc<LimitedSizeCacheTextRepository>> =
    LazyLock::new(|| {
        let config = TextRepositoryConfig::from_env();
        Arc::new(TextRepositories::limited_size_cache(
            config.max_size_in_chars(),
            &standard_unremovable_texts(),
        ))
    });

/// Constructors for the repository flavours.
pub struct TextRepositories;

impl TextRepositories {
    pub fn limited_size_cache<S: AsRef<str>>(
        max_size_in_chars: usize,
        unremovable_texts: &[S],
    ) -> LimitedSizeCacheTextRepository {
        LimitedSizeCacheTextRepository::new(max_size_in_chars, unremovable_texts)
    }

    /// Process-wide repository sized from the environment
    /// (`WEFT_TEXT_REPOSITORY_MAX_BYTES`) and seeded with the standard
    /// markup names and whitespace runs. Every call returns the same instance.
    pub fn default_repository() -> Arc<LimitedSizeCacheTextRepository> {
        Arc::clone(&DEFAULT_REPOSITORY)
    }

    pub fn no_cache() -> NoCacheTextRepository {
        NoCacheTextRepository::new()
    }

    /// A new repository built from `config`.
    pub fn from_config(config: &TextRepositoryConfig) -> Arc<dyn TextRepository> {
        if !config.cache {
            log::debug!(target: "text.repository", "text caching disabled");
            return Arc::new(NoCacheTextRepository::new());
        }
        let mut unremovable = if config.use_standard_unremovable_texts {
            standard_unremovable_texts()
        } else {
            Vec::new()
        };
        unremovable.extend(config.extra_unremovable_texts.iter().cloned());
        Arc::new(LimitedSizeCacheTextRepository::new(
            config.max_size_in_chars(),
            &unremovable,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_repository_is_shared_and_seeded() {
        let a = TextRepositories::default_repository();
        let b = TextRepositories::default_repository();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.contains("div"));
        assert!(a.contains("\r\n\t\t\t"));
        let stats = a.stats();
        assert_eq!(stats.unremovable_texts, standard_unremovable_texts().len());
    }

    #[test]
    fn from_config_honours_cache_switch_and_extras() {
        let config = TextRepositoryConfig {
            max_size_in_bytes: 200,
            cache: true,
            use_standard_unremovable_texts: false,
            extra_unremovable_texts: vec!["th:block".to_string()],
        };
        let repo = TextRepositories::from_config(&config);
        let first = repo.intern("th:block");
        assert!(Arc::ptr_eq(&first, &repo.intern("th:block")));

        let uncached = TextRepositories::from_config(&TextRepositoryConfig {
            cache: false,
            ..TextRepositoryConfig::default()
        });
        assert!(!Arc::ptr_eq(&uncached.intern("p"), &uncached.intern("p")));
    }
}
