use super::model::DecoupledTemplateLogic;
use crate::error::MarkupError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Built decoupled logic, keyed by resource name.
///
/// Entries are immutable and shared. Building happens outside the lock; when
/// two callers build the same resource concurrently, the first one stored wins.
#[derive(Debug, Default)]
pub struct DecoupledLogicCache {
    entries: RwLock<HashMap<String, Arc<DecoupledTemplateLogic>>>,
}

impl DecoupledLogicCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource: &str) -> Option<Arc<DecoupledTemplateLogic>> {
        self.entries.read().get(resource).cloned()
    }

    pub fn get_or_build<F>(
        &self,
        resource: &str,
        build: F,
    ) -> Result<Arc<DecoupledTemplateLogic>, MarkupError>
    where
        F: FnOnce() -> Result<DecoupledTemplateLogic, MarkupError>,
    {
        if let Some(found) = self.get(resource) {
            return Ok(found);
        }
        let built = Arc::new(build()?);
        log::debug!(
            target: "markup.decoupled",
            "caching decoupled logic for {resource} ({} selectors)",
            built.selectors().len()
        );
        let mut entries = self.entries.write();
        Ok(Arc::clone(
            entries.entry(resource.to_string()).or_insert(built),
        ))
    }

    /// Drop the entry for `resource`. Returns whether one was present.
    pub fn invalidate(&self, resource: &str) -> bool {
        self.entries.write().remove(resource).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoupled::InjectedAttribute;
    use std::cell::Cell;

    fn logic() -> DecoupledTemplateLogic {
        let mut logic = DecoupledTemplateLogic::new();
        logic.add_injected_attribute("//p", InjectedAttribute::new("x", Some("1")));
        logic
    }

    #[test]
    fn builds_once_until_invalidated() {
        let cache = DecoupledLogicCache::new();
        let builds = Cell::new(0);
        let build = || {
            builds.set(builds.get() + 1);
            Ok(logic())
        };
        let first = cache.get_or_build("a.th.xml", build).expect("builds");
        let second = cache.get_or_build("a.th.xml", build).expect("cached");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.get(), 1);

        assert!(cache.invalidate("a.th.xml"));
        assert!(!cache.invalidate("a.th.xml"));
        cache.get_or_build("a.th.xml", build).expect("rebuilds");
        assert_eq!(builds.get(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn build_errors_are_not_cached() {
        let cache = DecoupledLogicCache::new();
        let err = cache.get_or_build("bad.th.xml", || {
            Err(MarkupError::Selector {
                selector: "a[".into(),
                message: "unclosed '['".into(),
            })
        });
        assert!(err.is_err());
        assert!(cache.get("bad.th.xml").is_none());
    }
}
