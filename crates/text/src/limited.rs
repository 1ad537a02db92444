//! Size-bounded, thread-safe text repository with first-in first-out eviction.

use crate::TextRepository;
use crate::hash::{parts_equal, text_hash, text_hash_parts, text_len};
use crate::index::HashIndex;
use parking_lot::RwLock;
use std::sync::Arc;

// Room for 1500 texts up front, growing 500 slots at a time.
const CONTENTS_INITIAL_LEN: usize = 1500;
const CONTENTS_LEN_INC: usize = 500;

/// Snapshot of a repository's occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepositoryStats {
    pub texts: usize,
    pub unremovable_texts: usize,
    pub size_in_chars: usize,
    pub max_size_in_chars: usize,
}

#[derive(Debug)]
struct Entry {
    text: Arc<str>,
    hash: i32,
    len: usize,
}

/// Storage behind the lock.
///
/// Invariants:
/// - `entries[..unremovable_len]` is never evicted.
/// - storage order is arrival order; reads never reorder it.
/// - `size_in_chars` is the sum of `len` over `entries`.
#[derive(Debug)]
struct Storage {
    entries: Vec<Entry>,
    index: HashIndex,
    size_in_chars: usize,
    unremovable_len: usize,
}

impl Storage {
    fn new() -> Self {
        Self {
            entries: Vec::with_capacity(CONTENTS_INITIAL_LEN),
            index: HashIndex::with_capacity(CONTENTS_INITIAL_LEN),
            size_in_chars: 0,
            unremovable_len: 0,
        }
    }

    fn find(&self, hash: i32, matches: impl Fn(&str) -> bool) -> Option<Arc<str>> {
        self.index
            .candidates(hash)
            .iter()
            .map(|&i| &self.entries[i].text)
            .find(|&candidate| matches(candidate))
            .cloned()
    }

    fn push(&mut self, text: Arc<str>, hash: i32, len: usize) {
        if self.entries.len() == self.entries.capacity() {
            self.entries.reserve_exact(CONTENTS_LEN_INC);
        }
        let index = self.entries.len();
        self.entries.push(Entry { text, hash, len });
        self.index.insert(hash, index);
        self.size_in_chars += len;
    }

    fn store(&mut self, text: Arc<str>, hash: i32, max_size_in_chars: usize) -> Arc<str> {
        let len = text_len(&text);
        while self.size_in_chars + len > max_size_in_chars && self.remove_oldest() {}
        if self.size_in_chars + len > max_size_in_chars {
            log::debug!(
                target: "text.repository",
                "text of {len} chars does not fit (size={} max={max_size_in_chars}); returning it uncached",
                self.size_in_chars
            );
            return text;
        }
        self.push(Arc::clone(&text), hash, len);
        text
    }

    fn remove_oldest(&mut self) -> bool {
        if self.unremovable_len == self.entries.len() {
            return false;
        }
        // The oldest removable text always sits right after the unremovable prefix.
        let removed_index = self.unremovable_len;
        let removed = self.entries.remove(removed_index);
        let found = self.index.remove(removed.hash, removed_index);
        debug_assert!(found, "evicted text missing from hash index");
        self.index.shift_down_after(removed_index);
        self.size_in_chars -= removed.len;
        log::trace!(
            target: "text.repository",
            "evicted {:?} ({} chars), size now {}",
            removed.text,
            removed.len,
            self.size_in_chars
        );
        true
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.entries.len(), "index/storage size mismatch");
        let mut seen = vec![false; self.entries.len()];
        for (hash, bucket) in self.index.iter() {
            for &i in bucket {
                assert!(i < self.entries.len(), "dangling index {i}");
                assert!(!seen[i], "index {i} appears twice");
                seen[i] = true;
                assert_eq!(self.entries[i].hash, hash, "index {i} in wrong bucket");
            }
        }
        let total: usize = self.entries.iter().map(|e| e.len).sum();
        assert_eq!(total, self.size_in_chars);
    }
}

/// Repository of interned texts bounded by a total size in chars.
///
/// Works like a global string intern table that accepts slices and fragment
/// lists directly, and that holds at most `max_size_in_chars` chars. When
/// full, the oldest texts are evicted in arrival order regardless of how
/// often they were read; texts given as unremovable at construction are never
/// evicted. A text that cannot fit even after evicting everything removable
/// is handed back without being stored.
///
/// Hits only take the shared lock. Misses release it, take the exclusive
/// lock and check again before storing, so concurrent misses on equal texts
/// converge on one stored instance. The lock is task-fair, keeping writers
/// from starving under read pressure.
#[derive(Debug)]
pub struct LimitedSizeCacheTextRepository {
    max_size_in_chars: usize,
    storage: RwLock<Storage>,
}

impl LimitedSizeCacheTextRepository {
    pub fn new<S: AsRef<str>>(max_size_in_chars: usize, unremovable_texts: &[S]) -> Self {
        let mut storage = Storage::new();
        for text in unremovable_texts {
            let text = text.as_ref();
            let hash = text_hash(text);
            if storage.find(hash, |candidate| candidate == text).is_some() {
                continue;
            }
            let len = text_len(text);
            if storage.size_in_chars + len > max_size_in_chars {
                log::warn!(
                    target: "text.repository",
                    "unremovable text {text:?} does not fit in {max_size_in_chars} chars; skipped"
                );
                continue;
            }
            storage.push(Arc::from(text), hash, len);
        }
        storage.unremovable_len = storage.entries.len();
        log::debug!(
            target: "text.repository",
            "created repository: max={max_size_in_chars} chars, {} unremovable texts ({} chars)",
            storage.unremovable_len,
            storage.size_in_chars
        );
        Self {
            max_size_in_chars,
            storage: RwLock::new(storage),
        }
    }

    pub fn max_size_in_chars(&self) -> usize {
        self.max_size_in_chars
    }

    pub fn stats(&self) -> RepositoryStats {
        let storage = self.storage.read();
        RepositoryStats {
            texts: storage.entries.len(),
            unremovable_texts: storage.unremovable_len,
            size_in_chars: storage.size_in_chars,
            max_size_in_chars: self.max_size_in_chars,
        }
    }

    pub fn len(&self) -> usize {
        self.storage.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a text equal to `text` is currently stored.
    pub fn contains(&self, text: &str) -> bool {
        self.storage
            .read()
            .find(text_hash(text), |candidate| candidate == text)
            .is_some()
    }

    /// Stored texts in storage (arrival) order.
    pub fn snapshot(&self) -> Vec<Arc<str>> {
        self.storage
            .read()
            .entries
            .iter()
            .map(|e| Arc::clone(&e.text))
            .collect()
    }

    /// Evict the oldest removable text. Returns `false` when only
    /// unremovable texts are left.
    pub fn remove_oldest(&self) -> bool {
        self.storage.write().remove_oldest()
    }

    fn lookup_or_store<M, F>(&self, hash: i32, matches: M, materialize: F) -> Arc<str>
    where
        M: Fn(&str) -> bool,
        F: FnOnce() -> Arc<str>,
    {
        {
            let storage = self.storage.read();
            if let Some(found) = storage.find(hash, &matches) {
                return found;
            }
        }

        let mut storage = self.storage.write();
        // Another writer may have stored the same text between our read unlock
        // and this write lock.
        if let Some(found) = storage.find(hash, &matches) {
            return found;
        }
        storage.store(materialize(), hash, self.max_size_in_chars)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.storage.read().assert_consistent();
    }
}

impl TextRepository for LimitedSizeCacheTextRepository {
    fn intern(&self, text: &str) -> Arc<str> {
        self.lookup_or_store(
            text_hash(text),
            |candidate| candidate == text,
            || Arc::from(text),
        )
    }

    fn intern_parts(&self, parts: &[&str]) -> Arc<str> {
        if let [single] = parts {
            return self.intern(single);
        }
        self.lookup_or_store(
            text_hash_parts(parts),
            |candidate| parts_equal(parts, candidate),
            || Arc::from(parts.concat()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    fn repo(max: usize) -> LimitedSizeCacheTextRepository {
        LimitedSizeCacheTextRepository::new(max, &[""])
    }

    #[test]
    fn equal_content_yields_same_instance() {
        let repo = repo(100);
        let a = String::from("class");
        let b = "cla".to_string() + "ss";
        let first = repo.intern(&a);
        let second = repo.intern(&b);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(repo.len(), 2);
        repo.assert_consistent();
    }

    #[test]
    fn slices_and_parts_resolve_to_stored_instance() {
        let repo = repo(100);
        let stored = repo.intern("href");
        let buffer = "<a href=\"x\">";
        let from_slice = repo.intern_slice(buffer, 3..7);
        let from_parts = repo.intern_parts(&["hr", "", "ef"]);
        assert!(Arc::ptr_eq(&stored, &from_slice));
        assert!(Arc::ptr_eq(&stored, &from_parts));
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn parts_miss_stores_concatenation() {
        let repo = repo(100);
        let joined = repo.intern_parts(&["data-", "th-", "text"]);
        assert_eq!(&*joined, "data-th-text");
        assert!(Arc::ptr_eq(&joined, &repo.intern("data-th-text")));
    }

    #[test]
    fn none_passes_through() {
        let repo = repo(10);
        assert!(repo.intern_opt(None).is_none());
        assert_eq!(repo.intern_opt(Some("ab")).as_deref(), Some("ab"));
    }

    #[test]
    fn scenario_ten_char_repository_evicts_oldest_first() {
        let repo = repo(10);
        repo.intern("abcde");
        repo.intern("fghij");
        assert_eq!(repo.stats().size_in_chars, 10);

        repo.intern("klmno");
        assert!(!repo.contains("abcde"));
        assert!(repo.contains("fghij"));
        assert!(repo.contains("klmno"));
        assert_eq!(repo.stats().size_in_chars, 10);

        // "abcde" was evicted, so this stores a new entry and pushes out "fghij".
        let again = repo.intern("abcde");
        assert_eq!(&*again, "abcde");
        assert!(repo.contains("abcde"));
        assert!(!repo.contains("fghij"));
        let texts: Vec<String> = repo.snapshot().iter().map(|t| t.to_string()).collect();
        assert_eq!(texts, ["", "klmno", "abcde"]);
        repo.assert_consistent();
    }

    #[test]
    fn oversized_text_is_returned_uncached() {
        let repo = LimitedSizeCacheTextRepository::new(8, &["div"]);
        repo.intern("ab");
        let big = repo.intern("0123456789");
        assert_eq!(&*big, "0123456789");
        assert!(!repo.contains("0123456789"));
        // Everything removable was evicted trying to make room.
        assert!(!repo.contains("ab"));
        assert!(repo.contains("div"));
        assert_eq!(repo.stats().size_in_chars, 3);
        let again = repo.intern("0123456789");
        assert!(!Arc::ptr_eq(&big, &again));
    }

    #[test]
    fn unremovable_texts_survive_pressure() {
        let repo = LimitedSizeCacheTextRepository::new(12, &["div", "span"]);
        for i in 0..200 {
            repo.intern(&format!("t{i:03}"));
        }
        assert!(repo.contains("div"));
        assert!(repo.contains("span"));
        while repo.remove_oldest() {}
        assert_eq!(repo.len(), 2);
        assert!(!repo.remove_oldest());
        repo.assert_consistent();
    }

    #[test]
    fn duplicate_unremovable_texts_are_stored_once() {
        let repo = LimitedSizeCacheTextRepository::new(100, &["a", "b", "a"]);
        let stats = repo.stats();
        assert_eq!(stats.texts, 2);
        assert_eq!(stats.unremovable_texts, 2);
        repo.intern("c");
        assert!(repo.remove_oldest());
        assert!(!repo.remove_oldest());
        assert!(repo.contains("a") && repo.contains("b"));
    }

    #[test]
    fn unremovable_texts_past_the_budget_are_skipped() {
        let repo = LimitedSizeCacheTextRepository::new(6, &["abcd", "efgh", "ij"]);
        let stats = repo.stats();
        assert_eq!(stats.unremovable_texts, 2);
        assert_eq!(stats.size_in_chars, 6);
        assert!(repo.contains("abcd") && repo.contains("ij"));
        assert!(!repo.contains("efgh"));
        repo.assert_consistent();
    }

    #[test]
    fn eviction_keeps_collision_buckets_consistent() {
        // "Aa" and "BB" share a hash code.
        assert_eq!(text_hash("Aa"), text_hash("BB"));
        let repo = LimitedSizeCacheTextRepository::new(6, &[] as &[&str]);
        let aa = repo.intern("Aa");
        let bb = repo.intern("BB");
        assert!(!Arc::ptr_eq(&aa, &bb));
        repo.intern("cc");
        repo.intern("dd");
        assert!(!repo.contains("Aa"));
        assert!(Arc::ptr_eq(&bb, &repo.intern("BB")));
        repo.assert_consistent();
    }

    #[test]
    fn storage_grows_past_initial_capacity() {
        let repo = LimitedSizeCacheTextRepository::new(1_000_000, &[] as &[&str]);
        let n = CONTENTS_INITIAL_LEN + CONTENTS_LEN_INC + 7;
        for i in 0..n {
            repo.intern(&i.to_string());
        }
        assert_eq!(repo.len(), n);
        assert!(repo.contains("0"));
        assert!(repo.contains(&(n - 1).to_string()));
        repo.assert_consistent();
    }

    #[test]
    fn concurrent_misses_converge_on_one_instance() {
        const THREADS: usize = 16;
        let repo = Arc::new(repo(1_000));
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let text = String::from("th:each");
                    barrier.wait();
                    repo.intern(&text)
                })
            })
            .collect();
        let results: Vec<Arc<str>> = handles
            .into_iter()
            .map(|h| h.join().expect("interning thread panicked"))
            .collect();
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(repo.len(), 2);
        repo.assert_consistent();
    }
}
