//! Hash-code index over the repository's dense text storage.
//!
//! Invariant: the union of all buckets is exactly the set of occupied storage
//! indices, each index appearing once, in the bucket of its text's hash code.

use smallvec::SmallVec;
use std::collections::HashMap;

type Bucket = SmallVec<[usize; 2]>;

#[derive(Debug, Default)]
pub(crate) struct HashIndex {
    buckets: HashMap<i32, Bucket>,
    len: usize,
}

impl HashIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: HashMap::with_capacity(capacity),
            len: 0,
        }
    }

    /// Storage indices whose text shares `hash`, in insertion order.
    pub(crate) fn candidates(&self, hash: i32) -> &[usize] {
        self.buckets
            .get(&hash)
            .map(|bucket| bucket.as_slice())
            .unwrap_or(&[])
    }

    /// Append `index` to the collision list for `hash`.
    pub(crate) fn insert(&mut self, hash: i32, index: usize) {
        self.buckets.entry(hash).or_default().push(index);
        self.len += 1;
    }

    /// Drop `index` from the bucket for `hash`, deleting the bucket when it
    /// becomes empty. Returns `false` if the index was not present.
    pub(crate) fn remove(&mut self, hash: i32, index: usize) -> bool {
        let Some(bucket) = self.buckets.get_mut(&hash) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|&i| i == index) else {
            return false;
        };
        if bucket.len() == 1 {
            self.buckets.remove(&hash);
        } else {
            bucket.remove(pos);
        }
        self.len -= 1;
        true
    }

    /// Renumber after the storage slot `removed` was vacated: every index
    /// greater than it moves down by one, across all buckets.
    pub(crate) fn shift_down_after(&mut self, removed: usize) {
        debug_assert!(removed <= self.len, "slot {removed} past {} indexed", self.len);
        for bucket in self.buckets.values_mut() {
            for index in bucket.iter_mut() {
                if *index > removed {
                    *index -= 1;
                }
            }
        }
    }

    /// Total number of indexed storage slots.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (i32, &[usize])> + '_ {
        self.buckets
            .iter()
            .map(|(hash, bucket)| (*hash, bucket.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::HashIndex;

    #[test]
    fn collisions_share_a_bucket_in_insertion_order() {
        let mut index = HashIndex::default();
        index.insert(7, 0);
        index.insert(7, 3);
        index.insert(9, 1);
        assert_eq!(index.candidates(7), &[0, 3]);
        assert_eq!(index.candidates(9), &[1]);
        assert!(index.candidates(42).is_empty());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn removing_last_occupant_drops_bucket() {
        let mut index = HashIndex::default();
        index.insert(5, 0);
        assert!(index.remove(5, 0));
        assert!(index.candidates(5).is_empty());
        assert_eq!(index.iter().count(), 0);
        assert!(!index.remove(5, 0));
    }

    #[test]
    fn removing_from_collision_list_keeps_other_entries() {
        let mut index = HashIndex::default();
        index.insert(5, 0);
        index.insert(5, 1);
        index.insert(5, 2);
        assert!(index.remove(5, 1));
        assert_eq!(index.candidates(5), &[0, 2]);
        assert!(!index.remove(5, 7));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn shift_down_renumbers_every_bucket() {
        let mut index = HashIndex::default();
        index.insert(1, 0);
        index.insert(2, 2);
        index.insert(3, 3);
        index.insert(2, 4);
        index.remove(9, 1);
        index.shift_down_after(1);
        assert_eq!(index.candidates(1), &[0]);
        assert_eq!(index.candidates(2), &[1, 3]);
        assert_eq!(index.candidates(3), &[2]);
    }
}
