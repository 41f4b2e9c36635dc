/* Canonical sets of NFA states. A set is stored as a fixed-length bit vector indexed by the NFA
 * state id, so two sets drawn from the same NFA are equal exactly when their bits are equal. */

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

/// A set of NFA states stored together with its hash, so looking the set up in the DFA's reverse
/// index does not rehash the whole bit vector each time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "BitVec<u8>", into = "BitVec<u8>")]
pub struct StateSet {
    bv: BitVec<u8>,
    hash: u64,
}

impl StateSet {
    /// Wrap a bit vector, computing its hash once.
    pub fn new(bv: BitVec<u8>) -> Self {
        let mut hasher = DefaultHasher::new();
        bv.hash(&mut hasher);
        let hash = hasher.finish();
        Self { bv, hash }
    }

    /// The empty set over `capacity` state ids.
    pub fn empty(capacity: usize) -> Self {
        Self::new(BitVec::repeat(false, capacity))
    }

    /// Build a set over `capacity` state ids. Ids past the capacity are ignored, the NFA model
    /// never hands those out.
    pub fn from_ids<I: IntoIterator<Item = usize>>(capacity: usize, ids: I) -> Self {
        let mut bv: BitVec<u8> = BitVec::repeat(false, capacity);
        for id in ids {
            if id < capacity {
                bv.set(id, true);
            }
        }
        Self::new(bv)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.bv.get(id).map(|bit| *bit).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.bv.not_any()
    }

    pub fn len(&self) -> usize {
        self.bv.count_ones()
    }

    /// Number of ids the set can hold
    pub fn capacity(&self) -> usize {
        self.bv.len()
    }

    /// State ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bv.iter_ones()
    }

    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.iter().all(|id| other.contains(id))
    }

    /// True if any member of the set is also set in `states`
    pub fn intersects(&self, states: &BitSlice<u8>) -> bool {
        self.iter()
            .any(|id| states.get(id).map(|bit| *bit).unwrap_or(false))
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8> {
        &self.bv
    }
}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.bv == other.bv
    }
}

impl Eq for StateSet {}

impl From<BitVec<u8>> for StateSet {
    fn from(bv: BitVec<u8>) -> Self {
        StateSet::new(bv)
    }
}

impl From<StateSet> for BitVec<u8> {
    fn from(set: StateSet) -> Self {
        set.bv
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (position, id) in self.iter().enumerate() {
            if position > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod state_set_tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_equal_sets_built_in_different_orders() {
        let first = StateSet::from_ids(6, vec![4, 1, 2, 1]);
        let second = StateSet::from_ids(6, vec![1, 2, 4]);

        assert_eq!(first, second);
        assert_eq!(first.iter().collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_reverse_index_lookup() {
        let mut index: HashMap<StateSet, usize> = HashMap::new();
        index.insert(StateSet::from_ids(4, vec![0, 3]), 7);

        assert_eq!(index.get(&StateSet::from_ids(4, vec![3, 0])), Some(&7));
        assert_eq!(index.get(&StateSet::from_ids(4, vec![3])), None);
    }

    #[test]
    fn test_empty_set() {
        let set = StateSet::empty(5);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.capacity(), 5);
        assert_eq!(set.to_string(), "{}");
    }

    #[test]
    fn test_display_and_membership() {
        let set = StateSet::from_ids(4, vec![3, 1, 2]);
        assert_eq!(set.to_string(), "{1,2,3}");
        assert!(set.contains(2));
        assert!(!set.contains(0));
        assert!(!set.contains(42));
    }

    #[test]
    fn test_subset_and_intersection() {
        let small = StateSet::from_ids(5, vec![1]);
        let large = StateSet::from_ids(5, vec![1, 4]);

        assert!(small.is_subset(&large));
        assert!(!large.is_subset(&small));

        let mut accepting: BitVec<u8> = BitVec::repeat(false, 5);
        accepting.set(4, true);
        assert!(large.intersects(&accepting));
        assert!(!small.intersects(&accepting));
    }
}
