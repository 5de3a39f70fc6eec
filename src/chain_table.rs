//! ChainTable: structural layer owning the bucket array, the entry arena,
//! the dual-chain links, and the grow/shrink/rehash policy.
//!
//! Every stored pair lives in one arena slot and is threaded onto two
//! singly-linked chains: the left chain of the bucket selected by its left
//! hash, and the right chain of the bucket selected by its right hash. The
//! two memberships are structurally independent (two heads per bucket, two
//! forward links per entry), so a pair is always reachable from either side
//! and an empty chain is an ordinary `None` head.
//!
//! This layer never runs caller code: hashes are computed by the layer above
//! and cached per entry, and matching is done through closures evaluated
//! only while the links are consistent.

use slotmap::{DefaultKey, SlotMap};

pub(crate) type EntryKey = DefaultKey;

/// The table never shrinks at or below this many buckets.
const SHRINK_FLOOR: usize = 10;

/// One stored association with its cached hash codes and chain links.
#[derive(Debug)]
pub(crate) struct PairEntry<L, R> {
    pub(crate) left: L,
    pub(crate) right: R,
    pub(crate) left_hash: u64,
    pub(crate) right_hash: u64,
    next_left: Option<EntryKey>,
    next_right: Option<EntryKey>,
}

/// A bucket holds one chain head per side.
#[derive(Clone, Copy, Default, Debug)]
struct Bucket {
    left: Option<EntryKey>,
    right: Option<EntryKey>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Bucket {
    fn head(&self, side: Side) -> Option<EntryKey> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn head_mut(&mut self, side: Side) -> &mut Option<EntryKey> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

impl<L, R> PairEntry<L, R> {
    fn hash(&self, side: Side) -> u64 {
        match side {
            Side::Left => self.left_hash,
            Side::Right => self.right_hash,
        }
    }

    fn next(&self, side: Side) -> Option<EntryKey> {
        match side {
            Side::Left => self.next_left,
            Side::Right => self.next_right,
        }
    }

    fn next_mut(&mut self, side: Side) -> &mut Option<EntryKey> {
        match side {
            Side::Left => &mut self.next_left,
            Side::Right => &mut self.next_right,
        }
    }
}

pub(crate) struct ChainTable<L, R> {
    table: Vec<Bucket>,
    slots: SlotMap<EntryKey, PairEntry<L, R>>,
    /// Count of stored values: two per live pair.
    element_ct: usize,
    load_factor: f32,
}

impl<L, R> ChainTable<L, R> {
    pub(crate) fn new(start_len: usize, load_factor: f32) -> Self {
        assert!(start_len > 0, "bucket count must be nonzero");
        assert!(
            load_factor > 0.0 && load_factor.is_finite(),
            "load factor must be positive and finite"
        );
        Self {
            table: vec![Bucket::default(); start_len],
            slots: SlotMap::with_key(),
            element_ct: 0,
            load_factor,
        }
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn pair_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn element_count(&self) -> usize {
        self.element_ct
    }

    fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.table.len() as u64) as usize
    }

    pub(crate) fn entry(&self, key: EntryKey) -> &PairEntry<L, R> {
        &self.slots[key]
    }

    /// Walk one side's chain in the bucket selected by `hash`, returning the
    /// first entry accepted by `matches`.
    pub(crate) fn find(
        &self,
        side: Side,
        hash: u64,
        mut matches: impl FnMut(&PairEntry<L, R>) -> bool,
    ) -> Option<EntryKey> {
        let mut cursor = self.table[self.bucket_index(hash)].head(side);
        while let Some(key) = cursor {
            let entry = &self.slots[key];
            if matches(entry) {
                return Some(key);
            }
            cursor = entry.next(side);
        }
        None
    }

    /// Grow the table when placing one more pair would push the load ratio
    /// past the threshold. Runs before duplicate detection, so an insertion
    /// that turns out to be an update may still grow the table.
    pub(crate) fn reserve_for_pair(&mut self) {
        let projected = (self.element_ct + 2) as f32 / self.table.len() as f32;
        if projected > self.load_factor {
            let doubled = self.table.len() * 2;
            self.rebuild(doubled);
        }
    }

    /// Shrink after a removal when the halved table would still sit under
    /// the load threshold. Suppressed at or below the floor.
    fn shrink_after_removal(&mut self) {
        let len = self.table.len();
        if len <= SHRINK_FLOOR {
            return;
        }
        let halved = len / 2;
        if (self.element_ct as f32) / (halved as f32) < self.load_factor {
            self.rebuild(halved);
        }
    }

    /// Migrate every entry into a fresh bucket array of `new_len`. Bucket
    /// indices come from the cached hashes, so no caller code runs here.
    /// Each entry is visited exactly once; the element count is untouched.
    fn rebuild(&mut self, new_len: usize) {
        let mut table = vec![Bucket::default(); new_len];
        for (key, entry) in self.slots.iter_mut() {
            let idx = (entry.left_hash % new_len as u64) as usize;
            entry.next_left = table[idx].left.replace(key);
            let idx = (entry.right_hash % new_len as u64) as usize;
            entry.next_right = table[idx].right.replace(key);
        }
        self.table = table;
    }

    /// Place a fresh pair: one arena slot, linked into both chains.
    pub(crate) fn insert(&mut self, left: L, right: R, left_hash: u64, right_hash: u64) -> EntryKey {
        let key = self.slots.insert(PairEntry {
            left,
            right,
            left_hash,
            right_hash,
            next_left: None,
            next_right: None,
        });
        self.link(key);
        self.element_ct += 2;
        key
    }

    /// Replace an entry's pair in place: unlink, swap in the new values and
    /// cached hashes, relink against the new hashes. The element count is
    /// untouched. Returns the displaced values.
    pub(crate) fn replace(
        &mut self,
        key: EntryKey,
        left: L,
        right: R,
        left_hash: u64,
        right_hash: u64,
    ) -> (L, R) {
        self.unlink(key);
        let entry = &mut self.slots[key];
        let old_left = core::mem::replace(&mut entry.left, left);
        let old_right = core::mem::replace(&mut entry.right, right);
        entry.left_hash = left_hash;
        entry.right_hash = right_hash;
        self.link(key);
        (old_left, old_right)
    }

    /// Unlink and free an entry, returning its values. `shrink` selects
    /// whether the shrink policy runs afterwards; displacement during an
    /// insertion passes `false`, removal proper passes `true`.
    pub(crate) fn remove(&mut self, key: EntryKey, shrink: bool) -> (L, R) {
        self.unlink(key);
        let entry = self.slots.remove(key).expect("unlinked entry must be live");
        self.element_ct -= 2;
        if shrink {
            self.shrink_after_removal();
        }
        (entry.left, entry.right)
    }

    /// Thread an entry onto the left chain of its left bucket and the right
    /// chain of its right bucket. Prepending keeps placement O(1); chain
    /// order is not observable.
    fn link(&mut self, key: EntryKey) {
        let (left_hash, right_hash) = {
            let entry = &self.slots[key];
            (entry.left_hash, entry.right_hash)
        };
        let idx = self.bucket_index(left_hash);
        let prev = self.table[idx].left.replace(key);
        self.slots[key].next_left = prev;
        let idx = self.bucket_index(right_hash);
        let prev = self.table[idx].right.replace(key);
        self.slots[key].next_right = prev;
    }

    /// Splice an entry out of both chains. Membership is independent, so
    /// each side is spliced on its own.
    fn unlink(&mut self, key: EntryKey) {
        self.splice(Side::Left, key);
        self.splice(Side::Right, key);
    }

    /// Single-pass predecessor-tracked splice of `key` out of one side's
    /// chain.
    fn splice(&mut self, side: Side, key: EntryKey) {
        let idx = self.bucket_index(self.slots[key].hash(side));
        let next = self.slots[key].next_mut(side).take();

        let head = self.table[idx].head(side);
        if head == Some(key) {
            *self.table[idx].head_mut(side) = next;
            return;
        }
        let mut pred = head.expect("entry to splice must be on its chain");
        loop {
            let pred_next = self.slots[pred].next(side);
            if pred_next == Some(key) {
                *self.slots[pred].next_mut(side) = next;
                return;
            }
            pred = pred_next.expect("entry to splice must be on its chain");
        }
    }

    /// Test-only audit of the structural invariants: element count parity,
    /// chain keys live and placed in the right bucket, no duplicate chain
    /// membership, and every live entry reachable from both of its chains.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        use std::collections::HashSet;

        assert_eq!(self.element_ct, 2 * self.slots.len());

        let mut seen_left = HashSet::new();
        let mut seen_right = HashSet::new();
        for (idx, bucket) in self.table.iter().enumerate() {
            let mut cursor = bucket.left;
            while let Some(key) = cursor {
                let entry = self.slots.get(key).expect("left chain key must be live");
                assert_eq!(self.bucket_index(entry.left_hash), idx);
                assert!(seen_left.insert(key), "duplicate left chain membership");
                cursor = entry.next_left;
            }
            let mut cursor = bucket.right;
            while let Some(key) = cursor {
                let entry = self.slots.get(key).expect("right chain key must be live");
                assert_eq!(self.bucket_index(entry.right_hash), idx);
                assert!(seen_right.insert(key), "duplicate right chain membership");
                cursor = entry.next_right;
            }
        }
        assert_eq!(seen_left.len(), self.slots.len());
        assert_eq!(seen_right.len(), self.slots.len());
    }
}
