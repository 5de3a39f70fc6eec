//! BiHashMap: public layer mapping per-side domains onto the structural
//! chain table.

use crate::chain_table::{ChainTable, EntryKey, Side};
use crate::domain::{Domain, Hashed};
use core::borrow::Borrow;

/// Default bucket count for [`BiHashMap::new`].
pub const DEFAULT_BUCKETS: usize = 10;
/// Default load-factor threshold for [`BiHashMap::new`].
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// What an insertion displaced.
///
/// Displaced values are always handed back by value. Dropping them releases
/// their storage; keeping them returns ownership to the caller. The map
/// never frees a superseded value behind the caller's back.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Overwritten<L, R> {
    /// Neither value was present; a fresh pair was stored.
    Neither,
    /// The left value was present; its previous pair is returned.
    Left(L, R),
    /// The right value was present; its previous pair is returned.
    Right(L, R),
    /// The exact pairing was present; the previous pair is returned.
    Pair(L, R),
    /// Both values were present, in two distinct pairs. The first tuple is
    /// the previous pair of the left value, the second that of the right
    /// value. Both pairs are displaced so each side's values stay unique.
    Both((L, R), (L, R)),
}

/// A bidirectional hash map: one stored pair is discoverable from either
/// side, with hashing and equality pluggable per side via [`Domain`].
///
/// All mutation goes through `&mut self`; the container holds no interior
/// mutability, so exclusive access is enforced by the borrow checker and
/// cross-thread sharing is the caller's affair (e.g. behind a `Mutex`).
pub struct BiHashMap<L, R, DL = Hashed, DR = Hashed> {
    table: ChainTable<L, R>,
    domain_left: DL,
    domain_right: DR,
}

impl<L, R> BiHashMap<L, R>
where
    L: core::hash::Hash + Eq,
    R: core::hash::Hash + Eq,
{
    /// Map with the standard `Hash + Eq` domain on both sides and the
    /// default sizing policy.
    pub fn new() -> Self {
        Self::with_domains(Hashed::new(), Hashed::new())
    }
}

impl<L, R> Default for BiHashMap<L, R>
where
    L: core::hash::Hash + Eq,
    R: core::hash::Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<L, R, DL, DR> BiHashMap<L, R, DL, DR>
where
    DL: Domain<L>,
    DR: Domain<R>,
{
    /// Custom domains with the default sizing policy.
    pub fn with_domains(domain_left: DL, domain_right: DR) -> Self {
        Self::with_parameters(domain_left, domain_right, DEFAULT_BUCKETS, DEFAULT_LOAD_FACTOR)
    }

    /// Full construction control: per-side domains, initial bucket count,
    /// and the load-factor threshold driving the doubling/halving policy.
    ///
    /// # Panics
    ///
    /// Panics when `start_len` is zero or `load_factor` is not a positive
    /// finite number.
    pub fn with_parameters(
        domain_left: DL,
        domain_right: DR,
        start_len: usize,
        load_factor: f32,
    ) -> Self {
        Self {
            table: ChainTable::new(start_len, load_factor),
            domain_left,
            domain_right,
        }
    }

    /// Number of live pairs.
    pub fn len(&self) -> usize {
        self.table.pair_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of stored values: exactly two per live pair.
    pub fn element_count(&self) -> usize {
        self.table.element_count()
    }

    /// Current bucket count: always the initial count times a power of two.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Associate `left` with `right`, displacing any pair that already
    /// claims either value.
    ///
    /// The growth policy runs first, then both sides are probed with their
    /// domains' equality. A match on one side updates that pair in place
    /// (the entry is relinked, so the new values are immediately reachable
    /// from both sides); matches on both sides in distinct pairs displace
    /// the right-matching pair entirely. See [`Overwritten`].
    pub fn insert(&mut self, left: L, right: R) -> Overwritten<L, R> {
        self.table.reserve_for_pair();
        let left_hash = self.domain_left.hash(&left);
        let right_hash = self.domain_right.hash(&right);
        let by_left = self
            .table
            .find(Side::Left, left_hash, |e| self.domain_left.eq(&e.left, &left));
        let by_right = self
            .table
            .find(Side::Right, right_hash, |e| self.domain_right.eq(&e.right, &right));
        self.finish_insert(left, right, left_hash, right_hash, by_left, by_right)
    }

    /// Like [`BiHashMap::insert`], but existing entries are matched by hash
    /// code alone, skipping the equality predicates. A hash collision here
    /// updates an unrelated pair; only use this when the domains' hashes are
    /// collision-free over the values in play.
    pub fn insert_fast(&mut self, left: L, right: R) -> Overwritten<L, R> {
        self.table.reserve_for_pair();
        let left_hash = self.domain_left.hash(&left);
        let right_hash = self.domain_right.hash(&right);
        let by_left = self.table.find(Side::Left, left_hash, |e| e.left_hash == left_hash);
        let by_right = self
            .table
            .find(Side::Right, right_hash, |e| e.right_hash == right_hash);
        self.finish_insert(left, right, left_hash, right_hash, by_left, by_right)
    }

    fn finish_insert(
        &mut self,
        left: L,
        right: R,
        left_hash: u64,
        right_hash: u64,
        by_left: Option<EntryKey>,
        by_right: Option<EntryKey>,
    ) -> Overwritten<L, R> {
        match (by_left, by_right) {
            (None, None) => {
                self.table.insert(left, right, left_hash, right_hash);
                Overwritten::Neither
            }
            (Some(key), None) => {
                let (l, r) = self.table.replace(key, left, right, left_hash, right_hash);
                Overwritten::Left(l, r)
            }
            (None, Some(key)) => {
                let (l, r) = self.table.replace(key, left, right, left_hash, right_hash);
                Overwritten::Right(l, r)
            }
            (Some(key), Some(other)) if key == other => {
                let (l, r) = self.table.replace(key, left, right, left_hash, right_hash);
                Overwritten::Pair(l, r)
            }
            (Some(key), Some(other)) => {
                // Two distinct pairs claim the new values; the right-matching
                // pair is displaced whole so right values stay unique.
                let evicted = self.table.remove(other, false);
                let (l, r) = self.table.replace(key, left, right, left_hash, right_hash);
                Overwritten::Both((l, r), evicted)
            }
        }
    }

    /// The right value associated with `left`, if any. Never mutates the
    /// table.
    pub fn get_by_left<Q>(&self, left: &Q) -> Option<&R>
    where
        L: Borrow<Q>,
        DL: Domain<Q>,
        Q: ?Sized,
    {
        let hash = self.domain_left.hash(left);
        let key = self
            .table
            .find(Side::Left, hash, |e| self.domain_left.eq(e.left.borrow(), left))?;
        Some(&self.table.entry(key).right)
    }

    /// The left value associated with `right`, if any.
    pub fn get_by_right<Q>(&self, right: &Q) -> Option<&L>
    where
        R: Borrow<Q>,
        DR: Domain<Q>,
        Q: ?Sized,
    {
        let hash = self.domain_right.hash(right);
        let key = self
            .table
            .find(Side::Right, hash, |e| self.domain_right.eq(e.right.borrow(), right))?;
        Some(&self.table.entry(key).left)
    }

    /// [`BiHashMap::get_by_left`] matching by hash code alone. Faster, but a
    /// colliding hash returns the wrong pair's value; a deliberate
    /// speed/safety trade-off, not a bug to paper over.
    pub fn get_by_left_fast<Q>(&self, left: &Q) -> Option<&R>
    where
        L: Borrow<Q>,
        DL: Domain<Q>,
        Q: ?Sized,
    {
        let hash = self.domain_left.hash(left);
        let key = self.table.find(Side::Left, hash, |e| e.left_hash == hash)?;
        Some(&self.table.entry(key).right)
    }

    /// [`BiHashMap::get_by_right`] matching by hash code alone.
    pub fn get_by_right_fast<Q>(&self, right: &Q) -> Option<&L>
    where
        R: Borrow<Q>,
        DR: Domain<Q>,
        Q: ?Sized,
    {
        let hash = self.domain_right.hash(right);
        let key = self.table.find(Side::Right, hash, |e| e.right_hash == hash)?;
        Some(&self.table.entry(key).left)
    }

    pub fn contains_left<Q>(&self, left: &Q) -> bool
    where
        L: Borrow<Q>,
        DL: Domain<Q>,
        Q: ?Sized,
    {
        self.get_by_left(left).is_some()
    }

    pub fn contains_right<Q>(&self, right: &Q) -> bool
    where
        R: Borrow<Q>,
        DR: Domain<Q>,
        Q: ?Sized,
    {
        self.get_by_right(right).is_some()
    }

    /// Remove the pair whose left value matches `left`, returning the owned
    /// pair. `None` means the value was absent and the map is untouched;
    /// absence is an ordinary outcome, not an error. The shrink policy runs
    /// after a successful removal.
    pub fn remove_by_left<Q>(&mut self, left: &Q) -> Option<(L, R)>
    where
        L: Borrow<Q>,
        DL: Domain<Q>,
        Q: ?Sized,
    {
        let hash = self.domain_left.hash(left);
        let key = self
            .table
            .find(Side::Left, hash, |e| self.domain_left.eq(e.left.borrow(), left))?;
        Some(self.table.remove(key, true))
    }

    /// Remove the pair whose right value matches `right`.
    pub fn remove_by_right<Q>(&mut self, right: &Q) -> Option<(L, R)>
    where
        R: Borrow<Q>,
        DR: Domain<Q>,
        Q: ?Sized,
    {
        let hash = self.domain_right.hash(right);
        let key = self
            .table
            .find(Side::Right, hash, |e| self.domain_right.eq(e.right.borrow(), right))?;
        Some(self.table.remove(key, true))
    }

    /// [`BiHashMap::remove_by_left`] matching by hash code alone; shares the
    /// fast-lookup collision caveat.
    pub fn remove_by_left_fast<Q>(&mut self, left: &Q) -> Option<(L, R)>
    where
        L: Borrow<Q>,
        DL: Domain<Q>,
        Q: ?Sized,
    {
        let hash = self.domain_left.hash(left);
        let key = self.table.find(Side::Left, hash, |e| e.left_hash == hash)?;
        Some(self.table.remove(key, true))
    }

    /// [`BiHashMap::remove_by_right`] matching by hash code alone.
    pub fn remove_by_right_fast<Q>(&mut self, right: &Q) -> Option<(L, R)>
    where
        R: Borrow<Q>,
        DR: Domain<Q>,
        Q: ?Sized,
    {
        let hash = self.domain_right.hash(right);
        let key = self.table.find(Side::Right, hash, |e| e.right_hash == hash)?;
        Some(self.table.remove(key, true))
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.table.check_invariants();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::{BuildHasher, Hasher};

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0 // force all values into the same bucket chain
        }
    }

    /// Invariant: a stored pair is retrievable from both sides until it is
    /// removed or overwritten.
    #[test]
    fn round_trip_both_sides() {
        let mut m: BiHashMap<String, u32> = BiHashMap::new();
        assert_eq!(m.insert("one".to_string(), 1), Overwritten::Neither);
        assert_eq!(m.insert("two".to_string(), 2), Overwritten::Neither);

        assert_eq!(m.get_by_left("one"), Some(&1));
        assert_eq!(m.get_by_right(&2), Some(&"two".to_string()));
        assert_eq!(m.get_by_left("three"), None);
        assert_eq!(m.len(), 2);
        assert_eq!(m.element_count(), 4);
        m.check_invariants();
    }

    /// Invariant: reinserting an existing left value updates the pairing in
    /// place; no second entry appears and the element count is unchanged.
    #[test]
    fn left_match_updates_in_place() {
        let mut m: BiHashMap<String, String> = BiHashMap::new();
        m.insert("k".to_string(), "v1".to_string());
        let before = m.element_count();

        let displaced = m.insert("k".to_string(), "v2".to_string());
        assert_eq!(
            displaced,
            Overwritten::Left("k".to_string(), "v1".to_string())
        );
        assert_eq!(m.len(), 1);
        assert_eq!(m.element_count(), before);

        // The updated pair must round-trip with the *new* right value, and
        // the superseded one must be gone from the reverse index.
        assert_eq!(m.get_by_left("k"), Some(&"v2".to_string()));
        assert_eq!(m.get_by_right("v2"), Some(&"k".to_string()));
        assert_eq!(m.get_by_right("v1"), None);
        m.check_invariants();
    }

    /// Invariant: the symmetric right-side update.
    #[test]
    fn right_match_updates_in_place() {
        let mut m: BiHashMap<String, String> = BiHashMap::new();
        m.insert("a".to_string(), "x".to_string());

        let displaced = m.insert("b".to_string(), "x".to_string());
        assert_eq!(
            displaced,
            Overwritten::Right("a".to_string(), "x".to_string())
        );
        assert_eq!(m.len(), 1);
        assert_eq!(m.get_by_right("x"), Some(&"b".to_string()));
        assert_eq!(m.get_by_left("a"), None);
        assert_eq!(m.get_by_left("b"), Some(&"x".to_string()));
        m.check_invariants();
    }

    /// Invariant: reinserting the exact pairing reports `Pair` and leaves
    /// one entry.
    #[test]
    fn exact_pair_reinsert() {
        let mut m: BiHashMap<String, String> = BiHashMap::new();
        m.insert("k".to_string(), "v".to_string());
        let displaced = m.insert("k".to_string(), "v".to_string());
        assert_eq!(displaced, Overwritten::Pair("k".to_string(), "v".to_string()));
        assert_eq!(m.len(), 1);
        m.check_invariants();
    }

    /// Invariant: when the new pair's sides match two distinct entries, both
    /// are displaced, keeping each side's values unique.
    #[test]
    fn cross_match_displaces_both_pairs() {
        let mut m: BiHashMap<String, String> = BiHashMap::new();
        m.insert("a".to_string(), "x".to_string());
        m.insert("b".to_string(), "y".to_string());

        let displaced = m.insert("a".to_string(), "y".to_string());
        assert_eq!(
            displaced,
            Overwritten::Both(
                ("a".to_string(), "x".to_string()),
                ("b".to_string(), "y".to_string())
            )
        );
        assert_eq!(m.len(), 1);
        assert_eq!(m.element_count(), 2);
        assert_eq!(m.get_by_left("a"), Some(&"y".to_string()));
        assert_eq!(m.get_by_left("b"), None);
        assert_eq!(m.get_by_right("x"), None);
        m.check_invariants();
    }

    /// Invariant: removal returns the owned pair, a second removal of the
    /// same value reports absence, and absence leaves the map untouched.
    #[test]
    fn removal_is_idempotent() {
        let mut m: BiHashMap<String, u32> = BiHashMap::new();
        m.insert("gone".to_string(), 9);

        assert_eq!(m.remove_by_left("gone"), Some(("gone".to_string(), 9)));
        assert_eq!(m.remove_by_left("gone"), None);
        assert_eq!(m.len(), 0);
        assert_eq!(m.element_count(), 0);

        // Absent from the start: also a plain None.
        assert_eq!(m.remove_by_right(&42), None);
        m.check_invariants();
    }

    /// Invariant: everything works when every value collides into a single
    /// bucket chain on both sides; equality does the discriminating.
    #[test]
    fn collision_chains_resolve_by_equality() {
        let mut m: BiHashMap<String, String, Hashed<ConstBuildHasher>, Hashed<ConstBuildHasher>> =
            BiHashMap::with_domains(
                Hashed::with_hasher(ConstBuildHasher),
                Hashed::with_hasher(ConstBuildHasher),
            );
        for i in 0..8 {
            m.insert(format!("l{i}"), format!("r{i}"));
        }
        m.check_invariants();
        for i in 0..8 {
            assert_eq!(m.get_by_left(&format!("l{i}")), Some(&format!("r{i}")));
            assert_eq!(m.get_by_right(&format!("r{i}")), Some(&format!("l{i}")));
        }
        assert_eq!(m.remove_by_left("l3"), Some(("l3".to_string(), "r3".to_string())));
        assert_eq!(m.get_by_left("l3"), None);
        assert_eq!(m.len(), 7);
        m.check_invariants();
    }

    /// Fast-mode semantics under full collisions: every probe matches the
    /// first chain entry, demonstrating the documented false-positive risk.
    #[test]
    fn fast_mode_trusts_hash_codes() {
        let mut m: BiHashMap<String, u32, Hashed<ConstBuildHasher>, Hashed> =
            BiHashMap::with_domains(Hashed::with_hasher(ConstBuildHasher), Hashed::new());
        m.insert("only".to_string(), 1);

        // Any left query hashes to the same code, so fast lookup "finds" the
        // stored pair while strict lookup rejects it.
        assert_eq!(m.get_by_left_fast("other"), Some(&1));
        assert_eq!(m.get_by_left("other"), None);

        // insert_fast treats the colliding left value as an update.
        let displaced = m.insert_fast("different".to_string(), 2);
        assert_eq!(displaced, Overwritten::Left("only".to_string(), 1));
        assert_eq!(m.len(), 1);
        m.check_invariants();
    }

    /// Invariant: fast removal matches by hash code and otherwise behaves
    /// like strict removal.
    #[test]
    fn fast_removal_matches_by_hash() {
        let mut m: BiHashMap<u64, u64, crate::domain::Identity, crate::domain::Identity> =
            BiHashMap::with_domains(crate::domain::Identity, crate::domain::Identity);
        m.insert(10, 100);
        m.insert(11, 101);

        assert_eq!(m.remove_by_left_fast(&10), Some((10, 100)));
        assert_eq!(m.remove_by_left_fast(&10), None);
        assert_eq!(m.remove_by_right_fast(&101), Some((11, 101)));
        assert!(m.is_empty());
        m.check_invariants();
    }

    /// The growth scenario: four starting buckets, threshold 0.75. The
    /// second insertion projects 4/4 > 0.75 and doubles the table; pairs
    /// stay retrievable from both sides afterwards.
    #[test]
    fn growth_preserves_round_trips() {
        let mut m: BiHashMap<String, String> =
            BiHashMap::with_parameters(Hashed::new(), Hashed::new(), 4, 0.75);
        assert_eq!(m.bucket_count(), 4);

        m.insert("a".to_string(), "x".to_string());
        m.insert("b".to_string(), "y".to_string());
        m.insert("c".to_string(), "z".to_string());

        assert_eq!(m.bucket_count(), 8);
        assert_eq!(m.get_by_left("b"), Some(&"y".to_string()));
        assert_eq!(m.get_by_right("y"), Some(&"b".to_string()));
        assert_eq!(m.get_by_left("a"), Some(&"x".to_string()));
        assert_eq!(m.get_by_right("z"), Some(&"c".to_string()));
        m.check_invariants();
    }

    /// Updates may trigger growth too: the policy runs before duplicate
    /// detection, mirroring the projected element count.
    #[test]
    fn update_can_grow_table() {
        let mut m: BiHashMap<String, String> =
            BiHashMap::with_parameters(Hashed::new(), Hashed::new(), 4, 0.75);
        m.insert("a".to_string(), "x".to_string());
        assert_eq!(m.bucket_count(), 4);

        // An update of "a": still projects (2 + 2) / 4 > 0.75 first.
        m.insert("a".to_string(), "x2".to_string());
        assert_eq!(m.bucket_count(), 8);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get_by_right("x2"), Some(&"a".to_string()));
        m.check_invariants();
    }
}
