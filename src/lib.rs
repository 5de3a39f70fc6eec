//! bi-hashmap: a single-threaded bidirectional hash map. One stored pair is
//! discoverable from either side, with hashing and equality pluggable per
//! side.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one container that enforces a last-write-wins 1:1 correspondence
//!   between two unrelated value spaces, with O(1) average lookup,
//!   insertion, and removal from either side.
//! - Layers:
//!   - ChainTable<L, R>: structural layer owning the bucket array, the
//!     entry arena, the per-side chains, and the doubling/halving resize
//!     policy. Matching is driven by hashes and closures supplied from
//!     above; this layer runs no caller code of its own.
//!   - BiHashMap<L, R, DL, DR>: public API holding the two per-side
//!     Domain strategies and translating insert/get/remove calls into
//!     structural finds, links, and splices. Displaced values are returned
//!     by value, never dropped behind the caller's back.
//!
//! Dual chains
//! - Every bucket has two chain heads and every entry two forward links, so
//!   membership in the left-hash chain and the right-hash chain is
//!   structurally independent. The same-bucket case needs no special
//!   handling, and an empty chain is a plain `None` head rather than a
//!   crash condition.
//!
//! Sizing policy
//! - The table starts at a configurable bucket count and load factor
//!   (defaults 10 and 0.75). Insertion doubles the table first whenever the
//!   projected element count would push the load ratio past the threshold;
//!   removal halves it when the halved table would still sit under the
//!   threshold, with a 10-bucket floor. Bucket counts are therefore always
//!   the initial count times a power of two.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its two hash codes at insertion and every rehash
//!   indexes from the stored codes, so no Domain implementation runs while
//!   chains are being rebuilt. Domains must be coherent (equal values hash
//!   equally) and pure.
//!
//! Fast comparison
//! - The `_fast` method variants match entries by hash code alone instead
//!   of the domain's equality predicate. That is a deliberate speed/safety
//!   trade-off: for any hash with collisions it can match the wrong pair.
//!   The strict variants are the default; nothing silently upgrades a fast
//!   probe to a correct one.
//!
//! Constraints
//! - Single-threaded: all mutation takes `&mut self` and there is no
//!   interior mutability, so the borrow checker enforces exclusive access.
//!   Sharing across threads means external serialization (a mutex).
//! - Resize runs inline inside insert/remove and is O(n) in the element
//!   count; cost is amortized, occasionally large.
//!
//! Notes and non-goals
//! - No iteration or enumeration over contents, no ordering, no
//!   persistence.
//! - Each side's values are unique: an insertion displaces any pair that
//!   already claims either of the inserted values.
//! - Dropping the map drops every stored value; taking a value back out
//!   goes through removal, which returns the owned pair.
//! - Public API surface is `BiHashMap`, `Overwritten`, and the domain
//!   strategies; the structural layer is an implementation detail.

mod bi_hash_map;
mod bi_hash_map_proptest;
mod chain_table;
mod domain;

// Public surface
pub use bi_hash_map::{BiHashMap, Overwritten, DEFAULT_BUCKETS, DEFAULT_LOAD_FACTOR};
pub use domain::{BitKey, Domain, Hashed, Identity, PolyText};
