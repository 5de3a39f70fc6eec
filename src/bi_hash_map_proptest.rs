#![cfg(test)]

// Property tests for BiHashMap kept inside the crate so they can audit the
// structural invariants after every step.

use crate::{BiHashMap, Domain, Hashed, Overwritten};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// values, pools shrink in length, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, usize),
    RemoveLeft(usize),
    RemoveRight(usize),
    GetLeft(usize),
    GetRight(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<String>, Vec<OpI>)> {
    let pools = (
        proptest::collection::vec("[a-z]{0,4}", 1..=6),
        proptest::collection::vec("[a-z]{0,4}", 1..=6),
    );
    pools.prop_flat_map(|(left_pool, right_pool)| {
        let li = proptest::sample::select((0..left_pool.len()).collect::<Vec<_>>());
        let ri = proptest::sample::select((0..right_pool.len()).collect::<Vec<_>>());
        let op = prop_oneof![
            (li.clone(), ri.clone()).prop_map(|(i, j)| OpI::Insert(i, j)),
            li.clone().prop_map(OpI::RemoveLeft),
            ri.clone().prop_map(OpI::RemoveRight),
            li.clone().prop_map(OpI::GetLeft),
            ri.clone().prop_map(OpI::GetRight),
        ];
        proptest::collection::vec(op, 1..80)
            .prop_map(move |ops| (left_pool.clone(), right_pool.clone(), ops))
    })
}

// Reference model: two plain HashMaps kept mirror-consistent, with the same
// displacement semantics as the map under test. Returns what an insertion
// should report.
fn model_insert(
    fwd: &mut HashMap<String, String>,
    rev: &mut HashMap<String, String>,
    l: String,
    r: String,
) -> Overwritten<String, String> {
    let prev_r = fwd.get(&l).cloned();
    let prev_l = rev.get(&r).cloned();
    let expected = match (prev_r.clone(), prev_l.clone()) {
        (None, None) => Overwritten::Neither,
        (Some(r_old), None) => Overwritten::Left(l.clone(), r_old),
        (None, Some(l_old)) => Overwritten::Right(l_old, r.clone()),
        (Some(_), Some(l_old)) if l_old == l => Overwritten::Pair(l.clone(), r.clone()),
        (Some(r_old), Some(l_old)) => Overwritten::Both((l.clone(), r_old), (l_old, r.clone())),
    };
    if let Some(r_old) = prev_r {
        rev.remove(&r_old);
    }
    if let Some(l_old) = prev_l {
        fwd.remove(&l_old);
    }
    fwd.insert(l.clone(), r.clone());
    rev.insert(r, l);
    expected
}

// Drives an operation sequence against the model, asserting after every op:
// - insertion reports exactly what the model displaced;
// - removal returns the model's pair or None;
// - lookup parity from both sides over the whole pools;
// - len / element_count parity (two elements per pair);
// - the internal two-chain reachability audit passes.
fn run_scenario<DL, DR>(
    mut sut: BiHashMap<String, String, DL, DR>,
    left_pool: &[String],
    right_pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    DL: Domain<String>,
    DR: Domain<String>,
{
    let mut fwd: HashMap<String, String> = HashMap::new();
    let mut rev: HashMap<String, String> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, j) => {
                let l = left_pool[i].clone();
                let r = right_pool[j].clone();
                let expected = model_insert(&mut fwd, &mut rev, l.clone(), r.clone());
                let got = sut.insert(l, r);
                prop_assert_eq!(got, expected);
            }
            OpI::RemoveLeft(i) => {
                let l = &left_pool[i];
                let expected = fwd.remove(l).map(|r| {
                    rev.remove(&r);
                    (l.clone(), r)
                });
                prop_assert_eq!(sut.remove_by_left(l), expected);
            }
            OpI::RemoveRight(j) => {
                let r = &right_pool[j];
                let expected = rev.remove(r).map(|l| {
                    fwd.remove(&l);
                    (l, r.clone())
                });
                prop_assert_eq!(sut.remove_by_right(r), expected);
            }
            OpI::GetLeft(i) => {
                let l = &left_pool[i];
                prop_assert_eq!(sut.get_by_left(l), fwd.get(l));
                prop_assert_eq!(sut.contains_left(l), fwd.contains_key(l));
            }
            OpI::GetRight(j) => {
                let r = &right_pool[j];
                prop_assert_eq!(sut.get_by_right(r), rev.get(r));
                prop_assert_eq!(sut.contains_right(r), rev.contains_key(r));
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), fwd.len());
        prop_assert_eq!(sut.element_count(), 2 * fwd.len());
        prop_assert_eq!(sut.is_empty(), fwd.is_empty());
        for l in left_pool {
            prop_assert_eq!(sut.get_by_left(l), fwd.get(l));
        }
        for r in right_pool {
            prop_assert_eq!(sut.get_by_right(r), rev.get(r));
        }
        sut.check_invariants();
    }
    Ok(())
}

// Property: state-machine equivalence against the two-HashMap model with
// the default domains and sizing.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((left_pool, right_pool, ops) in arb_scenario()) {
        let sut: BiHashMap<String, String> = BiHashMap::new();
        run_scenario(sut, &left_pool, &right_pool, ops)?;
    }
}

// Collision variant: a constant-hash domain on both sides forces every
// value into a single chain per side, stressing equality probing,
// predecessor-tracked splicing, and collision growth.
#[derive(Clone, Copy, Default)]
struct ConstDomain;

impl<T: ?Sized + Eq> Domain<T> for ConstDomain {
    fn hash(&self, _value: &T) -> u64 {
        0
    }

    fn eq(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((left_pool, right_pool, ops) in arb_scenario()) {
        let sut: BiHashMap<String, String, ConstDomain, ConstDomain> =
            BiHashMap::with_domains(ConstDomain, ConstDomain);
        run_scenario(sut, &left_pool, &right_pool, ops)?;
    }
}

// Resize-heavy variant: a tiny starting table makes most insertions and
// removals cross a resize threshold, exercising rehash migration from both
// sides.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_tiny_table((left_pool, right_pool, ops) in arb_scenario()) {
        let sut: BiHashMap<String, String> =
            BiHashMap::with_parameters(Hashed::new(), Hashed::new(), 2, 0.75);
        run_scenario(sut, &left_pool, &right_pool, ops)?;
    }
}
