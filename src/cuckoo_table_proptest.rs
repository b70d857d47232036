#![cfg(test)]

// Property tests for CuckooTable kept inside the crate so they can check the
// internal placement invariants after every operation.

use crate::config::CuckooTableBuilder;
use crate::cuckoo_table::CuckooTable;
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hasher;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Reserve(usize),
    Compact,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario(
    pool_len: core::ops::RangeInclusive<usize>,
) -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::btree_set("[a-z]{1,6}", pool_len).prop_flat_map(|pool| {
        let pool: Vec<String> = pool.into_iter().collect();
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool, "[a-z]{1,6}".prop_map(|s| s)].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => (0usize..20).prop_map(OpI::Reserve),
            1 => Just(OpI::Compact),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `insert` is an upsert: `Some(old)` exactly when the model had the key.
// - A failed insert hands back an entry the model still holds; nothing is lost.
// - `get`/`contains_key` parity, including borrowed `&str` lookup.
// - `remove` returns the model's value; removing an absent key is a no-op.
// - `iter` yields each live entry exactly once.
// - After every op every entry sits at its hashed slot in exactly one table
//   and `len` equals the number of occupied slots.
fn run_state_machine<S: BuildHasher>(
    mut sut: CuckooTable<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let expected = model.get(&k).copied();
                match sut.insert(k.clone(), v) {
                    Ok(prev) => {
                        prop_assert_eq!(prev, expected);
                        model.insert(k, v);
                    }
                    Err(e) => {
                        prop_assert!(expected.is_none(), "upsert never fails");
                        model.insert(k, v);
                        let (hk, hv) = e.into_entry();
                        prop_assert_eq!(model.remove(&hk), Some(hv));
                    }
                }
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
                prop_assert_eq!(sut.get(k.0.as_str()), model.get(&k));
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut disagrees with model"),
                }
            }
            OpI::Reserve(n) => {
                prop_assert!(sut.reserve(n).is_ok());
            }
            OpI::Compact => {
                let before = sut.base_size();
                let compacted = sut.compact().expect("compaction allocates a smaller table");
                if compacted {
                    prop_assert_eq!(sut.base_size(), before / 2);
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.iter().map(|(k, _)| k.clone()).collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(sut.iter().count(), model.len());
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.len() <= sut.capacity());
    }
    for (k, v) in &model {
        prop_assert_eq!(sut.get(k), Some(v));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(1..=48), seed in any::<u64>()) {
        let sut = CuckooTableBuilder::new()
            .start_size_exp(1)
            .seed(seed)
            .build()
            .unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Constant hasher: every key maps to slot 0 of each table, so three distinct
// keys fill the only reachable slots. Pools stay at three keys so inserts
// never need more room than exists; this stresses equality probing across
// all three tables and displacement through a fully contended chain.
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
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(1..=3)) {
        let sut = CuckooTableBuilder::new()
            .start_size_exp(1)
            .max_size_exp(3)
            .seed(1)
            .hashers([ConstBuildHasher, ConstBuildHasher, ConstBuildHasher])
            .build()
            .unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

#[test]
fn const_hasher_spreads_three_keys_over_three_tables() {
    let mut t: CuckooTable<Key, i32, ConstBuildHasher> = CuckooTableBuilder::new()
        .start_size_exp(1)
        .hashers(Default::default())
        .build()
        .unwrap();
    for (i, s) in ["a", "b", "c"].iter().enumerate() {
        t.insert(Key(s.to_string()), i as i32).unwrap();
    }
    t.assert_invariants();
    assert_eq!(t.get("a"), Some(&0));
    assert_eq!(t.get("b"), Some(&1));
    assert_eq!(t.get("c"), Some(&2));
}

#[test]
fn const_hasher_fourth_key_is_handed_back() {
    use crate::error::Error;

    let mut t: CuckooTable<Key, i32, ConstBuildHasher> = CuckooTableBuilder::new()
        .start_size_exp(1)
        .max_size_exp(1)
        .hashers(Default::default())
        .build()
        .unwrap();
    for (i, s) in ["a", "b", "c"].iter().enumerate() {
        t.insert(Key(s.to_string()), i as i32).unwrap();
    }
    let err = t.insert(Key("d".into()), 3).unwrap_err();
    assert_eq!(err.error, Error::CapacityLimit { max_size_exp: 1 });
    let (k, v) = err.into_entry();
    assert!(!t.contains_key(k.0.as_str()));
    assert_eq!(t.len(), 3);
    t.assert_invariants();
    let mut all: Vec<(String, i32)> = t.iter().map(|(k, v)| (k.0.clone(), *v)).collect();
    all.push((k.0, v));
    all.sort();
    let expected: Vec<(String, i32)> = ["a", "b", "c", "d"]
        .iter()
        .enumerate()
        .map(|(i, s)| (s.to_string(), i as i32))
        .collect();
    assert_eq!(all, expected);
}
