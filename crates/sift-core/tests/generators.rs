#![allow(dead_code)]

use proptest::prelude::*;
use sift_core::crdt::LwwRegister;
use sift_core::model::{ItemId, ItemRecord, State};
use sift_core::order::{AlphaKey, RationalKey};
use sift_core::store::ItemStore;

/// Ids shared between generated stores so merges actually overlap.
pub const ID_POOL: [&str; 6] = [
    "0190a5b2-0000-7000-8000-000000000001",
    "0190a5b2-0000-7000-8000-000000000002",
    "0190a5b2-0000-7000-8000-000000000003",
    "0190a5b2-0000-7000-8000-000000000004",
    "0190a5b2-0000-7000-8000-000000000005",
    "0190a5b2-0000-7000-8000-000000000006",
];

/// Order key for each pooled id. Two entries share a key to exercise the id
/// tie-break.
const KEY_POOL: [&str; 6] = ["g", "n", "n", "q", "u", "zn"];

pub fn pooled_id(index: usize) -> ItemId {
    ID_POOL[index].parse().unwrap()
}

pub fn arb_alpha_key() -> impl Strategy<Value = AlphaKey> + Clone {
    "[a-z]{0,6}[b-z]".prop_map(|s| AlphaKey::new(s).unwrap())
}

/// Any canonical alpha key, or the empty string standing for "no bound".
pub fn arb_alpha_bound() -> impl Strategy<Value = String> + Clone {
    prop_oneof![
        1 => Just(String::new()),
        4 => "[a-z]{0,6}[b-z]",
    ]
}

pub fn arb_rational_key() -> impl Strategy<Value = RationalKey> + Clone {
    (2u64..1_000_000)
        .prop_flat_map(|den| (1..den, Just(den)))
        .prop_map(|(num, den)| RationalKey::from_parts(num, den).unwrap())
}

pub fn arb_state() -> impl Strategy<Value = State> + Clone {
    prop_oneof![
        4 => Just(State::Unchecked),
        4 => Just(State::Checked),
        1 => Just(State::Removed),
    ]
}

pub fn arb_replica() -> impl Strategy<Value = String> + Clone {
    prop_oneof![Just("alice"), Just("bob"), Just("carol")].prop_map(str::to_string)
}

/// Registers with deliberately narrow timestamps so ties are common.
pub fn arb_lww<T: Clone + std::fmt::Debug + 'static>(
    value: impl Strategy<Value = T> + Clone,
) -> impl Strategy<Value = LwwRegister<T>> + Clone {
    (value, 0u64..20, arb_replica())
        .prop_map(|(value, wall_ts, replica)| LwwRegister::new(value, wall_ts, replica))
}

pub fn arb_title() -> impl Strategy<Value = String> + Clone {
    prop_oneof![Just("milk"), Just("eggs"), Just("bread"), Just("")].prop_map(str::to_string)
}

pub fn arb_record() -> impl Strategy<Value = ItemRecord<AlphaKey>> + Clone {
    (0..ID_POOL.len(), arb_lww(arb_title()), arb_lww(arb_state())).prop_map(
        |(index, title, state)| ItemRecord {
            id: pooled_id(index),
            order: AlphaKey::new(KEY_POOL[index]).unwrap(),
            title,
            state,
        },
    )
}

pub fn arb_store() -> impl Strategy<Value = ItemStore<AlphaKey>> + Clone {
    prop::collection::vec(arb_record(), 0..10).prop_map(|records| {
        let mut store = ItemStore::new();
        for record in records {
            store.insert(record);
        }
        store
    })
}

pub fn arb_rational_store() -> impl Strategy<Value = ItemStore<RationalKey>> + Clone {
    prop::collection::vec(
        (arb_rational_key(), arb_lww(arb_title()), arb_lww(arb_state())),
        0..10,
    )
    .prop_map(|records| {
        let mut store = ItemStore::new();
        for (order, title, state) in records {
            store.insert(ItemRecord {
                id: ItemId::generate(),
                order,
                title,
                state,
            });
        }
        store
    })
}
