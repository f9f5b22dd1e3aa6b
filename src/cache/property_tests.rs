//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key canonicality, expiry and sweep behavior over
//! generated parameters and timelines.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::cache::key::{self, Params};
use crate::cache::{CategoryPolicyTable, ManualClock, TieredCacheStore, DEFAULT_CATEGORY_TTLS};

// == Test Configuration ==
const T0: u64 = 1_700_000_000_000;

// == Strategies ==
/// Generates primitive parameter values, including separator characters
fn primitive_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 &=:\"]{0,12}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

/// Generates parameter lists with unique names
fn param_pairs_strategy() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map("[a-zA-Z_]{1,10}", primitive_strategy(), 0..6)
        .prop_map(|map| map.into_iter().collect())
}

/// Picks one of the registered categories with its TTL in milliseconds
fn category_strategy() -> impl Strategy<Value = (&'static str, u64)> {
    prop::sample::select(DEFAULT_CATEGORY_TTLS)
        .prop_map(|(category, minutes)| (category, minutes * 60_000))
}

fn to_params(pairs: &[(String, Value)]) -> Params {
    let mut params = Params::new();
    for (name, value) in pairs {
        params.insert(name.clone(), value.clone());
    }
    params
}

fn as_pairs(pairs: &[(String, Value)]) -> impl Iterator<Item = (&str, &Value)> {
    pairs.iter().map(|(name, value)| (name.as_str(), value))
}

fn test_store() -> (TieredCacheStore, ManualClock) {
    let clock = ManualClock::new(T0);
    let store = TieredCacheStore::in_memory(CategoryPolicyTable::default_table())
        .with_clock(Arc::new(clock.clone()));
    (store, clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Permuted parameter lists produce the same key.
    #[test]
    fn prop_key_order_independent(
        pairs in param_pairs_strategy().prop_shuffle(),
        category in "[a-z_]{1,16}"
    ) {
        let mut reversed = pairs.clone();
        reversed.reverse();

        let forward_key = key::encode_pairs(&category, as_pairs(&pairs)).unwrap();
        prop_assert_eq!(
            &forward_key,
            &key::encode_pairs(&category, as_pairs(&reversed)).unwrap()
        );
        prop_assert_eq!(forward_key, key::encode(&category, &to_params(&pairs)).unwrap());
    }

    // Changing any one value changes the key.
    #[test]
    fn prop_distinct_params_distinct_keys(
        pairs in param_pairs_strategy().prop_filter("need a parameter", |p| !p.is_empty()),
        index in any::<prop::sample::Index>(),
        replacement in primitive_strategy()
    ) {
        let i = index.index(pairs.len());
        prop_assume!(pairs[i].1 != replacement);

        let mut changed = pairs.clone();
        changed[i].1 = replacement;

        prop_assert_ne!(
            key::encode("player_matches", &to_params(&pairs)).unwrap(),
            key::encode("player_matches", &to_params(&changed)).unwrap()
        );
    }

    // Adding a parameter never yields the key of the smaller set.
    #[test]
    fn prop_extra_param_distinct_key(
        pairs in param_pairs_strategy(),
        value in primitive_strategy()
    ) {
        let base = to_params(&pairs);
        let mut extended = base.clone();
        prop_assume!(!extended.contains_key("zz_extra"));
        extended.insert("zz_extra".to_string(), value);

        prop_assert_ne!(
            key::encode("search_results", &base).unwrap(),
            key::encode("search_results", &extended).unwrap()
        );
    }

    // set followed by get returns the stored payload.
    #[test]
    fn prop_roundtrip_storage(
        (category, _) in category_strategy(),
        pairs in param_pairs_strategy(),
        id in any::<u32>(),
        name in "[a-zA-Z ]{0,20}"
    ) {
        let (mut store, _) = test_store();
        let params = to_params(&pairs);
        let payload = json!({"id": id, "name": name});

        store.set(category, &payload, &params).unwrap();

        let cached: Option<Value> = store.get(category, &params).unwrap();
        prop_assert_eq!(cached, Some(payload));
    }

    // Entries are served just before their TTL elapses and gone just after.
    #[test]
    fn prop_ttl_expiration_behavior(
        (category, ttl) in category_strategy(),
        epsilon in 1u64..60_000,
        pairs in param_pairs_strategy()
    ) {
        let (mut store, clock) = test_store();
        let params = to_params(&pairs);
        store.set(category, &json!({"v": 1}), &params).unwrap();

        clock.set(T0 + ttl - epsilon.min(ttl));
        prop_assert!(store.get::<Value>(category, &params).unwrap().is_some());

        clock.set(T0 + ttl + epsilon);
        prop_assert!(store.get::<Value>(category, &params).unwrap().is_none());
    }

    // The sweep removes exactly the entries whose TTL has elapsed.
    #[test]
    fn prop_cleanup_removes_all_and_only_invalid(
        writes in prop::collection::vec((category_strategy(), 0u64..180), 1..30),
        elapsed_minutes in 0u64..1500
    ) {
        let (mut store, clock) = test_store();

        // Each write lands at a distinct key, `age` minutes after T0
        let mut stored = Vec::new();
        for (i, ((category, ttl), age)) in writes.iter().enumerate() {
            let params = to_params(&[("n".to_string(), json!(i))]);
            clock.set(T0 + age * 60_000);
            store.set(category, &json!(i), &params).unwrap();
            stored.push((*category, params, T0 + age * 60_000, *ttl));
        }

        let now = T0 + elapsed_minutes * 60_000;
        clock.set(now);
        let expected_removed = stored
            .iter()
            .filter(|(_, _, at, ttl)| now.saturating_sub(*at) >= *ttl)
            .count();

        prop_assert_eq!(store.cleanup_expired(), expected_removed);

        let report = store.stats();
        prop_assert_eq!(report.fast_count, stored.len() - expected_removed);
        prop_assert_eq!(report.persistent_count, stored.len() - expected_removed);

        for (_, entry) in store.fast_entries() {
            prop_assert!(!entry.is_expired(now));
        }
        for (category, params, at, ttl) in &stored {
            let fresh = now.saturating_sub(*at) < *ttl;
            if fresh {
                let surviving = store
                    .fast_entries()
                    .find(|(k, _)| *k == key::encode(category, params).unwrap())
                    .map(|(_, e)| e.stored_at);
                prop_assert_eq!(surviving, Some(*at));
            }
        }
    }

    // clear_all always leaves both tiers empty for this prefix.
    #[test]
    fn prop_clear_all_empties_namespace(
        writes in prop::collection::vec((category_strategy(), param_pairs_strategy()), 0..20)
    ) {
        let (mut store, _) = test_store();
        store.persistent_mut().write("settings:locale", "en").unwrap();

        for ((category, _), pairs) in &writes {
            store.set(category, &json!(true), &to_params(pairs)).unwrap();
        }
        store.clear_all();

        let report = store.stats();
        prop_assert_eq!(report.fast_count, 0);
        prop_assert_eq!(report.persistent_count, 0);
        prop_assert_eq!(
            store.persistent().read("settings:locale").unwrap(),
            Some("en".to_string())
        );
    }
}
