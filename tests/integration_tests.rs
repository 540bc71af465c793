//! Integration tests for Keepsake
#![cfg(not(target_arch = "wasm32"))]

use std::collections::BTreeMap;
use std::fs;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use keepsake::{
    FileStore, KeyValueStore, MemoryStore, Persisted, Reactive, Signal, StoreError, Subscription,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Preferences {
    theme: String,
    font_size: u32,
    shortcuts: BTreeMap<String, String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "system".to_string(),
            font_size: 14,
            shortcuts: BTreeMap::new(),
        }
    }
}

/// A store whose writes always fail.
struct ReadOnlyStore(MemoryStore);

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Rejected("storage is read-only".to_string()))
    }
}

/// A cell from "another framework": wraps a signal and counts writes.
#[derive(Clone)]
struct CountingCell<T> {
    inner: Signal<T>,
    writes: Arc<AtomicUsize>,
}

impl<T: Clone + Send + Sync + 'static> Reactive<T> for CountingCell<T> {
    fn from_value(initial: T) -> Self {
        Self {
            inner: Signal::new(initial),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn get(&self) -> T {
        self.inner.get()
    }

    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.with(f)
    }

    fn set(&self, value: T) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(value);
    }

    fn update(&self, f: impl FnOnce(&mut T)) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update(f);
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.subscribe(listener)
    }
}

#[test]
fn value_survives_a_new_instance() {
    let store = MemoryStore::new();

    let prefs = Persisted::new(store.clone(), "prefs", Preferences::default());
    prefs.modify(|p| {
        p.theme = "dark".to_string();
        p.shortcuts.insert("save".to_string(), "ctrl+s".to_string());
    });
    let saved = prefs.get();
    drop(prefs);

    let reopened = Persisted::new(store, "prefs", Preferences::default());
    assert_eq!(reopened.get(), saved);
}

#[test]
fn file_store_round_trip_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");

    let prefs = Persisted::new(FileStore::new(&path), "prefs", Preferences::default());
    prefs.modify(|p| p.font_size = 18);
    let count = Persisted::new(FileStore::new(&path), "launches", 0_u32);
    count.update(3);
    drop((prefs, count));

    let prefs = Persisted::new(FileStore::new(&path), "prefs", Preferences::default());
    let count = Persisted::new(FileStore::new(&path), "launches", 0_u32);
    assert_eq!(prefs.get().font_size, 18);
    assert_eq!(count.get(), 3);
}

#[test]
fn corrupt_file_falls_back_and_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    fs::write(&path, "{not json").unwrap();

    let prefs = Persisted::new(FileStore::new(&path), "prefs", Preferences::default());
    assert_eq!(prefs.get(), Preferences::default());

    prefs.modify(|p| p.theme = "dark".to_string());
    assert_eq!(prefs.get().theme, "dark");
    assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
}

#[test]
fn corrupt_entry_falls_back() {
    let store = MemoryStore::with_entries([("prefs", "{not json")]);
    let prefs = Persisted::new(store, "prefs", Preferences::default());

    assert_eq!(prefs.get(), Preferences::default());
}

#[test]
fn creation_never_writes() {
    let store = MemoryStore::new();
    let _a = Persisted::new(store.clone(), "a", 1_u8);
    let _b = Persisted::new(store.clone(), "b", json!({ "nested": [1, 2, 3] }));

    assert!(store.is_empty());
}

#[test]
fn update_applies_when_writes_fail() {
    let store = ReadOnlyStore(MemoryStore::with_entries([("level", "2")]));
    let level = Persisted::new(store, "level", 0_i32);
    assert_eq!(level.get(), 2);

    for next in [5, -1, 9] {
        level.update(next);
        assert_eq!(level.get(), next);
    }
}

#[test]
fn keys_do_not_interfere() {
    let store = MemoryStore::new();
    let a = Persisted::new(store.clone(), "a", String::from("a0"));
    let b = Persisted::new(store.clone(), "b", String::from("b0"));

    b.update("b1".to_string());
    a.update("a1".to_string());
    a.update("a2".to_string());

    assert_eq!(store.raw("b").as_deref(), Some("\"b1\""));
    assert_eq!(b.get(), "b1");
}

#[test]
fn instances_sharing_a_key_are_independent() {
    let store = MemoryStore::new();
    let first = Persisted::new(store.clone(), "shared", 0_u32);
    let second = Persisted::new(store.clone(), "shared", 0_u32);

    first.update(1);
    assert_eq!(second.get(), 0);

    second.update(2);
    assert_eq!(first.get(), 1);
    assert_eq!(store.raw("shared").as_deref(), Some("2"));
}

#[test]
fn json_values_keep_their_types() {
    let store = MemoryStore::new();
    let value = json!({
        "null": null,
        "flag": true,
        "number": 1.5,
        "text": "hi",
        "list": [1, "two", false],
        "map": { "k": "v" },
    });

    Persisted::new(store.clone(), "doc", Value::Null).update(value.clone());
    let reopened = Persisted::new(store, "doc", Value::Null);

    assert_eq!(reopened.get(), value);
}

#[test]
fn subscribers_follow_updates() {
    let store = MemoryStore::new();
    let count = Persisted::new(store, "count", 0_usize);
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    let sub = count.subscribe(move |_| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });

    count.update(1);
    count.modify(|n| *n += 1);
    drop(sub);
    count.update(10);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(count.get(), 10);
}

#[test]
fn custom_reactive_cell_backs_a_persisted_value() {
    let store = MemoryStore::with_entries([("zoom", "1.5")]);
    let zoom: Persisted<f64, CountingCell<f64>> = Persisted::in_cell(store.clone(), "zoom", 1.0);

    assert_eq!(zoom.get(), 1.5);
    assert_eq!(zoom.cell().writes.load(Ordering::SeqCst), 0);

    zoom.update(2.0);
    assert_eq!(zoom.cell().writes.load(Ordering::SeqCst), 1);
    assert_eq!(store.raw("zoom").as_deref(), Some("2.0"));
}

fn finite_f64() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
}

/// Arbitrary JSON documents: null, booleans, integers, finite floats,
/// strings, and nested arrays and objects.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        finite_f64().prop_map(Value::from),
        "[a-zA-Z0-9 \"]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn any_map_round_trips(
        key in "[a-z][a-z0-9_.]{0,15}",
        value in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..8),
    ) {
        let store = MemoryStore::new();
        Persisted::new(store.clone(), key.clone(), BTreeMap::<String, i64>::new())
            .update(value.clone());

        let mut other = BTreeMap::new();
        other.insert("fallback".to_string(), 0_i64);
        let reopened = Persisted::new(store, key, other);

        prop_assert_eq!(reopened.get(), value);
    }

    #[test]
    fn any_finite_float_round_trips(value in finite_f64()) {
        let store = MemoryStore::new();
        Persisted::new(store.clone(), "zoom", 0.0_f64).update(value);

        let reopened = Persisted::new(store, "zoom", f64::MAX);
        prop_assert_eq!(reopened.get().to_bits(), value.to_bits());
    }

    #[test]
    fn any_json_document_round_trips(value in json_value()) {
        let store = MemoryStore::new();
        Persisted::new(store.clone(), "doc", Value::Null).update(value.clone());

        let reopened = Persisted::new(store, "doc", json!({ "fallback": true }));
        prop_assert_eq!(reopened.get(), value);
    }
}
