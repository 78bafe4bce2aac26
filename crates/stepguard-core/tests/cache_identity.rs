//! Identity cache behaviour across proxy lifetimes.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Barrier};
use std::thread;

use stepguard_core::{classify, ObjectRef, ProxyHandle, ProxyRoot, Value, WrapClass};

use fixtures::{assertion_policy, Meddling, Subcomponent};

#[test]
fn one_entry_per_raw_identity() {
    let root = ProxyRoot::new(assertion_policy());
    let a = ObjectRef::from_arc(Meddling::new());
    let b = ObjectRef::from_arc(Meddling::new());

    let pa = root.wrap_object(a.clone());
    let pb = root.wrap_object(b.clone());
    assert_ne!(pa, pb);
    assert_eq!(root.cache().len(), 2);

    assert_eq!(root.cache().get(&a), Some(pa));
    assert_eq!(root.cache().get(&b), Some(pb));
}

#[test]
fn cache_does_not_keep_proxies_alive() {
    let root = ProxyRoot::new(assertion_policy());
    let raw = ObjectRef::from_arc(Subcomponent::new());

    let first = root.wrap_object(raw.clone());
    let first_set = first.forbidden_set().clone();
    drop(first);

    assert!(root.cache().get(&raw).is_none());
    assert_eq!(root.cache().live_count(), 0);

    // Recreated handle is equivalent: same raw, same policy.
    let second = root.wrap_object(raw.clone());
    assert!(second.as_raw().ptr_eq(&raw));
    assert!(std::sync::Arc::ptr_eq(second.forbidden_set(), &first_set));
    assert_eq!(root.cache().len(), 1);
}

#[test]
fn prune_drops_dead_entries_only() {
    let root = ProxyRoot::new(assertion_policy());
    let kept = root.wrap_object(ObjectRef::from_arc(Subcomponent::new()));
    for _ in 0..3 {
        let _ = root.wrap_object(ObjectRef::from_arc(Subcomponent::new()));
    }

    assert_eq!(root.cache().live_count(), 1);
    let before = root.cache().len();
    assert_eq!(root.cache().prune(), before - 1);
    assert_eq!(root.cache().len(), 1);
    assert_eq!(root.cache().get(&kept.as_raw()), Some(kept));
}

#[test]
fn roots_keep_separate_caches() {
    let raw = ObjectRef::from_arc(Meddling::new());
    let r1 = ProxyRoot::new(assertion_policy());
    let r2 = ProxyRoot::new(assertion_policy());

    let p1 = r1.wrap_object(raw.clone());
    let p2 = r2.wrap_object(raw);
    assert_ne!(p1, p2);
    assert!(!r1.ptr_eq(&r2));
}

#[test]
fn classification_is_total() {
    let root = ProxyRoot::new(assertion_policy());
    let obj = Value::Object(ObjectRef::from_arc(Meddling::new()));
    let proxied = root.wrap(obj.clone());

    assert_eq!(classify(&Value::Nil), WrapClass::Opaque);
    assert_eq!(classify(&Value::Bool(false)), WrapClass::Opaque);
    assert_eq!(classify(&Value::Int(0)), WrapClass::Opaque);
    assert_eq!(classify(&Value::Float(1.5)), WrapClass::Opaque);
    assert_eq!(classify(&Value::from("s")), WrapClass::Opaque);
    assert_eq!(classify(&Value::symbol("sym")), WrapClass::Opaque);
    assert_eq!(classify(&Value::Bytes(bytes::Bytes::new())), WrapClass::Opaque);
    assert_eq!(classify(&obj), WrapClass::Wrappable);
    assert_eq!(classify(&proxied), WrapClass::AlreadyWrapped);

    assert_eq!(root.wrap(Value::Int(7)), Value::Int(7));
    assert_eq!(root.wrap(Value::Nil), Value::Nil);

    // `wrap` only touches what `classify` calls wrappable.
    for v in [Value::Nil, Value::from("s"), obj.clone(), proxied.clone()] {
        let out = root.wrap(v.clone());
        match classify(&v) {
            WrapClass::Wrappable => assert_eq!(out, proxied),
            WrapClass::Opaque | WrapClass::AlreadyWrapped => assert_eq!(out, v),
        }
    }
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn shared_types_are_send_and_sync() {
    assert_send_sync::<Value>();
    assert_send_sync::<ObjectRef>();
    assert_send_sync::<ProxyHandle>();
    assert_send_sync::<ProxyRoot>();
}

#[test]
fn concurrent_wraps_share_one_proxy() {
    const THREADS: usize = 8;

    for _ in 0..50 {
        let root = ProxyRoot::new(assertion_policy());
        let raw = ObjectRef::from_arc(Meddling::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let root = root.clone();
                let raw = raw.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    root.wrap_object(raw)
                })
            })
            .collect();

        let proxies: Vec<ProxyHandle> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for p in &proxies[1..] {
            assert!(p.ptr_eq(&proxies[0]));
        }
        assert_eq!(root.cache().len(), 1);
    }
}
