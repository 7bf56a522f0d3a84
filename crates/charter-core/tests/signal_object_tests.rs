//! Integration tests for signals and the widget object registry.

use std::sync::Arc;

use charter_core::{ObjectBase, ObjectError, ObjectRegistry, Signal, global_registry};
use parking_lot::Mutex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Node {
    base: ObjectBase,
}

impl Node {
    fn new() -> Self {
        Self {
            base: ObjectBase::new::<Self>(),
        }
    }
}

#[test]
fn test_slots_run_in_connection_order() {
    init_tracing();
    let signal = Signal::<&'static str>::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let log = log.clone();
        signal.connect(move |value| log.lock().push(format!("{tag}:{value}")));
    }
    signal.emit("go");

    assert_eq!(*log.lock(), vec!["first:go", "second:go", "third:go"]);
}

#[test]
fn test_slot_may_connect_and_emit_during_emission() {
    init_tracing();
    let signal = Arc::new(Signal::<u32>::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    let inner = signal.clone();
    let inner_log = log.clone();
    signal.connect(move |&depth| {
        inner_log.lock().push(depth);
        if depth == 0 {
            let late_log = inner_log.clone();
            inner.connect(move |&d| late_log.lock().push(100 + d));
            inner.emit(depth + 1);
        }
    });

    signal.emit(0);
    // The nested emission already sees the new slot; the outer one does not.
    assert_eq!(*log.lock(), vec![0, 1, 101]);
}

#[test]
fn test_forwarding_and_blocking() {
    init_tracing();
    let source = Signal::<String>::new();
    let target = Signal::<String>::new();
    let received = Arc::new(Mutex::new(Vec::new()));

    let r = received.clone();
    target.connect(move |s| r.lock().push(s.clone()));
    let forward = source.forward_to(&target);

    source.emit("one".into());
    target.set_blocked(true);
    source.emit("two".into());
    target.set_blocked(false);
    source.disconnect(forward);
    source.emit("three".into());

    assert_eq!(*received.lock(), vec!["one"]);
}

#[test]
fn test_forwarding_to_dropped_signal_is_harmless() {
    let source = Signal::<()>::new();
    let target = Signal::<()>::new();
    let handle = target.handle();
    source.forward_to(&target);
    drop(target);

    assert!(!handle.is_alive());
    source.emit(());
}

#[test]
fn test_scoped_connection_ends_with_guard() {
    let signal = Signal::<i32>::new();
    let total = Arc::new(Mutex::new(0));

    {
        let t = total.clone();
        let _guard = signal.connect_scoped(move |v| *t.lock() += v);
        signal.emit(5);
        assert_eq!(signal.connection_count(), 1);
    }
    signal.emit(7);

    assert_eq!(*total.lock(), 5);
    assert_eq!(signal.connection_count(), 0);
}

#[test]
fn test_dropped_widget_node_survives_until_released() {
    init_tracing();
    let parent = Node::new();
    let child = Node::new();
    child.base.set_parent(Some(parent.base.id())).unwrap();
    let child_id = child.base.id();

    let retained = child.base.retain().unwrap();
    drop(child);

    let registry = global_registry();
    assert_eq!(registry.parent(child_id).unwrap(), None);
    assert!(!registry.children(parent.base.id()).unwrap().contains(&child_id));

    registry.collect_garbage();
    assert!(registry.contains(child_id));

    drop(retained);
    registry.collect_garbage();
    assert!(!registry.contains(child_id));
    assert!(registry.contains(parent.base.id()));
}

#[test]
fn test_containment_rejects_cycles() {
    let mut registry = ObjectRegistry::new();
    let root = registry.register("Root");
    let child = registry.register("Child");
    let grandchild = registry.register("Grandchild");
    registry.set_parent(child, Some(root)).unwrap();
    registry.set_parent(grandchild, Some(child)).unwrap();

    assert!(registry.set_parent(root, Some(grandchild)).is_err());
    assert_eq!(registry.ancestors(grandchild).unwrap(), vec![child, root]);

    registry.destroy(child).unwrap();
    assert!(!registry.contains(grandchild));
    assert!(registry.children(root).unwrap().is_empty());
    assert_eq!(registry.parent(grandchild), Err(ObjectError::InvalidObjectId));
}

#[test]
fn test_hidden_ancestor_hides_descendants() {
    let mut registry = ObjectRegistry::new();
    let root = registry.register("Root");
    let child = registry.register("Child");
    registry.set_parent(child, Some(root)).unwrap();

    registry.set_visible(root, false).unwrap();
    assert!(registry.is_visible(child).unwrap());
    assert!(!registry.is_effectively_visible(child).unwrap());

    registry.set_enabled(root, false).unwrap();
    assert!(!registry.is_effectively_enabled(child).unwrap());
}
