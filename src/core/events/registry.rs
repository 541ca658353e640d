//=========================================================================
// Listener Registry
//=========================================================================
//
// Bookkeeping for key and pointer listeners.
//
// Architecture:
//   key_sets:     HashMap<KeyCode, BTreeMap<UniqueId, KeyCallback>>
//   key_of:       HashMap<UniqueId, KeyCode>     (id → owning key set)
//   pointer_set:  BTreeMap<UniqueId, PointerCallback>
//
// Ids come from a monotonic generator, so ordering a set by id is the
// same as ordering it by registration. A key set is pruned as soon as it
// becomes empty.
//
// The registry is plain data; locking is the event manager's concern.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use log::{debug, error};

//=== Internal Dependencies ===============================================

use crate::core::id::UniqueId;
use crate::core::input::{KeyCode, KeyEvent, PointerEvent};

//=== Callback Types ======================================================

/// Key listener callback.
pub type KeyCallback = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

/// Pointer listener callback.
pub type PointerCallback = Arc<dyn Fn(&PointerEvent) + Send + Sync>;

//=== ListenerRegistry ====================================================

#[derive(Default)]
pub(super) struct ListenerRegistry {
    key_sets: HashMap<KeyCode, BTreeMap<UniqueId, KeyCallback>>,
    key_of: HashMap<UniqueId, KeyCode>,
    pointer_set: BTreeMap<UniqueId, PointerCallback>,
}

impl ListenerRegistry {
    //--- Registration -----------------------------------------------------

    pub(super) fn insert_key(&mut self, id: UniqueId, key: KeyCode, callback: KeyCallback) {
        self.key_sets.entry(key).or_default().insert(id, callback);
        self.key_of.insert(id, key);
    }

    pub(super) fn insert_pointer(&mut self, id: UniqueId, callback: PointerCallback) {
        self.pointer_set.insert(id, callback);
    }

    //--- Removal ----------------------------------------------------------

    /// Removes a key listener. `false` if the id is not a key listener.
    pub(super) fn remove_key(&mut self, id: UniqueId) -> bool {
        let Some(key) = self.key_of.remove(&id) else {
            return false;
        };

        let Some(set) = self.key_sets.get_mut(&key) else {
            error!(
                target: "events",
                "Listener {} maps to {:?} but no listener set exists for that key", id, key
            );
            debug_assert!(false, "listener {id} references missing key set {key:?}");
            return false;
        };

        set.remove(&id);
        if set.is_empty() {
            debug!(target: "events", "No listeners left for {:?}, pruning", key);
            self.key_sets.remove(&key);
        }

        true
    }

    /// Removes a pointer listener. `false` if the id is unknown.
    pub(super) fn remove_pointer(&mut self, id: UniqueId) -> bool {
        self.pointer_set.remove(&id).is_some()
    }

    //--- Snapshots --------------------------------------------------------

    /// Callbacks registered for `key`, in registration order.
    pub(super) fn key_snapshot(&self, key: KeyCode) -> Vec<KeyCallback> {
        self.key_sets
            .get(&key)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// All pointer callbacks.
    pub(super) fn pointer_snapshot(&self) -> Vec<PointerCallback> {
        self.pointer_set.values().cloned().collect()
    }

    //--- Queries ----------------------------------------------------------

    pub(super) fn key_listener_count(&self) -> usize {
        self.key_of.len()
    }

    pub(super) fn pointer_listener_count(&self) -> usize {
        self.pointer_set.len()
    }

    #[cfg(test)]
    pub(super) fn has_key_set(&self, key: KeyCode) -> bool {
        self.key_sets.contains_key(&key)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::id::IdGenerator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop_key() -> KeyCallback {
        Arc::new(|_: &KeyEvent| {})
    }

    fn noop_pointer() -> PointerCallback {
        Arc::new(|_: &PointerEvent| {})
    }

    #[test]
    fn empty_set_is_pruned_after_last_removal() {
        let ids = IdGenerator::new();
        let mut registry = ListenerRegistry::default();
        let a = ids.next();
        let b = ids.next();

        registry.insert_key(a, KeyCode::KeyW, noop_key());
        registry.insert_key(b, KeyCode::KeyW, noop_key());

        assert!(registry.remove_key(a));
        assert!(registry.has_key_set(KeyCode::KeyW));

        assert!(registry.remove_key(b));
        assert!(!registry.has_key_set(KeyCode::KeyW));
        assert_eq!(registry.key_listener_count(), 0);
    }

    #[test]
    fn removal_is_idempotent() {
        let ids = IdGenerator::new();
        let mut registry = ListenerRegistry::default();
        let a = ids.next();
        registry.insert_key(a, KeyCode::Space, noop_key());

        assert!(registry.remove_key(a));
        assert!(!registry.remove_key(a));
    }

    #[test]
    fn key_and_pointer_ids_do_not_cross() {
        let ids = IdGenerator::new();
        let mut registry = ListenerRegistry::default();
        let k = ids.next();
        let p = ids.next();
        registry.insert_key(k, KeyCode::KeyA, noop_key());
        registry.insert_pointer(p, noop_pointer());

        assert!(!registry.remove_pointer(k));
        assert!(!registry.remove_key(p));
        assert_eq!(registry.key_listener_count(), 1);
        assert_eq!(registry.pointer_listener_count(), 1);
    }

    #[test]
    fn key_snapshot_preserves_registration_order() {
        let ids = IdGenerator::new();
        let mut registry = ListenerRegistry::default();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        for tag in 0..4usize {
            let order = Arc::clone(&order);
            registry.insert_key(
                ids.next(),
                KeyCode::KeyQ,
                Arc::new(move |_: &KeyEvent| order.lock().push(tag)),
            );
        }

        let event = KeyEvent {
            key: KeyCode::KeyQ,
            scancode: None,
            action: crate::core::input::InputAction::Press,
            modifiers: Default::default(),
        };
        for callback in registry.key_snapshot(KeyCode::KeyQ) {
            callback(&event);
        }

        assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn snapshot_outlives_registry_mutation() {
        let ids = IdGenerator::new();
        let mut registry = ListenerRegistry::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = ids.next();
        {
            let hits = Arc::clone(&hits);
            registry.insert_pointer(id, Arc::new(move |_: &PointerEvent| {
                hits.fetch_add(1, Ordering::SeqCst);
            }));
        }

        let snapshot = registry.pointer_snapshot();
        registry.remove_pointer(id);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.pointer_snapshot().len(), 0);
    }

    #[test]
    fn unknown_key_has_empty_snapshot() {
        let registry = ListenerRegistry::default();
        assert!(registry.key_snapshot(KeyCode::Escape).is_empty());
    }
}
