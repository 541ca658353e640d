//=========================================================================
// Event Manager
//=========================================================================
//
// Thread-safe input ingestion plus per-frame listener dispatch.
//
// Architecture:
// ```text
//  Any thread:                         Owner thread (once per frame):
//  enqueue_key_event ──┐               process_waiting_events(ui_root)
//  enqueue_pointer ────┤                 1. cursor.refresh()
//                      ▼                 2. swap queue for empty (short lock)
//              RwLock<Vec<InputEvent>> ──┘ 3. per event, in arrival order:
//                                            snapshot listeners (short lock)
//  register_* / remove_* ──► RwLock<ListenerRegistry>
//                                            invoke callbacks (no locks held)
//                                            pointer: UI hit-test
// ```
//
// Neither lock is ever held while a callback runs, so a listener may
// register or remove listeners, or enqueue further events, from inside
// its own callback. Events enqueued during dispatch land in the fresh
// queue and are delivered on the next pass.
//
// One event manager exists per window and is shared (via `Arc`) by every
// context that window hosts, including contexts created by a scene swap.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::{debug, trace};
use parking_lot::RwLock;

//=== Internal Dependencies ===============================================

use super::registry::{KeyCallback, ListenerRegistry, PointerCallback};
use crate::core::id::{IdGenerator, UniqueId};
use crate::core::input::{
    Cursor, InputAction, InputEvent, KeyCode, KeyEvent, Modifiers, MouseButton, PointerDevice,
    PointerEvent,
};
use crate::core::scene::UiRoot;

//=== DispatchSummary =====================================================

/// What a single [`EventManager::process_waiting_events`] pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Key events taken from the queue.
    pub key_events: usize,

    /// Pointer events taken from the queue.
    pub pointer_events: usize,

    /// Pointer events forwarded to the UI root.
    pub ui_clicks: usize,
}

impl DispatchSummary {
    pub fn total(&self) -> usize {
        self.key_events + self.pointer_events
    }
}

//=== EventManager ========================================================

/// Input queue, listener registry and cursor for one window.
pub struct EventManager {
    queue: RwLock<Vec<InputEvent>>,
    listeners: RwLock<ListenerRegistry>,
    cursor: Arc<Cursor>,
    ids: &'static IdGenerator,
}

impl EventManager {
    //--- Construction -----------------------------------------------------

    /// Creates an event manager whose cursor samples `pointer`.
    pub fn new(pointer: Arc<dyn PointerDevice>) -> Self {
        Self {
            queue: RwLock::new(Vec::new()),
            listeners: RwLock::new(ListenerRegistry::default()),
            cursor: Arc::new(Cursor::new(pointer)),
            ids: IdGenerator::global(),
        }
    }

    /// The window's cursor.
    pub fn cursor(&self) -> Arc<Cursor> {
        Arc::clone(&self.cursor)
    }

    //--- Listener Registration --------------------------------------------

    /// Registers `callback` for events on `key`. Returns the listener id.
    pub fn register_key_listener<F>(&self, key: KeyCode, callback: F) -> UniqueId
    where
        F: Fn(&KeyEvent) + Send + Sync + 'static,
    {
        let callback: KeyCallback = Arc::new(callback);
        let id = self.ids.next();
        self.listeners.write().insert_key(id, key, callback);
        trace!(target: "events", "Key listener {} registered for {:?}", id, key);
        id
    }

    /// Registers `callback` for every pointer button event.
    pub fn register_pointer_listener<F>(&self, callback: F) -> UniqueId
    where
        F: Fn(&PointerEvent) + Send + Sync + 'static,
    {
        let callback: PointerCallback = Arc::new(callback);
        let id = self.ids.next();
        self.listeners.write().insert_pointer(id, callback);
        trace!(target: "events", "Pointer listener {} registered", id);
        id
    }

    /// Removes a key listener.
    ///
    /// Returns `false` if `id` was never registered as a key listener or
    /// has already been removed. Safe to call unconditionally.
    pub fn remove_key_listener(&self, id: UniqueId) -> bool {
        let removed = self.listeners.write().remove_key(id);
        if !removed {
            debug!(target: "events", "remove_key_listener: {} not registered", id);
        }
        removed
    }

    /// Removes a pointer listener. Same contract as
    /// [`EventManager::remove_key_listener`].
    pub fn remove_pointer_listener(&self, id: UniqueId) -> bool {
        let removed = self.listeners.write().remove_pointer(id);
        if !removed {
            debug!(target: "events", "remove_pointer_listener: {} not registered", id);
        }
        removed
    }

    pub fn key_listener_count(&self) -> usize {
        self.listeners.read().key_listener_count()
    }

    pub fn pointer_listener_count(&self) -> usize {
        self.listeners.read().pointer_listener_count()
    }

    //--- Ingestion --------------------------------------------------------

    /// Queues an event. Never blocks on listener execution.
    pub fn enqueue(&self, event: InputEvent) {
        self.queue.write().push(event);
    }

    /// Queues a key event.
    pub fn enqueue_key_event(
        &self,
        key: KeyCode,
        scancode: Option<u32>,
        action: InputAction,
        modifiers: Modifiers,
    ) {
        self.enqueue(InputEvent::Key(KeyEvent {
            key,
            scancode,
            action,
            modifiers,
        }));
    }

    /// Queues a pointer button event. The position is sampled from the
    /// cursor at dispatch time.
    pub fn enqueue_pointer_event(&self, button: MouseButton, action: InputAction, modifiers: Modifiers) {
        self.enqueue(InputEvent::Pointer {
            button,
            action,
            modifiers,
        });
    }

    /// Number of events waiting for the next dispatch pass.
    pub fn pending_events(&self) -> usize {
        self.queue.read().len()
    }

    //--- Dispatch ---------------------------------------------------------

    /// Delivers every event queued before this call, in arrival order.
    ///
    /// `ui_root` is the active scene's UI root; pointer events that land
    /// inside it are forwarded as clicks unless the cursor is locked.
    pub fn process_waiting_events(&self, ui_root: Option<&dyn UiRoot>) -> DispatchSummary {
        self.cursor.refresh();

        let events = std::mem::take(&mut *self.queue.write());
        let mut summary = DispatchSummary::default();

        if events.is_empty() {
            return summary;
        }

        trace!(target: "events", "Dispatching {} queued events", events.len());

        for event in events {
            match event {
                InputEvent::Key(key_event) => {
                    summary.key_events += 1;
                    self.dispatch_key(&key_event);
                }
                InputEvent::Pointer {
                    button,
                    action,
                    modifiers,
                } => {
                    summary.pointer_events += 1;
                    let absolute = self.cursor.position().to_pair();
                    let pointer_event = PointerEvent {
                        button,
                        action,
                        modifiers,
                        absolute_position: absolute,
                        local_position: absolute,
                    };

                    self.dispatch_pointer(&pointer_event);

                    if let Some(root) = ui_root {
                        if self.hit_test(root, &pointer_event) {
                            summary.ui_clicks += 1;
                        }
                    }
                }
            }
        }

        summary
    }

    //--- Internal Helpers -------------------------------------------------

    fn dispatch_key(&self, event: &KeyEvent) {
        let callbacks = self.listeners.read().key_snapshot(event.key);
        for callback in callbacks {
            callback(event);
        }
    }

    fn dispatch_pointer(&self, event: &PointerEvent) {
        let callbacks = self.listeners.read().pointer_snapshot();
        for callback in callbacks {
            callback(event);
        }
    }

    /// Forwards `event` to `root` if it lands inside and the cursor is
    /// free. Returns whether the click was delivered.
    fn hit_test(&self, root: &dyn UiRoot, event: &PointerEvent) -> bool {
        if self.cursor.is_locked() {
            return false;
        }

        let local = event.relative_to(root.position());
        let (x, y) = local.local_position;
        let (width, height) = root.dimensions();

        if x >= 0.0 && y >= 0.0 && x < width && y < height {
            root.handle_click(&local);
            true
        } else {
            false
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
