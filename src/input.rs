use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use parking_lot::Mutex;

/// Platform-neutral key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Esc,
    Space,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Bindings {
    pressed: HashSet<Key>,
    callbacks: HashMap<Key, Vec<(CallbackId, Callback)>>,
    next_id: u64,
}

/// Set of currently held keys, fed by the windowing side and read by paddles
/// on the update thread.
///
/// Key-press callbacks are edge-triggered: they fire when a key goes from
/// released to held, never while it stays held.
#[derive(Default)]
pub struct InputState {
    bindings: Mutex<Bindings>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as held. Returns `true` when this was a fresh press.
    pub fn press(&self, key: Key) -> bool {
        let fired: Vec<Callback> = {
            let mut bindings = self.bindings.lock();
            if !bindings.pressed.insert(key) {
                return false;
            }
            bindings
                .callbacks
                .get(&key)
                .map(|callbacks| callbacks.iter().map(|(_, callback)| Arc::clone(callback)).collect())
                .unwrap_or_default()
        };

        // Outside the lock so callbacks may query or register keys.
        for callback in fired {
            callback();
        }
        true
    }

    pub fn release(&self, key: Key) {
        self.bindings.lock().pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.bindings.lock().pressed.contains(&key)
    }

    pub fn pressed_keys(&self) -> Vec<Key> {
        self.bindings.lock().pressed.iter().copied().collect()
    }

    /// Release every held key, e.g. when the window loses focus.
    pub fn clear(&self) {
        self.bindings.lock().pressed.clear();
    }

    pub fn on_press(&self, key: Key, callback: impl Fn() + Send + Sync + 'static) -> CallbackId {
        let mut bindings = self.bindings.lock();
        let id = CallbackId(bindings.next_id);
        bindings.next_id += 1;
        bindings
            .callbacks
            .entry(key)
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    pub fn remove_callback(&self, id: CallbackId) -> bool {
        let mut bindings = self.bindings.lock();
        for callbacks in bindings.callbacks.values_mut() {
            if let Some(index) = callbacks.iter().position(|(existing, _)| *existing == id) {
                callbacks.remove(index);
                return true;
            }
        }
        false
    }
}

impl fmt::Debug for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.bindings.lock();
        f.debug_struct("InputState")
            .field("pressed", &bindings.pressed)
            .field("callbacks", &bindings.callbacks.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(input: &InputState, key: Key) -> (Arc<AtomicUsize>, CallbackId) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&count);
        let id = input.on_press(key, move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        (count, id)
    }

    #[test]
    fn press_and_release_track_held_keys() {
        let input = InputState::new();
        assert!(!input.is_pressed(Key::Up));

        input.press(Key::Up);
        assert!(input.is_pressed(Key::Up));
        assert!(!input.is_pressed(Key::Down));

        input.release(Key::Up);
        assert!(!input.is_pressed(Key::Up));
    }

    #[test]
    fn callbacks_fire_once_per_press_not_per_repeat() {
        let input = InputState::new();
        let (count, _) = counter(&input, Key::Char('b'));

        assert!(input.press(Key::Char('b')));
        assert!(!input.press(Key::Char('b')));
        assert!(!input.press(Key::Char('b')));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        input.release(Key::Char('b'));
        input.press(Key::Char('b'));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn removed_callbacks_stop_firing() {
        let input = InputState::new();
        let (kept, _) = counter(&input, Key::Esc);
        let (removed, id) = counter(&input, Key::Esc);

        assert!(input.remove_callback(id));
        assert!(!input.remove_callback(id));

        input.press(Key::Esc);
        assert_eq!(kept.load(Ordering::SeqCst), 1);
        assert_eq!(removed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn callbacks_can_read_the_input_state() {
        let input = Arc::new(InputState::new());
        let seen = Arc::new(AtomicUsize::new(0));
        {
            let input_ref = Arc::clone(&input);
            let seen = Arc::clone(&seen);
            input.on_press(Key::Space, move || {
                if input_ref.is_pressed(Key::Space) {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        input.press(Key::Space);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_releases_everything() {
        let input = InputState::new();
        input.press(Key::Up);
        input.press(Key::Char('w'));
        input.clear();
        assert!(input.pressed_keys().is_empty());
    }
}
