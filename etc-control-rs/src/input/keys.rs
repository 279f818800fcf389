use heapless::Vec;

use super::{DEBOUNCE_GENERATIONS, KEY_PRESSED_VALUE, KEY_RELEASED_VALUE, MAX_KEYS};

/// A confirmed key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    /// Key index, 0-based.
    pub index: usize,
    pub pressed: bool,
}

impl KeyEvent {
    /// Value sent to the host: 100 for pressed, 0 for released.
    pub fn value(&self) -> i32 {
        if self.pressed {
            KEY_PRESSED_VALUE
        } else {
            KEY_RELEASED_VALUE
        }
    }
}

/// Transitions produced by one scan. At most one per key.
pub type KeyEvents = Vec<KeyEvent, MAX_KEYS>;

/// Generation-ring debouncer for the key inputs.
///
/// Every scan writes the raw state of each key into the current generation
/// slot and advances the ring. A key is reported pressed only once all
/// [`DEBOUNCE_GENERATIONS`] slots read pressed, and released only once all
/// read released. Contact bounce shorter than the ring never produces an
/// event, at the cost of three extra scans of latency.
#[derive(Debug, Clone)]
pub struct KeyScanner {
    generations: [[bool; MAX_KEYS]; DEBOUNCE_GENERATIONS],
    generation: usize,
    reported: [bool; MAX_KEYS],
    key_count: usize,
}

impl KeyScanner {
    /// Create a scanner for `key_count` keys, all released.
    ///
    /// `key_count` is clamped to [`MAX_KEYS`]; [`Profile::validate()`]
    /// rejects larger values before a scanner is ever built.
    ///
    /// [`Profile::validate()`]: crate::Profile::validate
    pub fn new(key_count: usize) -> Self {
        Self {
            generations: [[false; MAX_KEYS]; DEBOUNCE_GENERATIONS],
            generation: 0,
            reported: [false; MAX_KEYS],
            key_count: key_count.min(MAX_KEYS),
        }
    }

    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Last reported state of `index`.
    pub fn is_pressed(&self, index: usize) -> bool {
        index < self.key_count && self.reported[index]
    }

    /// Run one scan cycle. `pressed(i)` returns the raw state of key `i`.
    pub fn scan(&mut self, mut pressed: impl FnMut(usize) -> bool) -> KeyEvents {
        let slot = &mut self.generations[self.generation];
        for (index, raw) in slot.iter_mut().enumerate().take(self.key_count) {
            *raw = pressed(index);
        }
        self.generation = (self.generation + 1) % DEBOUNCE_GENERATIONS;

        let mut events = KeyEvents::new();
        for index in 0..self.key_count {
            let all_pressed = self.generations.iter().all(|g| g[index]);
            let all_released = self.generations.iter().all(|g| !g[index]);

            let transition = if all_pressed && !self.reported[index] {
                Some(true)
            } else if all_released && self.reported[index] {
                Some(false)
            } else {
                None
            };

            if let Some(pressed) = transition {
                self.reported[index] = pressed;
                // Capacity is MAX_KEYS and there is at most one event per key.
                let _ = events.push(KeyEvent { index, pressed });
            }
        }

        events
    }
}
