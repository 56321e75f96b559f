// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Input state tracking and synthesis of input events.
//!
//! Platform layers report raw input through an [`InputDispatcher`], either by
//! calling its methods directly or by translating their native events into
//! [`RawInput`]. The dispatcher updates the [`InputState`] and posts the
//! matching event synchronously through the event manager; input events never
//! go through the cross-thread queue.

use pdg_core::event::{KeyInfo, KeyPressInfo, ModifierKeys, MouseInfo, Point, ScrollWheelInfo};
use pdg_core::{EventManager, EventPayload, EventType};
use std::collections::HashSet;

/// Number of pointers (mice or fingers) whose position is tracked.
pub const MAX_POINTERS: usize = 16;
/// Number of raw key codes whose state is tracked.
pub const MAX_RAW_KEYS: usize = 256;
/// Number of mouse buttons whose state is tracked.
pub const MAX_MOUSE_BUTTONS: usize = 256;
/// Character codes at or above this value are not tracked.
pub const MAX_CHAR_KEYS: u16 = 0x7fff;

/// What a mouse event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    /// A button (or finger) went down.
    Down,
    /// A button (or finger) went up.
    Up,
    /// The pointer moved, with or without a button held.
    Moved,
}

/// A backend-agnostic input occurrence, as reported by a platform layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    /// A physical key went down.
    KeyDown {
        /// Platform virtual key code.
        key_code: i32,
        /// Character produced by the key, 0 if none.
        unicode: u16,
    },
    /// A physical key went up.
    KeyUp {
        /// Platform virtual key code.
        key_code: i32,
        /// Character produced by the key, 0 if none.
        unicode: u16,
    },
    /// A character was typed or is auto-repeating.
    KeyPress {
        /// Character or [`keys`](pdg_core::event::keys) code.
        unicode: u16,
        /// Auto-repeat rather than a fresh press.
        is_repeating: bool,
        /// Modifier keys held.
        modifiers: ModifierKeys,
    },
    /// Mouse or touch activity.
    Mouse {
        /// What happened.
        action: MouseAction,
        /// Horizontal position in port coordinates.
        x: f32,
        /// Vertical position in port coordinates.
        y: f32,
        /// Button or finger number.
        button: u8,
        /// Modifier keys held.
        modifiers: ModifierKeys,
    },
    /// The scroll wheel moved.
    ScrollWheel {
        /// Horizontal delta.
        horiz_delta: i32,
        /// Vertical delta.
        vert_delta: i32,
        /// Modifier keys held.
        modifiers: ModifierKeys,
    },
}

/// The current state of keys, buttons and pointers.
#[derive(Debug, Clone)]
pub struct InputState {
    raw_keys: [bool; MAX_RAW_KEYS],
    char_keys: HashSet<u16>,
    buttons: [bool; MAX_MOUSE_BUTTONS],
    pointers: [Point; MAX_POINTERS],
    max_attached_pointer: usize,
    last_click_pos: Point,
    last_click_ms: u64,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            raw_keys: [false; MAX_RAW_KEYS],
            char_keys: HashSet::new(),
            buttons: [false; MAX_MOUSE_BUTTONS],
            pointers: [Point::default(); MAX_POINTERS],
            max_attached_pointer: 0,
            last_click_pos: Point::default(),
            last_click_ms: 0,
        }
    }
}

impl InputState {
    /// Creates a state with every key and button up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the key with this platform code is down. Out-of-range codes
    /// read as up.
    pub fn raw_key_state(&self, key_code: i32) -> bool {
        usize::try_from(key_code)
            .ok()
            .and_then(|i| self.raw_keys.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Whether the key producing `key_char` is down. `0` always reads as up.
    pub fn key_state(&self, key_char: u16) -> bool {
        self.char_keys.contains(&key_char)
    }

    /// Whether mouse button `button` is down.
    pub fn button_state(&self, button: i32) -> bool {
        usize::try_from(button)
            .ok()
            .and_then(|i| self.buttons.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Last known position of pointer `n`. Pointers that have never been seen
    /// report the primary pointer's position.
    pub fn mouse_pos(&self, n: usize) -> Point {
        if n < MAX_POINTERS && n <= self.max_attached_pointer {
            self.pointers[n]
        } else {
            self.pointers[0]
        }
    }

    /// Where the last button-down happened.
    pub fn last_click_pos(&self) -> Point {
        self.last_click_pos
    }

    fn set_key(&mut self, key_code: i32, key_char: u16, down: bool) {
        if let Some(slot) = usize::try_from(key_code)
            .ok()
            .and_then(|i| self.raw_keys.get_mut(i))
        {
            *slot = down;
        }
        if key_char > 0 && key_char < MAX_CHAR_KEYS {
            if down {
                self.char_keys.insert(key_char);
            } else {
                self.char_keys.remove(&key_char);
            }
        }
    }
}

/// Updates an [`InputState`] and posts the corresponding input events.
///
/// Handed to [`InputPoller::poll_input`](crate::InputPoller::poll_input) once
/// per loop iteration. Every method returns whether a handler consumed the
/// event it posted.
pub struct InputDispatcher<'a> {
    state: &'a mut InputState,
    events: &'a EventManager,
    now_ms: u64,
    posted: usize,
}

impl<'a> InputDispatcher<'a> {
    /// Creates a dispatcher stamping events with `now_ms`.
    pub fn new(state: &'a mut InputState, events: &'a EventManager, now_ms: u64) -> Self {
        Self {
            state,
            events,
            now_ms,
            posted: 0,
        }
    }

    /// The state as updated so far.
    pub fn state(&self) -> &InputState {
        self.state
    }

    /// Number of events posted through this dispatcher.
    pub fn posted(&self) -> usize {
        self.posted
    }

    fn post(&mut self, event_type: EventType, payload: EventPayload) -> bool {
        self.posted += 1;
        self.events.post_event(event_type, &payload, None)
    }

    /// Records a key going down and posts [`EventType::KEY_DOWN`].
    pub fn key_down(&mut self, key_code: i32, unicode: u16) -> bool {
        self.state.set_key(key_code, unicode, true);
        self.post(EventType::KEY_DOWN, EventPayload::Key(KeyInfo { key_code }))
    }

    /// Records a key going up and posts [`EventType::KEY_UP`].
    pub fn key_up(&mut self, key_code: i32, unicode: u16) -> bool {
        self.state.set_key(key_code, unicode, false);
        self.post(EventType::KEY_UP, EventPayload::Key(KeyInfo { key_code }))
    }

    /// Posts [`EventType::KEY_PRESS`].
    pub fn key_press(&mut self, unicode: u16, is_repeating: bool, modifiers: ModifierKeys) -> bool {
        self.post(
            EventType::KEY_PRESS,
            EventPayload::KeyPress(KeyPressInfo {
                modifiers,
                unicode,
                is_repeating,
            }),
        )
    }

    /// Records mouse or touch activity and posts the matching mouse event.
    ///
    /// A button-down also becomes the new "last click". A move reported for a
    /// button number not seen before starts tracking that pointer.
    pub fn mouse(
        &mut self,
        action: MouseAction,
        x: f32,
        y: f32,
        button: u8,
        modifiers: ModifierKeys,
    ) -> bool {
        let index = usize::from(button);
        let state = &mut *self.state;
        match action {
            MouseAction::Down => state.buttons[index] = true,
            MouseAction::Up => state.buttons[index] = false,
            MouseAction::Moved => {
                if index > state.max_attached_pointer && index < MAX_POINTERS {
                    state.max_attached_pointer = index;
                }
            }
        }

        let mouse_pos = Point::new(x.floor(), y.floor());
        let info = MouseInfo {
            modifiers,
            mouse_pos,
            left_button: state.buttons[0],
            right_button: state.buttons[1],
            button_number: button,
            last_click_pos: state.last_click_pos,
            last_click_elapsed_ms: self.now_ms.saturating_sub(state.last_click_ms),
        };
        if index <= state.max_attached_pointer {
            state.pointers[index] = mouse_pos;
        }

        let event_type = match action {
            MouseAction::Down => {
                state.last_click_ms = self.now_ms;
                state.last_click_pos = mouse_pos;
                EventType::MOUSE_DOWN
            }
            MouseAction::Up => EventType::MOUSE_UP,
            MouseAction::Moved => EventType::MOUSE_MOVE,
        };
        self.post(event_type, EventPayload::Mouse(info))
    }

    /// Posts [`EventType::SCROLL_WHEEL`].
    pub fn scroll_wheel(&mut self, horiz_delta: i32, vert_delta: i32, modifiers: ModifierKeys) -> bool {
        self.post(
            EventType::SCROLL_WHEEL,
            EventPayload::ScrollWheel(ScrollWheelInfo {
                modifiers,
                horiz_delta,
                vert_delta,
            }),
        )
    }

    /// Routes a [`RawInput`] to the matching method.
    pub fn dispatch(&mut self, input: RawInput) -> bool {
        match input {
            RawInput::KeyDown { key_code, unicode } => self.key_down(key_code, unicode),
            RawInput::KeyUp { key_code, unicode } => self.key_up(key_code, unicode),
            RawInput::KeyPress {
                unicode,
                is_repeating,
                modifiers,
            } => self.key_press(unicode, is_repeating, modifiers),
            RawInput::Mouse {
                action,
                x,
                y,
                button,
                modifiers,
            } => self.mouse(action, x, y, button, modifiers),
            RawInput::ScrollWheel {
                horiz_delta,
                vert_delta,
                modifiers,
            } => self.scroll_wheel(horiz_delta, vert_delta, modifiers),
        }
    }
}
