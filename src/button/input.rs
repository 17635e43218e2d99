//! Interrupt side of a button.
//!
//! The pin-change handler posts debounced edges into a single-slot mailbox;
//! the gesture state machine consumes them from the poll loop. A new edge
//! overwrites an unread one, so rapid double edges inside one poll cycle
//! collapse into the latest.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time::Duration;
use embedded_hal::digital::InputPin;

use crate::timestamp::Timestamp;

/// Edges closer than this to the previous accepted edge are dropped
pub const DEBOUNCE_TIME: Duration = Duration::from_millis(20);

/// Debounced edge posted by the pin-change interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy)]
struct InputState {
    action: Option<ButtonAction>,
    last_edge: Option<Timestamp>,
}

/// Debounce filter and single-slot edge mailbox of one button
pub struct ButtonInput {
    debounce: Duration,
    state: Mutex<Cell<InputState>>,
}

impl ButtonInput {
    /// Create a new input with the default debounce window
    pub const fn new() -> Self {
        Self::with_debounce(DEBOUNCE_TIME)
    }

    /// Create a new input with a custom debounce window
    pub const fn with_debounce(debounce: Duration) -> Self {
        Self {
            debounce,
            state: Mutex::new(Cell::new(InputState {
                action: None,
                last_edge: None,
            })),
        }
    }

    /// Record an edge from the pin-change interrupt
    ///
    /// Returns `false` if the edge fell inside the debounce window.
    pub fn on_edge(&self, pressed: bool, now: Timestamp) -> bool {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            if let Some(last) = state.last_edge {
                if now.duration_since(last) <= self.debounce {
                    return false;
                }
            }

            state.last_edge = Some(now);
            state.action = Some(if pressed {
                ButtonAction::Pressed
            } else {
                ButtonAction::Released
            });
            cell.set(state);
            true
        })
    }

    /// Sample an active-low pin and record the edge
    ///
    /// Read errors drop the edge.
    pub fn on_pin_change<P: InputPin>(&self, pin: &mut P, now: Timestamp) -> bool {
        match pin.is_low() {
            Ok(pressed) => self.on_edge(pressed, now),
            Err(_) => false,
        }
    }

    /// Unread edge, if any
    pub fn pending(&self) -> Option<ButtonAction> {
        critical_section::with(|cs| self.state.borrow(cs).get().action)
    }

    /// Take the unread edge if `accept` agrees, leave it in place otherwise
    pub(crate) fn take_if(&self, accept: impl FnOnce(ButtonAction) -> bool) -> Option<ButtonAction> {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let action = state.action.filter(|action| accept(*action))?;
            state.action = None;
            cell.set(state);
            Some(action)
        })
    }

    /// Drop any unread edge
    pub(crate) fn clear(&self) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            state.action = None;
            cell.set(state);
        });
    }
}

impl Default for ButtonInput {
    fn default() -> Self {
        Self::new()
    }
}
