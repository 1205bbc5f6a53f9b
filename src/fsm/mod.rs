//! Table-driven finite state machine core.
//!
//! Classic embedded FSM pattern expressed in safe Rust:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  TransitionTable                                       │
//! │           event 0     event 1     event 2              │
//! │  state 0  Some(S1)    None        Some(S2)             │
//! │  state 1  None        Some(S0)    Some(S2)             │
//! │  state 2  None        None        None                 │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Each machine owns one `const` table, total by construction: every
//! (state, event) pair maps to either a valid next state or `None`,
//! the **ignore sentinel**. An ignored pair produces no state change
//! and no side effect — a deliberate no-op, never an error. The
//! sentinel is an `Option` variant, not an out-of-range index, so it
//! can never become an active state.
//!
//! The concrete machines live in the submodules; each consumes events
//! from its own bounded channel and dispatches entry actions by
//! matching on the state it just entered.

pub mod connection;
pub mod delivery;
pub mod tilt;

use log::{debug, trace};

/// Implemented by every state and event enum that indexes a transition
/// table. Discriminants are dense, starting at zero.
pub trait TableEnum: Copy + Eq + core::fmt::Debug {
    /// Total number of variants — sizes the table dimension.
    const COUNT: usize;

    /// Dense index of this variant.
    fn index(self) -> usize;
}

/// An immutable (state, event) → next-state table.
///
/// `NS`/`NE` are the state and event counts; construction with
/// mismatched row/column lengths fails to compile at the use site.
pub struct TransitionTable<S: TableEnum, const NS: usize, const NE: usize> {
    rows: [[Option<S>; NE]; NS],
}

impl<S: TableEnum, const NS: usize, const NE: usize> TransitionTable<S, NS, NE> {
    pub const fn new(rows: [[Option<S>; NE]; NS]) -> Self {
        Self { rows }
    }

    /// Look up the transition for (state, event). `None` is the ignore
    /// sentinel.
    pub fn next<E: TableEnum>(&self, state: S, event: E) -> Option<S> {
        debug_assert_eq!(NS, S::COUNT);
        debug_assert_eq!(NE, E::COUNT);
        self.rows[state.index()][event.index()]
    }

    /// Advance `current` per the table. Returns the newly entered state
    /// so the caller can run its entry action, or `None` if the event
    /// was ignored.
    pub fn step<E: TableEnum>(&self, current: &mut S, event: E, name: &'static str) -> Option<S> {
        match self.next(*current, event) {
            Some(next) => {
                debug!("{name}: {:?} --{:?}--> {:?}", *current, event, next);
                *current = next;
                Some(next)
            }
            None => {
                // Silent by design; at most a trace for bench debugging.
                trace!("{name}: {:?} ignores {:?}", *current, event);
                None
            }
        }
    }
}
