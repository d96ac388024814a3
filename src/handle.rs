//! Liveness-tracked handles to a single backend database.

use crate::backend::{self, Address, Database};

use debug_ignore::DebugIgnore;
use derive_where::derive_where;
use std::sync::atomic::{AtomicU8, Ordering};

/// The liveness of a backend, as observed by health checks or set by an
/// administrator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum State {
    /// Healthy, and managed automatically by health checks.
    Up = 0,

    /// Marked down after sustained health check failure.
    Down = 1,

    /// Marked down by an administrator.
    ///
    /// Health checks never leave this state on their own.
    ManualDown = 2,
}

impl State {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => State::Up,
            1 => State::Down,
            _ => State::ManualDown,
        }
    }
}

// A State which can be read and transitioned without holding any lock.
#[derive(Debug)]
struct AtomicState(AtomicU8);

impl AtomicState {
    fn new(state: State) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    fn load(&self) -> State {
        State::from_u8(self.0.load(Ordering::Acquire))
    }

    fn store(&self, state: State) {
        self.0.store(state as u8, Ordering::Release);
    }

    fn compare_exchange(&self, current: State, new: State) -> bool {
        self.0
            .compare_exchange(
                current as u8,
                new as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// A [Database] for one `(address, user)` pair, along with its liveness.
#[derive_where(Debug)]
pub struct ConnHandle<D: Database> {
    address: Address,
    user: String,
    state: AtomicState,
    db: DebugIgnore<D>,
}

impl<D: Database> ConnHandle<D> {
    /// Wraps a freshly opened database, which starts out [State::Up].
    pub fn new(address: Address, user: impl Into<String>, db: D) -> Self {
        Self {
            address,
            user: user.into(),
            state: AtomicState::new(State::Up),
            db: DebugIgnore(db),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn state(&self) -> State {
        self.state.load()
    }

    /// Unconditionally replaces the liveness state.
    pub fn set_state(&self, state: State) {
        self.state.store(state);
    }

    /// Marks the handle [State::Up], unless it is [State::ManualDown].
    ///
    /// Returns the state observed before the transition.
    pub fn mark_up(&self) -> State {
        let previous = self
            .state
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                match State::from_u8(current) {
                    State::ManualDown => None,
                    _ => Some(State::Up as u8),
                }
            })
            .unwrap_or_else(|current| current);
        State::from_u8(previous)
    }

    /// Transitions from [State::Up] to [State::Down].
    ///
    /// Returns false if the handle was not up, leaving it untouched.
    pub fn try_mark_down(&self) -> bool {
        self.state.compare_exchange(State::Up, State::Down)
    }

    pub async fn ping(&self) -> Result<(), backend::Error> {
        self.db.ping().await
    }

    pub async fn close(&self) {
        self.db.close().await
    }

    /// Leases a connection from the underlying database.
    ///
    /// This does not consult the liveness state; callers gate on
    /// [Self::state] first.
    pub async fn get_conn(&self) -> Result<D::Connection, backend::Error> {
        self.db.get_conn().await
    }
}
