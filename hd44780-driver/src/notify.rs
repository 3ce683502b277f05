//! Completion notification
//!
//! A request may carry a [`Notifier`], which the queue runner calls exactly
//! once, after the request's transaction and settle delay have finished.
//! Runners call notifiers in submission order, so a notifier observing
//! request N always runs after the one for request N-1.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::error::TransactionFault;

/// Outcome delivered to a notifier
pub type Outcome = Result<(), TransactionFault>;

/// Receiver of a request's outcome
///
/// Called from the runner's context: implementations must not block.
pub trait Notifier: Sync {
    /// Deliver the outcome of the request this notifier was attached to
    fn notify(&self, outcome: Outcome);
}

/// Awaitable completion flag
///
/// Typically a `static`:
///
/// ```ignore
/// static DONE: Completion<CriticalSectionRawMutex> = Completion::new();
///
/// lcd.clear(Some(&DONE))?;
/// DONE.wait().await?;
/// ```
pub struct Completion<M: RawMutex> {
    signal: Signal<M, Outcome>,
}

impl<M: RawMutex> Default for Completion<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> Completion<M> {
    /// Create a completion with no outcome yet
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Wait for the outcome, consuming it
    pub async fn wait(&self) -> Outcome {
        self.signal.wait().await
    }

    /// Take the outcome if one has arrived
    pub fn try_take(&self) -> Option<Outcome> {
        self.signal.try_take()
    }

    /// Whether an outcome is waiting to be taken
    pub fn is_complete(&self) -> bool {
        self.signal.signaled()
    }

    /// Drop any outcome that has not been taken
    pub fn reset(&self) {
        self.signal.reset();
    }
}

impl<M: RawMutex + Sync> Notifier for Completion<M> {
    fn notify(&self, outcome: Outcome) {
        self.signal.signal(outcome);
    }
}

/// Queue-owned completion used by fenced operations
///
/// Optionally forwards the outcome to the caller's own notifier first, so
/// the caller is notified from the runner in FIFO order rather than later
/// from the waiting task.
///
/// A fenced future dropped while its request is still queued leaves a
/// completion in flight that belongs to nobody. Each one is counted as
/// stale and swallowed when it arrives, so it cannot release a later
/// fenced operation early. Stale completions always arrive first because
/// the runner is FIFO.
pub(crate) struct Fence<M: RawMutex> {
    done: Completion<M>,
    state: Mutex<M, RefCell<FenceState>>,
}

struct FenceState {
    forward: Option<&'static dyn Notifier>,
    /// A queued request carries this fence and its waiter is still there
    armed: bool,
    /// Completions still due from abandoned waiters
    stale: u32,
}

impl<M: RawMutex> Fence<M> {
    pub(crate) const fn new() -> Self {
        Self {
            done: Completion::new(),
            state: Mutex::new(RefCell::new(FenceState {
                forward: None,
                armed: false,
                stale: 0,
            })),
        }
    }

    /// Prepare for a new fenced request
    pub(crate) fn arm(&self, forward: Option<&'static dyn Notifier>) {
        self.done.reset();
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.forward = forward;
            state.armed = true;
        });
    }

    /// Abandon an armed fence whose request never got queued
    pub(crate) fn disarm(&self) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.forward = None;
            state.armed = false;
        });
    }

    /// The waiter went away while its request may still be queued
    ///
    /// No-op if the completion already arrived. Otherwise the pending
    /// completion is marked stale and the forward target is dropped.
    pub(crate) fn abandon(&self) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.armed {
                state.armed = false;
                state.forward = None;
                state.stale += 1;
            }
        });
    }

    pub(crate) async fn wait(&self) -> Outcome {
        self.done.wait().await
    }
}

impl<M: RawMutex + Sync> Notifier for Fence<M> {
    fn notify(&self, outcome: Outcome) {
        let current = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.stale > 0 {
                state.stale -= 1;
                return None;
            }
            state.armed = false;
            Some(state.forward.take())
        });

        let Some(forward) = current else {
            #[cfg(feature = "defmt")]
            defmt::debug!("dropping completion of an abandoned fenced request");
            return;
        };
        if let Some(forward) = forward {
            forward.notify(outcome);
        }
        self.done.notify(outcome);
    }
}
