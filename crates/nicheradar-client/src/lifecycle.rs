//! Request lifecycle state machine shared by the catalog and detail views.
//!
//! `Idle -> Loading -> Success | Error`, re-enterable from either terminal
//! phase. Each trigger takes a [`RequestToken`]; only the result carrying the
//! most recent token may settle the machine. Observers read the current
//! state or subscribe to changes through a `watch` channel.

use tokio::sync::watch;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of one fetch site.
///
/// `Success` carries the data and `Error` the message, so a state can never
/// hold both, and `Loading` holds neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> LifecycleState<T> {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Loading => Phase::Loading,
            Self::Success(_) => Phase::Success,
            Self::Error(_) => Phase::Error,
        }
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Identifies one trigger of a [`RequestLifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// What [`RequestLifecycle::settle`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Applied,
    /// A newer request was triggered after this one; the result was dropped.
    Discarded,
}

#[derive(Debug)]
struct Inner<T> {
    latest: u64,
    state: LifecycleState<T>,
}

/// One fetch site's state machine.
///
/// Triggering and settling both go through the `watch` sender's lock, so
/// the token comparison and the state write happen atomically even when
/// several requests overlap.
#[derive(Debug)]
pub struct RequestLifecycle<T> {
    tx: watch::Sender<Inner<T>>,
}

impl<T> Default for RequestLifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestLifecycle<T> {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Inner {
            latest: 0,
            state: LifecycleState::Idle,
        });
        Self { tx }
    }

    /// Moves to `Loading`, clearing any previous data or error, and returns
    /// the token the eventual result must present.
    pub fn begin(&self) -> RequestToken {
        let mut token = RequestToken(0);
        self.tx.send_modify(|inner| {
            inner.latest += 1;
            inner.state = LifecycleState::Loading;
            token = RequestToken(inner.latest);
        });
        tracing::trace!(sequence = token.0, "lifecycle loading");
        token
    }

    /// Applies `result` if `token` belongs to the most recent trigger.
    ///
    /// Observers are only notified when the state actually changes.
    pub fn settle(&self, token: RequestToken, result: Result<T, FetchError>) -> Settled {
        let mut outcome = Settled::Discarded;
        self.tx.send_if_modified(|inner| {
            if inner.latest != token.0 {
                return false;
            }
            inner.state = match result {
                Ok(data) => LifecycleState::Success(data),
                Err(err) => LifecycleState::Error(err.to_string()),
            };
            outcome = Settled::Applied;
            true
        });

        if outcome == Settled::Discarded {
            tracing::debug!(sequence = token.0, "discarding stale response");
        }
        outcome
    }

    /// Token of the most recent trigger, if any.
    #[must_use]
    pub fn latest_token(&self) -> Option<RequestToken> {
        let latest = self.tx.borrow().latest;
        (latest > 0).then_some(RequestToken(latest))
    }

    /// Subscribes to state changes. The receiver starts out having seen the
    /// current state.
    #[must_use]
    pub fn subscribe(&self) -> StateReceiver<T> {
        StateReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone> RequestLifecycle<T> {
    /// Clones the current state.
    #[must_use]
    pub fn current(&self) -> LifecycleState<T> {
        self.tx.borrow().state.clone()
    }
}

/// Observer handle returned by [`RequestLifecycle::subscribe`].
#[derive(Debug, Clone)]
pub struct StateReceiver<T> {
    rx: watch::Receiver<Inner<T>>,
}

impl<T: Clone> StateReceiver<T> {
    /// Waits for the next state change.
    ///
    /// # Errors
    ///
    /// Returns `watch::error::RecvError` once the owning lifecycle has been
    /// dropped.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }

    /// Clones the latest state and marks it seen.
    pub fn latest(&mut self) -> LifecycleState<T> {
        self.rx.borrow_and_update().state.clone()
    }
}
