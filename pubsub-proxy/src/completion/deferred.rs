//! Single-value completion pair.

use crate::completion::thenable::{ProgressFn, Reactions, Thenable};
use crate::error::CompletionError;
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

#[derive(Clone, Debug)]
enum Settlement {
    Fulfilled(Value),
    Rejected(CompletionError),
}

impl Settlement {
    fn deliver(self, reactions: Reactions) {
        match self {
            Settlement::Fulfilled(value) => reactions.fulfill(value),
            Settlement::Rejected(reason) => reactions.reject(reason),
        }
    }

    fn into_result(self) -> Result<Value, CompletionError> {
        match self {
            Settlement::Fulfilled(value) => Ok(value),
            Settlement::Rejected(reason) => Err(reason),
        }
    }
}

enum State {
    Pending {
        reactions: Vec<Reactions>,
        wakers: Vec<Waker>,
    },
    Settled(Settlement),
}

type SharedState = Arc<Mutex<State>>;

/// Producer half. Settles its [`Promise`] at most once.
#[derive(Clone)]
pub struct Deferred {
    shared: SharedState,
}

impl Deferred {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(State::Pending {
                reactions: Vec::new(),
                wakers: Vec::new(),
            })),
        }
    }

    pub fn promise(&self) -> Promise {
        Promise {
            shared: self.shared.clone(),
        }
    }

    /// Returns `false` when the promise was already settled.
    pub fn resolve(&self, value: Value) -> bool {
        self.settle(Settlement::Fulfilled(value))
    }

    /// Returns `false` when the promise was already settled.
    pub fn reject(&self, reason: CompletionError) -> bool {
        self.settle(Settlement::Rejected(reason))
    }

    /// Forwards `progress` to every attached progress reaction. Ignored once settled.
    pub fn notify(&self, progress: Value) -> bool {
        let listeners: Vec<ProgressFn> = {
            let state = self.shared.lock();
            match &*state {
                State::Pending { reactions, .. } => {
                    reactions.iter().filter_map(Reactions::progress_fn).collect()
                }
                State::Settled(_) => return false,
            }
        };

        for listener in listeners {
            listener(progress.clone());
        }
        true
    }

    fn settle(&self, settlement: Settlement) -> bool {
        // Reactions run after the lock is released so they may touch this deferred again.
        let previous = {
            let mut state = self.shared.lock();
            if matches!(*state, State::Settled(_)) {
                return false;
            }
            std::mem::replace(&mut *state, State::Settled(settlement.clone()))
        };

        let State::Pending { reactions, wakers } = previous else {
            return false;
        };

        for waker in wakers {
            waker.wake();
        }
        for reactions in reactions {
            settlement.clone().deliver(reactions);
        }
        true
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Deferred {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("promise", &self.promise())
            .finish()
    }
}

/// Consumer half. Cloning shares the same settlement.
///
/// Reactions can be attached through [`Thenable::then`], or the promise can
/// simply be awaited.
#[derive(Clone)]
pub struct Promise {
    shared: SharedState,
}

impl Promise {
    pub fn resolved(value: Value) -> Self {
        let deferred = Deferred::new();
        deferred.resolve(value);
        deferred.promise()
    }

    pub fn rejected(reason: CompletionError) -> Self {
        let deferred = Deferred::new();
        deferred.reject(reason);
        deferred.promise()
    }

    pub fn is_settled(&self) -> bool {
        matches!(*self.shared.lock(), State::Settled(_))
    }
}

impl Thenable for Promise {
    fn then(&self, reactions: Reactions) {
        let settlement = {
            let mut state = self.shared.lock();
            match &mut *state {
                State::Pending {
                    reactions: pending, ..
                } => {
                    pending.push(reactions);
                    return;
                }
                State::Settled(settlement) => settlement.clone(),
            }
        };
        settlement.deliver(reactions);
    }
}

impl Future for Promise {
    type Output = Result<Value, CompletionError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.lock();
        match &mut *state {
            State::Pending { wakers, .. } => {
                if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
            State::Settled(settlement) => Poll::Ready(settlement.clone().into_result()),
        }
    }
}

impl Debug for Promise {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        let mut debug = f.debug_struct("Promise");
        match &*state {
            State::Pending { reactions, .. } => debug.field("pending_reactions", &reactions.len()),
            State::Settled(settlement) => debug.field("settled", settlement),
        };
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Deferred, Promise};
    use crate::completion::thenable::{Reactions, Thenable};
    use crate::error::CompletionError;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Reactions) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let fulfilled = log.clone();
        let rejected = log.clone();
        let progressed = log.clone();
        let reactions = Reactions::new(
            move |value: Value| {
                fulfilled
                    .lock()
                    .expect("lock log")
                    .push(format!("fulfilled:{value}"))
            },
            move |reason: CompletionError| {
                rejected
                    .lock()
                    .expect("lock log")
                    .push(format!("rejected:{}", reason.reason))
            },
        )
        .with_progress(move |progress: Value| {
            progressed
                .lock()
                .expect("lock log")
                .push(format!("progress:{progress}"))
        });
        (log, reactions)
    }

    #[test]
    fn reactions_attached_before_settlement_run_on_resolve() {
        let deferred = Deferred::new();
        let (log, reactions) = recorder();
        deferred.promise().then(reactions);

        assert!(deferred.notify(json!(50)));
        assert!(deferred.resolve(json!("done")));

        assert_eq!(
            *log.lock().expect("lock log"),
            vec!["progress:50".to_string(), "fulfilled:\"done\"".to_string()]
        );
    }

    #[test]
    fn reactions_attached_after_settlement_run_immediately() {
        let promise = Promise::rejected(CompletionError::new("boom"));
        let (log, reactions) = recorder();
        promise.then(reactions);

        assert_eq!(
            *log.lock().expect("lock log"),
            vec!["rejected:\"boom\"".to_string()]
        );
    }

    #[test]
    fn first_settlement_wins() {
        let deferred = Deferred::new();

        assert!(deferred.resolve(json!(1)));
        assert!(!deferred.resolve(json!(2)));
        assert!(!deferred.reject(CompletionError::new("late")));
        assert!(!deferred.notify(json!(99)));
        assert!(deferred.promise().is_settled());
    }

    #[tokio::test]
    async fn awaiting_a_promise_yields_its_settlement() {
        let deferred = Deferred::new();
        let promise = deferred.promise();

        let resolver = deferred.clone();
        let handle = tokio::spawn(async move { promise.await });
        tokio::task::yield_now().await;
        resolver.resolve(json!([10, 20]));

        assert_eq!(handle.await.expect("join"), Ok(json!([10, 20])));
    }
}
