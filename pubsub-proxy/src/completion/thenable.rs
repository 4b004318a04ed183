//! Structural completion interfaces.

use crate::error::CompletionError;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub(crate) type ProgressFn = Arc<dyn Fn(Value) + Send + Sync>;

/// Fulfilment, rejection and optional progress callbacks attached to a [`Thenable`].
pub struct Reactions {
    on_fulfilled: Box<dyn FnOnce(Value) + Send>,
    on_rejected: Box<dyn FnOnce(CompletionError) + Send>,
    on_progress: Option<ProgressFn>,
}

impl Reactions {
    pub fn new<F, R>(on_fulfilled: F, on_rejected: R) -> Self
    where
        F: FnOnce(Value) + Send + 'static,
        R: FnOnce(CompletionError) + Send + 'static,
    {
        Self {
            on_fulfilled: Box::new(on_fulfilled),
            on_rejected: Box::new(on_rejected),
            on_progress: None,
        }
    }

    pub fn with_progress<P>(mut self, on_progress: P) -> Self
    where
        P: Fn(Value) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(on_progress));
        self
    }

    pub fn fulfill(self, value: Value) {
        (self.on_fulfilled)(value)
    }

    pub fn reject(self, reason: CompletionError) {
        (self.on_rejected)(reason)
    }

    pub fn progress(&self, progress: Value) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(progress)
        }
    }

    pub(crate) fn progress_fn(&self) -> Option<ProgressFn> {
        self.on_progress.clone()
    }
}

impl Debug for Reactions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reactions")
            .field("on_progress", &self.on_progress.is_some())
            .finish_non_exhaustive()
    }
}

/// Anything that reactions can be attached to.
///
/// This is the whole "is it a future" test: a value qualifies by implementing
/// this trait, whatever the concrete completion library behind it.
pub trait Thenable: Send + Sync {
    fn then(&self, reactions: Reactions);
}

impl<T: Thenable + ?Sized> Thenable for Arc<T> {
    fn then(&self, reactions: Reactions) {
        (**self).then(reactions)
    }
}

/// Producer side of a completion following the legacy hub convention, where a
/// single `resolve` call may carry several values.
pub trait CompletionHandle: Thenable {
    fn resolve(&self, values: Vec<Value>);

    fn reject(&self, reason: CompletionError);

    fn notify(&self, progress: Value);
}
