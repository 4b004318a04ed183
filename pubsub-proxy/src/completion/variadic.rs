//! Conversion between multi-value resolution and resolve-with-sequence.

use crate::completion::deferred::{Deferred, Promise};
use crate::completion::thenable::{CompletionHandle, Reactions, Thenable};
use crate::error::CompletionError;
use serde_json::Value;

/// Legacy-facing resolver for a single-value [`Deferred`].
///
/// All values given to one `resolve` call are collected, in order, into a
/// single `Value::Array` that fulfils the underlying promise.
#[derive(Clone, Debug)]
pub struct VariadicResolver {
    deferred: Deferred,
}

impl VariadicResolver {
    pub fn new(deferred: Deferred) -> Self {
        Self { deferred }
    }

    /// Creates a fresh deferred and returns its legacy resolver with the promise.
    pub fn pair() -> (Self, Promise) {
        let deferred = Deferred::new();
        let promise = deferred.promise();
        (Self::new(deferred), promise)
    }

    pub fn promise(&self) -> Promise {
        self.deferred.promise()
    }
}

impl Thenable for VariadicResolver {
    fn then(&self, reactions: Reactions) {
        self.deferred.promise().then(reactions)
    }
}

impl CompletionHandle for VariadicResolver {
    fn resolve(&self, values: Vec<Value>) {
        self.deferred.resolve(Value::Array(values));
    }

    fn reject(&self, reason: CompletionError) {
        self.deferred.reject(reason);
    }

    fn notify(&self, progress: Value) {
        self.deferred.notify(progress);
    }
}

/// Spreads a single settled value into the legacy multi-value convention.
///
/// Arrays spread element-wise, `null` carries no values and any other value is
/// passed on as the only one.
pub fn spread(value: Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values,
        Value::Null => Vec::new(),
        value => vec![value],
    }
}

#[cfg(test)]
mod tests {
    use super::{spread, VariadicResolver};
    use crate::completion::thenable::CompletionHandle;
    use crate::error::CompletionError;
    use serde_json::json;

    #[tokio::test]
    async fn multi_value_resolve_fulfils_with_one_sequence() {
        let (resolver, promise) = VariadicResolver::pair();

        resolver.resolve(vec![json!(10), json!(20)]);

        assert_eq!(promise.await, Ok(json!([10, 20])));
    }

    #[tokio::test]
    async fn empty_resolve_fulfils_with_empty_sequence() {
        let (resolver, promise) = VariadicResolver::pair();

        resolver.resolve(Vec::new());

        assert_eq!(promise.await, Ok(json!([])));
    }

    #[tokio::test]
    async fn reject_passes_reason_through() {
        let (resolver, promise) = VariadicResolver::pair();

        resolver.reject(CompletionError::new("nope"));

        assert_eq!(promise.await, Err(CompletionError::new("nope")));
    }

    #[test]
    fn spread_unpacks_sequences_and_wraps_scalars() {
        assert_eq!(spread(json!([1, "two"])), vec![json!(1), json!("two")]);
        assert_eq!(spread(json!(7)), vec![json!(7)]);
        assert!(spread(json!(null)).is_empty());
    }
}
