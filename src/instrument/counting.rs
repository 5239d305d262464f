//! Call counting wrapper.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::instrument::Operation;
use crate::store::SharedStore;

/// Increments a per-operation counter in the store on every call.
///
/// The counter lives under the operation's name and is incremented before
/// delegating, so it counts attempted calls, failed ones included. Results
/// and errors of the inner operation pass through untouched.
pub struct Counted<Op> {
    inner: Op,
    store: SharedStore,
}

impl<Op: Operation> Counted<Op> {
    pub fn new(inner: Op, store: SharedStore) -> Self {
        Self { inner, store }
    }
}

#[async_trait]
impl<Op: Operation> Operation for Counted<Op> {
    type Input = Op::Input;
    type Output = Op::Output;

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output> {
        let calls = self.store.incr(self.name()).await?;
        debug!(operation = self.name(), calls, "operation called");
        self.inner.call(input).await
    }
}
