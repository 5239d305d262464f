//! Instrumentation Module
//!
//! Wrappers that count and record the calls of any `Operation`, and the
//! replay of recorded call history.
//!
//! Wrappers are composed at construction. `Instrumented<Op>` puts history
//! recording outermost and counting innermost, so a call appends its input,
//! increments the counter, runs the operation and appends its output.

mod counting;
mod history;
mod replay;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::store::SharedStore;

pub use counting::Counted;
pub use history::{inputs_key, outputs_key, Recorded};
pub use replay::{replay, CallRecord, Replay};

// == Operation ==
/// A named asynchronous operation.
///
/// `Input` is the argument list. Operations with several arguments take a
/// tuple of them; a single argument that is itself a sequence is passed as a
/// one-element tuple so it is recorded as one argument. `name` is the
/// qualified operation identity (for example `Cache.store`) and namespaces
/// the counter and history logs in the store.
#[async_trait]
pub trait Operation: Send + Sync {
    type Input: Serialize + Send + Sync + 'static;
    type Output: Serialize + Send + 'static;

    fn name(&self) -> &str;

    async fn call(&self, input: Self::Input) -> Result<Self::Output>;
}

/// An operation with both call counting and call history.
pub type Instrumented<Op> = Recorded<Counted<Op>>;

/// Wraps `op` with counting (inner) and history recording (outer).
pub fn instrument<Op: Operation>(op: Op, store: SharedStore) -> Instrumented<Op> {
    Recorded::new(Counted::new(op, store.clone()), store)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::CacheError;

    /// Doubles its input; fails on negative numbers.
    pub struct Double;

    #[async_trait]
    impl Operation for Double {
        type Input = i64;
        type Output = i64;

        fn name(&self) -> &str {
            "Math.double"
        }

        async fn call(&self, input: i64) -> Result<i64> {
            if input < 0 {
                return Err(CacheError::Conversion(format!("negative input {}", input)));
            }
            Ok(input * 2)
        }
    }

    /// Same method name as `Double`, different owner.
    pub struct OtherDouble;

    #[async_trait]
    impl Operation for OtherDouble {
        type Input = i64;
        type Output = i64;

        fn name(&self) -> &str {
            "Other.double"
        }

        async fn call(&self, input: i64) -> Result<i64> {
            Ok(input * 2)
        }
    }

    /// Joins two strings.
    pub struct Concat;

    #[async_trait]
    impl Operation for Concat {
        type Input = (String, String);
        type Output = String;

        fn name(&self) -> &str {
            "Text.concat"
        }

        async fn call(&self, (left, right): (String, String)) -> Result<String> {
            Ok(format!("{}{}", left, right))
        }
    }
}
