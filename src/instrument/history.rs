//! Call history wrapper.

use std::fmt::Display;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::instrument::Operation;
use crate::store::SharedStore;

/// Store key of the ordered input log of `operation`.
pub fn inputs_key(operation: &str) -> String {
    format!("{}:inputs", operation)
}

/// Store key of the ordered output log of `operation`.
pub fn outputs_key(operation: &str) -> String {
    format!("{}:outputs", operation)
}

/// JSON argument list of a call. A tuple input already is one; any other
/// input is the single argument.
fn argument_list<T: Serialize>(input: &T) -> Result<String> {
    let arguments = match serde_json::to_value(input)? {
        Value::Array(items) => Value::Array(items),
        single => Value::Array(vec![single]),
    };
    Ok(arguments.to_string())
}

fn error_entry(message: impl Display) -> String {
    json!({ "error": message.to_string() }).to_string()
}

/// Appends every call's arguments and result to per-operation store lists.
///
/// Arguments are logged as a JSON array before the call, the result as JSON
/// after it. Once the input is logged an output entry is always appended:
/// `{"error": "..."}` for a failed call, or for a result that cannot be
/// encoded, in which case the result is still returned. The two appends are
/// separate store commands: a crash between them leaves the logs uneven.
pub struct Recorded<Op> {
    inner: Op,
    store: SharedStore,
}

impl<Op: Operation> Recorded<Op> {
    pub fn new(inner: Op, store: SharedStore) -> Self {
        Self { inner, store }
    }
}

#[async_trait]
impl<Op: Operation> Operation for Recorded<Op> {
    type Input = Op::Input;
    type Output = Op::Output;

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output> {
        let name = self.name();
        let arguments = argument_list(&input)?;
        self.store
            .rpush(&inputs_key(name), arguments.into_bytes())
            .await?;

        let result = self.inner.call(input).await;

        let recorded = match &result {
            Ok(output) => serde_json::to_string(output).unwrap_or_else(|err| {
                warn!(operation = name, error = %err, "call result not encodable");
                error_entry(err)
            }),
            Err(err) => {
                warn!(operation = name, error = %err, "recorded failed call");
                error_entry(err)
            }
        };
        let calls = self
            .store
            .rpush(&outputs_key(name), recorded.into_bytes())
            .await?;
        debug!(operation = name, calls, "call recorded");

        result
    }
}
