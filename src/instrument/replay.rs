//! Replay of recorded call history.

use std::fmt;

use serde_json::Value;

use crate::error::Result;
use crate::instrument::{inputs_key, outputs_key};
use crate::store::KeyStore;

/// One recorded call: serialized arguments and serialized result.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub input: String,
    pub output: String,
}

impl CallRecord {
    /// Arguments rendered for a call expression: the elements of a JSON array
    /// joined by commas, anything else verbatim.
    pub fn arguments(&self) -> String {
        match serde_json::from_str::<Value>(&self.input) {
            Ok(Value::Array(items)) => items
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            _ => self.input.clone(),
        }
    }
}

/// Call history of one operation, read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    /// Operation identity
    pub operation: String,
    /// Number of recorded inputs
    pub call_count: usize,
    /// Input/output pairs in call order
    pub calls: Vec<CallRecord>,
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.call_count == 1 { "" } else { "s" };
        write!(
            f,
            "{} was called {} time{}:",
            self.operation, self.call_count, plural
        )?;
        for call in &self.calls {
            write!(
                f,
                "\n{}({}) -> {}",
                self.operation,
                call.arguments(),
                call.output
            )?;
        }
        Ok(())
    }
}

/// Reads the history logs of `operation` and pairs inputs with outputs.
///
/// The call count is the length of the input log. When the logs differ in
/// length only the pairs present in both are listed. Never writes.
pub async fn replay(store: &dyn KeyStore, operation: &str) -> Result<Replay> {
    let inputs = store.lrange_all(&inputs_key(operation)).await?;
    let outputs = store.lrange_all(&outputs_key(operation)).await?;

    let calls = inputs
        .iter()
        .zip(outputs.iter())
        .map(|(input, output)| CallRecord {
            input: String::from_utf8_lossy(input).into_owned(),
            output: String::from_utf8_lossy(output).into_owned(),
        })
        .collect();

    Ok(Replay {
        operation: operation.to_string(),
        call_count: inputs.len(),
        calls,
    })
}
