//! Operation: evaluate a condition expression against an explicit active set.

use std::collections::BTreeSet;

use modorder_core::condition::Condition;
use modorder_util::errors::ModorderError;

/// Parse `source` and evaluate it with `active` as the active module set.
pub fn evaluate(source: &str, active: &[String]) -> miette::Result<bool> {
    let condition = Condition::parse(source).map_err(|e| ModorderError::Generic {
        message: e.to_string(),
    })?;
    let active: BTreeSet<String> = active.iter().cloned().collect();
    let value = condition.evaluate(&active).map_err(|e| ModorderError::Generic {
        message: e.to_string(),
    })?;
    tracing::debug!("{condition} with {} active module(s) = {value}", active.len());
    Ok(value)
}
