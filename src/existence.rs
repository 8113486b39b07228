//! Concurrent existence checks for batches of ids.

use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;

use crate::ast::{FilterNode, Operator, Value};
use crate::error::{SiftError, SiftResult};

/// The filter a count lookup uses for one id: `id_attribute eq id`.
pub fn id_filter(id_attribute: &str, id: impl Into<Value>) -> FilterNode {
    FilterNode::leaf(id_attribute, Operator::Eq, id)
}

/// Return the ids whose count is zero, in input order.
///
/// `count` is started for every id and all lookups are awaited before the
/// result is produced. If any lookup fails the whole check fails with
/// [`SiftError::ExistenceCheck`] naming the first failing id.
pub async fn missing<I, F, Fut, E>(ids: Vec<I>, count: F) -> SiftResult<Vec<I>>
where
    I: Clone + Display,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<u64, E>>,
    E: Display,
{
    let checks = ids.iter().cloned().map(&count);
    let counts = join_all(checks).await;

    let mut absent = Vec::new();
    for (id, result) in ids.into_iter().zip(counts) {
        match result {
            Ok(0) => absent.push(id),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(%id, error = %e, "existence check failed");
                return Err(SiftError::ExistenceCheck {
                    id: id.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(missing = absent.len(), "existence check complete");
    Ok(absent)
}
