//! Scatter/gather with per-item failure isolation.

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Run `op` over every item concurrently and settle every result.
///
/// At most `limit` operations are in flight at once. The output has one
/// slot per input, in input order; a failing item occupies its own slot as
/// an `Err` and never cancels or discards its siblings.
pub async fn settle_all<I, T, F, Fut, O, E>(items: I, limit: usize, op: F) -> Vec<Result<O, E>>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<O, E>>,
{
    stream::iter(items.into_iter().map(op))
        .buffered(limit.max(1))
        .collect()
        .await
}
