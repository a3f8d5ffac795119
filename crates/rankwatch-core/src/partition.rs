//! Keyword sharding for the measurement worker pool.

/// Splits `items` into `worker_count` shards using the balanced-remainder rule:
/// with `k = len / n` and `m = len % n`, shard `i` receives `k` items plus one
/// extra if `i < m`. Shard sizes differ by at most 1, every item lands in
/// exactly one shard, and order is preserved within and across shards.
///
/// A `worker_count` of 0 is clamped to 1 so the function stays total; callers
/// validate the configured count at load time. Shards may be empty when there
/// are fewer items than workers.
#[must_use]
pub fn partition<T>(items: Vec<T>, worker_count: usize) -> Vec<Vec<T>> {
    let n = worker_count.max(1);
    let k = items.len() / n;
    let m = items.len() % n;

    let mut shards = Vec::with_capacity(n);
    let mut iter = items.into_iter();
    for i in 0..n {
        let take = k + usize::from(i < m);
        shards.push(iter.by_ref().take(take).collect());
    }
    shards
}
