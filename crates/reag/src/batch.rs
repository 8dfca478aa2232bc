//! Document batching.

/// Default number of documents per batch.
pub use reag_core::config::DEFAULT_BATCH_SIZE;

/// Split `items` into consecutive, order-preserving groups of at most
/// `batch_size`. The last group may be smaller; an empty input yields no
/// groups. A zero `batch_size` is treated as 1.
pub fn batches<T>(items: &[T], batch_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(batch_size.max(1))
}
