/// A macro to simplify read-through caching.
///
/// Checks the cache for the given key. On a hit the cached value is
/// returned; on a miss (including an unavailable cache) the provided block
/// computes the value, which is then written through before being returned.
///
/// # Arguments
/// * `$cache`: A [`crate::cache::Cache`] handle.
/// * `$key`: The [`crate::cache::CacheKey`] for the value.
/// * `$ttl`: Time-to-live for the written entry.
/// * `$block`: Async block computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let movies = cached!(self.cache, key, LIST_TTL, async move {
///     self.fetch_from_provider().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_json(&$key).await {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_json(&$key, &value, $ttl).await;
            Ok(value)
        }
    }};
}
