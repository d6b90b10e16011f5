//! TTL-bound cache entries ("transients") backed by Redis.
//!
//! Every helper here is best-effort: callers treat any Redis failure as a
//! cache miss and fall back to the uncached pipeline. Nothing in this module
//! is allowed to surface as a user-facing error.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Store a value with a TTL.
pub async fn set_ex(
    conn: &mut ConnectionManager,
    key: &str,
    value: &str,
    ttl_secs: u64,
) -> Result<(), redis::RedisError> {
    conn.set_ex(key, value, ttl_secs).await
}

/// Fetch a value by key.
pub async fn get(
    conn: &mut ConnectionManager,
    key: &str,
) -> Result<Option<String>, redis::RedisError> {
    conn.get(key).await
}

/// Delete a single key.
pub async fn del(conn: &mut ConnectionManager, key: &str) -> Result<(), redis::RedisError> {
    conn.del(key).await
}

/// Delete every key matching `pattern` via cursor SCAN.
///
/// Used for the full-flush invalidation path when a render-affecting setting
/// changes. Returns the number of keys deleted.
pub async fn scan_del(
    conn: &mut ConnectionManager,
    pattern: &str,
) -> Result<u64, redis::RedisError> {
    let mut deleted: u64 = 0;
    let mut cursor: u64 = 0;

    loop {
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(100)
            .query_async(conn)
            .await?;

        if !keys.is_empty() {
            let removed: u64 = conn.del(&keys).await?;
            deleted += removed;
        }

        if next == 0 {
            break;
        }
        cursor = next;
    }

    Ok(deleted)
}

/// Check Redis reachability (diagnostics).
pub async fn ping(conn: &mut ConnectionManager) -> bool {
    let pong: Result<String, redis::RedisError> = redis::cmd("PING").query_async(conn).await;
    pong.is_ok()
}
