//! Deterministic cache key derivation
//!
//! Keys name the logical read: operation, acting user (results are
//! user-scoped upstream), then every parameter material to the result.
//! Identical logical parameters always produce the identical key, which is
//! what makes prefix invalidation after a mutation reliable.

/// Build the cache key for one logical read.
///
/// Segments are joined with `:`; the operation name comes first so related
/// views share a prefix (`playlist:u1:p1`, `playlist-tracks:u1:p1`) and can
/// be invalidated together.
pub fn cache_key(operation: &str, user: &str, params: &[&str]) -> String {
    let mut key = String::with_capacity(
        operation.len() + user.len() + params.iter().map(|p| p.len() + 1).sum::<usize>() + 1,
    );
    key.push_str(operation);
    key.push(':');
    key.push_str(user);
    for param in params {
        key.push(':');
        key.push_str(param);
    }
    key
}
