// Resource handlers. Each returns `ApiResult<T>`; the gate in
// `middleware::auth` runs first on routes that need a caller.
pub mod courses;
pub mod system;
pub mod users;
pub mod validation;

use crate::error::ApiError;

/// Parse a path id. Only the canonical decimal form names a record: no sign,
/// no leading zeros. Anything else is a 404.
pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<i64, ApiError> {
    let canonical = !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && (raw == "0" || !raw.starts_with('0'));

    canonical
        .then(|| raw.parse::<i64>().ok())
        .flatten()
        .ok_or_else(|| ApiError::not_found(format!("{} {} not found", resource, raw)))
}
