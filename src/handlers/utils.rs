use crate::error::ApiError;

/// Parse a path id. Anything that is not a positive integer cannot name a
/// row, so it is reported as not found rather than as a bad request.
pub fn parse_id(raw: &str, resource: &str) -> Result<i32, ApiError> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::not_found(format!("{} {} not found", resource, raw))),
    }
}
