//! Response status classification

use super::response::ApiResponse;
use crate::error::{BadRequest, Error, Result};

/// A response the caller is expected to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 200 or 204
    Success(ApiResponse),
    /// 404, left to the caller to interpret
    NotFound(ApiResponse),
}

impl Outcome {
    /// True for a 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound(_))
    }
}

/// Map a response onto success, not found, a bad request or a fatal error.
///
/// - 200, 204: success
/// - 400, 401, 403, 409: [`BadRequest`] from the body's `errors` field
/// - 404: passed through as [`Outcome::NotFound`]
/// - anything else: [`Error::HttpStatus`]
pub fn classify(response: ApiResponse) -> Result<Outcome> {
    match response.status {
        200 | 204 => Ok(Outcome::Success(response)),
        404 => Ok(Outcome::NotFound(response)),
        400 | 401 | 403 | 409 => Err(BadRequest::from_body(
            response.status,
            &response.reason,
            &response.body,
        )
        .into()),
        status => Err(Error::http_status(status, response.reason)),
    }
}
