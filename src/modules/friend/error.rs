use std::borrow::Cow;

use crate::api::error;

/// Outcomes of friend and notification operations that callers are expected to handle.
#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("users are already friends")]
    AlreadyFriends,
    #[error("a friend request between these users is already pending")]
    RequestAlreadyPending,
    #[error("not found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("invalid recipient: {0}")]
    InvalidRecipient(Cow<'static, str>),
    #[error(transparent)]
    Store(#[from] error::SystemError),
}

impl RelationError {
    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }
}

impl From<RelationError> for error::Error {
    fn from(value: RelationError) -> Self {
        match value {
            RelationError::AlreadyFriends => error::Error::conflict("Users are already friends"),
            RelationError::RequestAlreadyPending => {
                error::Error::conflict("Friend request already pending")
            }
            RelationError::NotFound(msg) => error::Error::NotFound(msg),
            RelationError::Unauthorized(msg) => error::Error::Forbidden(msg),
            RelationError::InvalidRecipient(msg) => error::Error::BadRequest(msg),
            RelationError::Store(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{ResponseError, http::StatusCode};

    use super::*;

    #[test]
    fn test_expected_conditions_are_not_server_errors() {
        let cases = [
            (RelationError::AlreadyFriends, StatusCode::CONFLICT),
            (RelationError::RequestAlreadyPending, StatusCode::CONFLICT),
            (RelationError::not_found("Friend request not found"), StatusCode::NOT_FOUND),
            (RelationError::unauthorized("Not your notification"), StatusCode::FORBIDDEN),
            (RelationError::InvalidRecipient("self".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            let http: error::Error = err.into();
            assert_eq!(http.status_code(), status);
        }
    }

    #[test]
    fn test_store_failure_is_internal() {
        let http: error::Error =
            RelationError::Store(error::SystemError::internal("connection reset")).into();
        assert_eq!(http.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
