use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use serde::Serialize;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("invalid race configuration: {}", reason))]
    InvalidConfigError { reason: String },

    #[snafu(display("missing environment variable: {}", name))]
    MissingEnvError { name: String },

    #[snafu(display("invalid input: {}", reason))]
    InvalidInputError { reason: String },

    #[snafu(display("{} not found", what))]
    NotFoundError { what: String },

    #[snafu(display("no valid credentials supplied"))]
    UnauthorizedError,

    #[snafu(display("forbidden: {}", reason))]
    ForbiddenError { reason: String },

    #[snafu(display("database error: {}", source))]
    DatabaseError { source: diesel::result::Error },

    #[snafu(display("could not connect to database: {}", source))]
    ConnectionError { source: diesel::ConnectionError },
}

pub type CustomResult<T> = Result<T, Error>;

impl Error {
    /// # http status of the error
    /// storage and configuration failures are reported as a server error,
    /// everything else is the callers fault.
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidInputError { .. } => Status::BadRequest,
            Error::NotFoundError { .. } => Status::NotFound,
            Error::UnauthorizedError => Status::Unauthorized,
            Error::ForbiddenError { .. } => Status::Forbidden,
            Error::InvalidConfigError { .. }
            | Error::MissingEnvError { .. }
            | Error::DatabaseError { .. }
            | Error::ConnectionError { .. } => Status::InternalServerError,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().code < 500
    }
}

/// # api error
/// the json body returned for a failed request. server errors do not leak
/// their cause to the client, it is only logged.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ApiError {
    #[serde(skip_serializing)]
    pub status: Status,
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn new(status: Status, error: &str) -> ApiError {
        ApiError {
            status,
            success: false,
            error: error.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = error.status();
        if error.is_client_error() {
            ApiError::new(status, &error.to_string())
        } else {
            ApiError::new(status, "internal server error")
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        Response::build_from(Json(&self).respond_to(request)?)
            .status(self.status)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        let err = InvalidInputSnafu { reason: "clock time must be positive" }.build();
        assert_eq!(err.status(), Status::BadRequest);
        assert!(err.is_client_error());

        assert_eq!(UnauthorizedSnafu.build().status(), Status::Unauthorized);
        assert_eq!(ForbiddenSnafu { reason: "other van" }.build().status(), Status::Forbidden);
        assert_eq!(NotFoundSnafu { what: "runner 3" }.build().status(), Status::NotFound);
    }

    #[test]
    fn storage_errors_are_server_errors() {
        let err = Error::DatabaseError { source: diesel::result::Error::NotFound };
        assert_eq!(err.status(), Status::InternalServerError);
        assert!(!err.is_client_error());
    }

    #[test]
    fn display_includes_reason() {
        let err = InvalidConfigSnafu { reason: "legs_per_van must be positive" }.build();
        assert_eq!(err.to_string(), "invalid race configuration: legs_per_van must be positive");
    }

    #[test]
    fn api_errors_hide_server_details() {
        let client = ApiError::from(ForbiddenSnafu { reason: "other van" }.build());
        assert_eq!(client.status, Status::Forbidden);
        assert_eq!(client.error, "forbidden: other van");

        let server = ApiError::from(Error::DatabaseError { source: diesel::result::Error::NotFound });
        assert_eq!(server.error, "internal server error");
        assert!(!serde_json::to_string(&server).unwrap().contains("status"));
    }
}
