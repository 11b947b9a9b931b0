use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use log::{debug, error};
use mongodb::error::Error as DbError;
use rocket::{
    http::{Status, StatusClass},
    request::{Outcome, Request},
    response::{self, Responder},
    serde::json::Json,
    Catcher,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error("Invalid ID: {0}")]
    InvalidIdentifier(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
}

impl Error {
    /// Construct an [`Error::NotFound`] describing the missing thing.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidIdentifier(_) | Self::BadRequest(_) => Status::BadRequest,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::Forbidden(_) => Status::Forbidden,
            Self::NotFound(_) => Status::NotFound,
            Self::Conflict(_) => Status::Conflict,
            Self::Db(_) | Self::Argon2(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature
                | JwtErrorKind::ImmatureSignature
                | JwtErrorKind::InvalidToken
                | JwtErrorKind::InvalidSignature => Status::Unauthorized,
                _ => Status::InternalServerError,
            },
        }
    }

    /// The message shown to the client. Internal details are never exposed.
    pub fn public_message(&self) -> String {
        if self.status().class() == StatusClass::ServerError {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    /// Fail a request guard with this error.
    ///
    /// Rocket only hands guard failures to the catchers as a bare status, so
    /// the message is stashed on the request for [`default_catcher`] to find.
    pub fn fail_guard<S>(self, req: &Request<'_>) -> Outcome<S, Error> {
        let status = self.status();
        log(&self);
        req.local_cache(|| GuardFailure(Some(self.public_message())));
        Outcome::Error((status, self))
    }
}

/// The JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        log(&self);
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).respond_to(req)
    }
}

fn log(err: &Error) {
    if err.status().class() == StatusClass::ServerError {
        error!("{err}");
    } else {
        debug!("{err}");
    }
}

/// The message left behind by a failed request guard, if any.
struct GuardFailure(Option<String>);

/// Render every uncaught failure as a JSON error body.
#[catch(default)]
fn default_catcher(status: Status, req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let error = req
        .local_cache(|| GuardFailure(None))
        .0
        .clone()
        .unwrap_or_else(|| default_message(status).to_string());
    (status, Json(ErrorBody { error }))
}

fn default_message(status: Status) -> &'static str {
    match status.code {
        400 => "Invalid request",
        401 => "Authentication required",
        403 => "Access forbidden",
        404 => "Resource not found",
        422 => "Malformed request body",
        500 => "Internal server error",
        _ => status.reason().unwrap_or("Unknown error"),
    }
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}
