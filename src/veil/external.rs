use actix_web::http::StatusCode;
use std::fmt;

/// The publishable half of an error: what happened, in client terms.
#[derive(Debug, Clone, Copy)]
pub struct ExternalError {
    /// Which kind of failure the client should react to.
    pub cause: Cause,
    /// A short explanation safe to show anyone.
    pub text: &'static str,
}

/// Client-facing failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    ServerError,
    NotFound,
    Unauthorized,
    Forbidden,
    InvalidField,
    Conflict,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        // Same as Debug: the variant name.
        write!(f, "{:?}", self)
    }
}

impl From<Cause> for StatusCode {
    /// ExternalError never stores status codes directly; components like the
    /// datastore shouldn't know HTTP. The mapping lives here instead.
    fn from(cause: Cause) -> StatusCode {
        match cause {
            Cause::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Cause::NotFound => StatusCode::NOT_FOUND,
            Cause::Unauthorized => StatusCode::UNAUTHORIZED,
            Cause::Forbidden => StatusCode::FORBIDDEN,
            Cause::InvalidField => StatusCode::BAD_REQUEST,
            Cause::Conflict => StatusCode::CONFLICT,
        }
    }
}

impl fmt::Display for ExternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}: {}", self.cause, self.text)
    }
}

impl Default for ExternalError {
    // A deliberately vague fallback.
    fn default() -> Self {
        Self {
            cause: Cause::ServerError,
            text: "internal server error",
        }
    }
}
