//! `veil::Error` pairs the real error from some function with a user-facing
//! description. Callers only ever see the user-facing side; the real error
//! (which may mention file paths, SQL, or other internals) stays in the logs.

pub mod external;
mod extensions;
mod integrations;

pub use extensions::*;
pub use external::{Cause, ExternalError};
use std::fmt;
use std::fmt::{Display, Formatter};

/// An error with a private internal side and a publishable external side.
#[derive(Debug)]
pub struct Error {
    /// The underlying error. Never serialized into a response.
    pub internal: anyhow::Error,
    /// What the client is told instead.
    pub external: ExternalError,
}

/// Displaying a veil::Error shows only the external side.
impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        write!(f, "{}", self.external)
    }
}

/// Return type of any fallible operation in this crate.
pub type Fallible<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_side_stays_private() {
        let io_err = std::fs::read("secret-path-never-shown").unwrap_err();
        let err = io_err.describe(ExternalError {
            cause: Cause::ServerError,
            text: "could not read attachment",
        });
        assert_eq!(err.to_string(), "ServerError: could not read attachment");
    }

    #[test]
    fn or_not_found_keeps_some() {
        let found: Option<u8> = Some(7);
        assert_eq!(found.or_not_found("number").unwrap(), 7);
        let missing: Option<u8> = None;
        let err = missing.or_not_found("number").unwrap_err();
        assert_eq!(err.external.cause, Cause::NotFound);
    }
}
