//! Conversions from arbitrary errors (and absent values) into veil errors.
use crate::veil::{Cause, Error, ExternalError};

pub trait Describe {
    /// Wrap an error with the description its audience is allowed to see.
    fn describe(self, external: ExternalError) -> Error;
}

impl<Internal: Into<anyhow::Error>> Describe for Internal {
    fn describe(self, external: ExternalError) -> Error {
        Error {
            internal: self.into(),
            external,
        }
    }
}

/// Plain errors convert with the default (vague) external side. Use
/// `err.describe(...)` when the client deserves something more specific.
impl<Internal: Into<anyhow::Error>> From<Internal> for Error {
    fn from(internal: Internal) -> Error {
        internal.describe(Default::default())
    }
}

pub trait DescribeErr<T> {
    /// Shorthand for `result.map_err(|e| e.describe(external))`.
    fn describe_err(self, external: ExternalError) -> Result<T, Error>;
}

impl<T, E> DescribeErr<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn describe_err(self, external: ExternalError) -> Result<T, Error> {
        self.map_err(|e| e.describe(external))
    }
}

pub trait OrNotFound<T> {
    /// Turn an absent lookup result into a NotFound error naming what was
    /// looked up.
    fn or_not_found(self, what: &'static str) -> Result<T, Error>;
}

impl<T> OrNotFound<T> for Option<T> {
    fn or_not_found(self, what: &'static str) -> Result<T, Error> {
        self.ok_or_else(|| {
            anyhow::anyhow!("lookup missed: {what}").describe(ExternalError {
                cause: Cause::NotFound,
                text: what,
            })
        })
    }
}
