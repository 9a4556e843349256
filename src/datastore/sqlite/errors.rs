use crate::veil::{Describe, ExternalError, Fallible};
use actix_web::error::BlockingError;

/// Convenience extension used to flatten the nested result `web::block`
/// hands back.
pub trait BlockingResp<T> {
    fn to_resp(self) -> Fallible<T>;
}

impl<T> BlockingResp<T> for Result<Fallible<T>, BlockingError> {
    fn to_resp(self) -> Fallible<T> {
        match self {
            Ok(result) => result,
            Err(pool_gone) => Err(pool_gone.describe(ExternalError::default())),
        }
    }
}
