//! Make veil errors usable as actix-web responses.

use crate::veil::Error;
use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use serde::Serialize;
use tracing::error;

// A handler returning a veil::Error responds with the external side only.
// The internal side is logged here, at the single point every error passes
// through.
impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        self.external.cause.into()
    }

    fn error_response(&self) -> HttpResponse {
        error!("{:#}", self.internal);
        let body = serde_json::to_string(&ErrBody {
            error: self.to_string(),
        })
        .unwrap_or_else(|e| {
            error!("serializing error body: {}", e);
            "{\"error\": \"ServerError: internal server error\"}".to_owned()
        });
        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(body)
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}
