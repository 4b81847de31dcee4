use crate::errors::ServerError;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;

pub type ResultResp = Result<Response, ServerError>;

/// Convert a ServerError into a JSON error response with a fitting status.
pub fn error_to_response(err: ServerError) -> Response {
    let status = match &err {
        ServerError::NotFound | ServerError::OutOfRange { .. } => 404,
        ServerError::BadRequest(_)
        | ServerError::InvalidStage(_)
        | ServerError::UnknownField(_) => 400,
        ServerError::MailerError(_) => 502,
        ServerError::DbError(_) | ServerError::XlsxError(_) | ServerError::InternalError => 500,
    };
    json_error_response(status, &err.to_string())
}

pub fn json_error_response(status: u16, message: &str) -> Response {
    let body = json!({ "error": message }).to_string();
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap()
}
