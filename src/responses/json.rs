// responses/json.rs
use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use serde::Serialize;
use serde_json::json;

/// Return a serializable value as a JSON response.
pub fn json_response(value: &impl Serialize) -> ResultResp {
    let body = serde_json::to_string(value)
        .map_err(|e| ServerError::BadRequest(format!("Serialize response failed: {e}")))?;

    let resp = ResponseBuilder::new()
        .status(200)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)?;

    Ok(resp)
}

/// Plain acknowledgement for mutations with nothing interesting to return.
pub fn ok_response() -> ResultResp {
    json_response(&json!({ "ok": true }))
}
