use crate::{
    data::{InteractionRecord, MessageBody},
    error::Error,
    util,
};
use hyper::{body, Body, Method, Request, Response};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub uri: String,
    pub message: MessageBody,
}

#[derive(Debug, Clone)]
pub struct CapturedResponse {
    pub status_code: u16,
    pub message: MessageBody,
}

pub async fn capture_request(request: Request<Body>) -> Result<CapturedRequest, Error> {
    let (parts, request_body) = request.into_parts();
    let bytes = body::to_bytes(request_body).await?;

    Ok(CapturedRequest {
        method: parts.method,
        uri: parts.uri.to_string(),
        message: MessageBody::new(util::extract_headers(&parts.headers), Some(bytes.to_vec())),
    })
}

pub async fn capture_response(response: Response<Body>) -> Result<CapturedResponse, Error> {
    let (parts, response_body) = response.into_parts();
    let bytes = body::to_bytes(response_body).await?;

    Ok(CapturedResponse {
        status_code: parts.status.as_u16(),
        message: MessageBody::new(util::extract_headers(&parts.headers), Some(bytes.to_vec())),
    })
}

impl CapturedRequest {
    pub fn into_record(self, response: CapturedResponse) -> InteractionRecord {
        InteractionRecord::from_exchange(
            self.method,
            self.uri,
            self.message,
            response.status_code,
            response.message,
        )
    }
}
