use crate::multipart::error::MultipartError;
use hyper::http;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The recorded headers are invalid: {0}")]
    InvalidHeaders(String),
    #[error("The recorded body is invalid: {0}")]
    InvalidBody(String),
    #[error("The recorded request method is invalid: {0}")]
    InvalidMethod(String),
    #[error("The status code {0} is invalid")]
    InvalidStatusCode(i32),
    #[error("The record format is invalid: {0}")]
    InvalidRecordFormat(String),
    #[error("The session format is invalid: {0}")]
    InvalidSessionFormat(String),
    #[error("Body of {len} bytes exceeds the configured limit of {limit} bytes")]
    BodyTooLarge { len: usize, limit: usize },
    #[error("Base64 error: {0}")]
    Base64Error(#[from] base64::DecodeError),
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Multipart error: {0}")]
    MultipartError(#[from] MultipartError),
    #[error("Invalid header name")]
    InvalidHeaderName,
    #[error("Invalid header value")]
    InvalidHeaderValue,
    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),
    #[error("Http Error: {0}")]
    HttpError(#[from] http::Error),
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}
