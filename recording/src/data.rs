use crate::{error::Error, header_bag::HeaderBag};
use hyper::Method;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";

/// One side of an interaction: its headers and payload.
///
/// `body: None` (no body was captured) and `body: Some(vec![])` (an empty body)
/// are different states and are persisted differently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBody {
    pub headers: HeaderBag,
    pub body: Option<Vec<u8>>,
}

impl MessageBody {
    pub fn new(headers: HeaderBag, body: Option<Vec<u8>>) -> Self {
        Self { headers, body }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.first(CONTENT_TYPE)
    }

    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRecord {
    pub request_uri: String,
    pub request_method: Method,
    pub status_code: i32,
    pub is_legacy_format: bool,
    pub request: MessageBody,
    pub response: MessageBody,
}

impl Default for InteractionRecord {
    fn default() -> Self {
        Self {
            request_uri: String::new(),
            request_method: Method::GET,
            status_code: 0,
            is_legacy_format: false,
            request: MessageBody::default(),
            response: MessageBody::default(),
        }
    }
}

impl InteractionRecord {
    pub fn from_exchange<S: Into<String>>(
        method: Method,
        uri: S,
        request: MessageBody,
        status_code: u16,
        response: MessageBody,
    ) -> Self {
        Self {
            request_uri: uri.into(),
            request_method: method,
            status_code: i32::from(status_code),
            is_legacy_format: false,
            request,
            response,
        }
    }

    pub fn clone_for_sanitizing(&self) -> Self {
        Self {
            request_uri: self.request_uri.clone(),
            request: copy_message(&self.request),
            response: copy_message(&self.response),
            ..Self::default()
        }
    }
}

fn copy_message(message: &MessageBody) -> MessageBody {
    let mut headers = HeaderBag::new();
    for (name, values) in &message.headers {
        headers.insert(name, values.to_vec());
    }

    MessageBody {
        headers,
        body: message.body.as_ref().map(|body| body.to_vec()),
    }
}

pub fn parse_method(method: &str) -> Result<Method, Error> {
    const STANDARD: [Method; 9] = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::HEAD,
        Method::OPTIONS,
        Method::PATCH,
        Method::TRACE,
        Method::CONNECT,
    ];

    if let Some(standard) = STANDARD
        .iter()
        .find(|standard| standard.as_str().eq_ignore_ascii_case(method))
    {
        return Ok(standard.clone());
    }

    Method::from_bytes(method.as_bytes()).map_err(|_| Error::InvalidMethod(method.into()))
}
