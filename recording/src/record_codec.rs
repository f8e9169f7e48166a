use crate::{
    codec_configuration::CodecConfiguration,
    content_type::TextEncoding,
    data::{parse_method, InteractionRecord, MessageBody},
    error::Error,
    header_bag::HeaderBag,
    json_body,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};
use std::{borrow::Cow, convert::TryFrom};
use tracing::{debug, warn};

const REQUEST_URI: &str = "RequestUri";
const LEGACY_REQUEST_URI: &str = "EncodedRequestUri";
const REQUEST_METHOD: &str = "RequestMethod";
const REQUEST_HEADERS: &str = "RequestHeaders";
const REQUEST_BODY: &str = "RequestBody";
const STATUS_CODE: &str = "StatusCode";
const RESPONSE_HEADERS: &str = "ResponseHeaders";
const RESPONSE_BODY: &str = "ResponseBody";

#[derive(Debug, Clone, Default)]
pub struct RecordCodec {
    configuration: CodecConfiguration,
}

impl RecordCodec {
    pub fn new(configuration: CodecConfiguration) -> Self {
        Self { configuration }
    }

    pub fn configuration(&self) -> &CodecConfiguration {
        &self.configuration
    }

    pub fn encode(&self, record: &InteractionRecord) -> Result<Value, Error> {
        let request = self.prepare(&record.request);
        let response = self.prepare(&record.response);

        let mut object = Map::new();
        object.insert(REQUEST_URI.into(), Value::String(record.request_uri.clone()));
        object.insert(
            REQUEST_METHOD.into(),
            Value::String(record.request_method.as_str().into()),
        );
        object.insert(REQUEST_HEADERS.into(), self.encode_headers(&request.headers));
        object.insert(REQUEST_BODY.into(), self.encode_body(&request)?);
        object.insert(STATUS_CODE.into(), Value::from(record.status_code));
        object.insert(RESPONSE_HEADERS.into(), self.encode_headers(&response.headers));
        object.insert(RESPONSE_BODY.into(), self.encode_body(&response)?);

        Ok(Value::Object(object))
    }

    pub fn decode(&self, node: &Value) -> Result<InteractionRecord, Error> {
        let object = node
            .as_object()
            .ok_or_else(|| Error::InvalidRecordFormat("expected an object".into()))?;
        let mut record = InteractionRecord::default();

        match object.get(REQUEST_METHOD) {
            None | Some(Value::Null) => {}
            Some(Value::String(method)) => record.request_method = parse_method(method)?,
            Some(other) => return Err(Error::InvalidMethod(other.to_string())),
        }

        match object.get(REQUEST_URI) {
            None | Some(Value::Null) => {}
            Some(Value::String(uri)) => record.request_uri = uri.clone(),
            Some(other) => {
                return Err(Error::InvalidRecordFormat(format!(
                    "{} must be a string, got {}",
                    REQUEST_URI, other
                )))
            }
        }

        record.is_legacy_format = object.contains_key(LEGACY_REQUEST_URI);

        // a status code that isn't a 32-bit integer is treated as absent
        if let Some(status_code) = object
            .get(STATUS_CODE)
            .and_then(Value::as_i64)
            .and_then(|code| i32::try_from(code).ok())
        {
            record.status_code = status_code;
        }

        record.request = self.decode_message(object, REQUEST_HEADERS, REQUEST_BODY)?;
        record.response = self.decode_message(object, RESPONSE_HEADERS, RESPONSE_BODY)?;

        Ok(record)
    }

    pub fn to_vec(&self, record: &InteractionRecord) -> Result<Vec<u8>, Error> {
        self.write(&self.encode(record)?)
    }

    pub fn from_slice(&self, bytes: &[u8]) -> Result<InteractionRecord, Error> {
        let node: Value = serde_json::from_slice(bytes)?;
        self.decode(&node)
    }

    pub(crate) fn write(&self, node: &Value) -> Result<Vec<u8>, Error> {
        Ok(json_body::write_value(
            node,
            self.configuration.json_escaping(),
            self.configuration.indented(),
        )?)
    }

    fn prepare<'a>(&self, message: &'a MessageBody) -> Cow<'a, MessageBody> {
        if self.configuration.normalize_on_encode() {
            Cow::Owned(json_body::normalize_if_json(
                message.clone(),
                &self.configuration,
            ))
        } else {
            Cow::Borrowed(message)
        }
    }

    fn decode_message(
        &self,
        object: &Map<String, Value>,
        headers_key: &str,
        body_key: &str,
    ) -> Result<MessageBody, Error> {
        let headers = match object.get(headers_key) {
            Some(headers) => self.decode_headers(headers)?,
            None => HeaderBag::new(),
        };

        match object.get(body_key) {
            Some(body) => self.decode_body(headers, body),
            None => Ok(MessageBody::new(headers, None)),
        }
    }

    pub fn encode_headers(&self, headers: &HeaderBag) -> Value {
        let mut object = Map::new();

        for (name, values) in headers {
            let value = match values {
                [single] => Value::String(single.clone()),
                values => Value::Array(values.iter().cloned().map(Value::String).collect()),
            };
            object.insert(name.to_string(), value);
        }

        Value::Object(object)
    }

    pub fn decode_headers(&self, node: &Value) -> Result<HeaderBag, Error> {
        let object = node
            .as_object()
            .ok_or_else(|| Error::InvalidHeaders(format!("expected an object, got {}", node)))?;
        let mut headers = HeaderBag::new();

        for (name, value) in object {
            let values = match value {
                Value::String(value) => vec![value.clone()],
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str().map(String::from).ok_or_else(|| {
                            Error::InvalidHeaders(format!("{} has a non-string value {}", name, item))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                other => {
                    return Err(Error::InvalidHeaders(format!(
                        "{} has a non-string value {}",
                        name, other
                    )))
                }
            };
            headers.insert(name.as_str(), values);
        }

        Ok(headers)
    }

    pub fn encode_body(&self, message: &MessageBody) -> Result<Value, Error> {
        let body = match &message.body {
            Some(body) => body,
            None => return Ok(Value::Null),
        };
        self.check_len(body.len())?;

        if body.is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        let classifier = self.configuration.content_classifier();

        if let Some(encoding) = classifier.text_encoding(&message.headers) {
            return Ok(encode_text(body, encoding));
        }

        if let Some(boundary) = classifier.multipart_boundary(&message.headers) {
            match self
                .configuration
                .multipart_codec()
                .encode(&boundary, body, self)
            {
                Ok(parts) if json_body::depth(&parts) > json_body::MAX_STORED_DEPTH => {
                    warn!("multipart body nests too deeply, storing it as base64")
                }
                Ok(parts) => {
                    debug!("stored multipart body with boundary {}", boundary);
                    return Ok(parts);
                }
                Err(e) => warn!("storing multipart body as base64: {}", e),
            }
        }

        debug!("stored {} byte body as base64", body.len());
        Ok(Value::String(STANDARD.encode(body)))
    }

    pub fn decode_body(&self, headers: HeaderBag, node: &Value) -> Result<MessageBody, Error> {
        if node.is_null() {
            return Ok(MessageBody::new(headers, None));
        }

        let classifier = self.configuration.content_classifier();

        if let Some(encoding) = classifier.text_encoding(&headers) {
            let bytes = match node {
                Value::Array(lines) => {
                    let mut text = String::new();
                    for line in lines {
                        text.push_str(line.as_str().ok_or_else(|| {
                            Error::InvalidBody(format!("text line {} is not a string", line))
                        })?);
                    }
                    encoding.encode(&text)
                }
                Value::String(text) => encoding.encode(text),
                other => {
                    let raw = json_body::write_value(
                        other,
                        json_body::JsonEscaping::Relaxed,
                        false,
                    )?;
                    encoding.encode(&String::from_utf8_lossy(&raw))
                }
            };
            self.check_len(bytes.len())?;

            return Ok(json_body::normalize_if_json(
                MessageBody::new(headers, Some(bytes)),
                &self.configuration,
            ));
        }

        if let (Some(boundary), Value::Array(parts)) = (classifier.multipart_boundary(&headers), node)
        {
            let bytes = self
                .configuration
                .multipart_codec()
                .decode(&boundary, parts, self)?;
            self.check_len(bytes.len())?;
            return Ok(MessageBody::new(headers, Some(bytes)));
        }

        if node.is_array() {
            return Ok(MessageBody::new(headers, Some(Vec::new())));
        }

        let encoded = node
            .as_str()
            .ok_or_else(|| Error::InvalidBody(format!("expected base64 text, got {}", node)))?;
        let bytes = STANDARD.decode(encoded)?;
        self.check_len(bytes.len())?;

        Ok(MessageBody::new(headers, Some(bytes)))
    }

    fn check_len(&self, len: usize) -> Result<(), Error> {
        match self.configuration.max_body_len() {
            Some(limit) if len > limit => Err(Error::BodyTooLarge { len, limit }),
            _ => Ok(()),
        }
    }
}

fn encode_text(body: &[u8], encoding: TextEncoding) -> Value {
    if let Some(document) = json_body::parse_document(body) {
        if json_body::is_structured_root(&document)
            && json_body::depth(&document) <= json_body::MAX_STORED_DEPTH
        {
            debug!("stored text body as a JSON document");
            return document;
        }
    }

    let text = encoding.decode(body);
    let lines = split_lines(&text);

    debug!("stored text body as {} line(s)", lines.len());
    if lines.len() == 1 && !ends_with_line_break(lines[0]) {
        Value::String(text.into_owned())
    } else {
        Value::Array(
            lines
                .into_iter()
                .map(|line| Value::String(line.to_string()))
                .collect(),
        )
    }
}

fn is_line_break(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

fn ends_with_line_break(line: &str) -> bool {
    line.as_bytes().last().copied().map_or(false, is_line_break)
}

/// Splits text after each line terminator, keeping the terminator.
///
/// A terminator is one `\r` or `\n`, swallowing one more `\r` or `\n` right
/// after it. An unterminated tail becomes the last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while index < bytes.len() {
        if is_line_break(bytes[index]) {
            let mut end = index + 1;
            if end < bytes.len() && is_line_break(bytes[end]) {
                end += 1;
            }
            lines.push(&text[start..end]);
            start = end;
            index = end;
        } else {
            index += 1;
        }
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}
