pub mod error;

use crate::{data::MessageBody, error::Error, header_bag::HeaderBag, record_codec::RecordCodec};
use error::{FramingProblem, MultipartError};
use serde_json::{Map, Value};
use std::fmt::Debug;

const PART_HEADERS: &str = "Headers";
const PART_BODY: &str = "Body";

pub trait MultipartCodec: Debug {
    fn encode(&self, boundary: &str, body: &[u8], codec: &RecordCodec) -> Result<Value, Error>;
    fn decode(&self, boundary: &str, parts: &[Value], codec: &RecordCodec)
        -> Result<Vec<u8>, Error>;
}

/// `multipart/mixed` framing with CRLF line breaks.
///
/// Only bodies that re-frame byte for byte are accepted by `encode`: no
/// preamble, a single CRLF after the closing delimiter, and `Name: value`
/// header lines.
#[derive(Debug, Default)]
pub struct MixedMultipartCodec;

impl MixedMultipartCodec {
    pub fn new() -> Self {
        Self
    }

    fn split_parts<'a>(boundary: &str, body: &'a [u8]) -> Result<Vec<&'a [u8]>, MultipartError> {
        let delimiter = format!("\r\n--{}", boundary).into_bytes();
        let opening = &delimiter[2..];

        let mut rest = body
            .strip_prefix(opening)
            .and_then(|rest| rest.strip_prefix(b"\r\n"))
            .ok_or(MultipartError::InvalidFraming {
                part: 0,
                problem: FramingProblem::MissingOpeningDelimiter,
            })?;

        let mut parts = Vec::new();
        let mut search_from = 0;

        loop {
            let position = find(&rest[search_from..], &delimiter)
                .map(|position| position + search_from)
                .ok_or(MultipartError::InvalidFraming {
                    part: parts.len(),
                    problem: FramingProblem::MissingClosingDelimiter,
                })?;
            let after = &rest[position + delimiter.len()..];

            if let Some(epilogue) = after.strip_prefix(b"--") {
                if epilogue != b"\r\n" {
                    return Err(MultipartError::InvalidFraming {
                        part: parts.len(),
                        problem: FramingProblem::UnexpectedEpilogue,
                    });
                }
                parts.push(&rest[..position]);
                return Ok(parts);
            }

            if let Some(next) = after.strip_prefix(b"\r\n") {
                parts.push(&rest[..position]);
                rest = next;
                search_from = 0;
            } else {
                // the delimiter text is only a prefix of a longer line
                search_from = position + 1;
            }
        }
    }

    fn parse_part(index: usize, raw: &[u8]) -> Result<(HeaderBag, &[u8]), MultipartError> {
        let framing_error = |problem| MultipartError::InvalidFraming {
            part: index,
            problem,
        };

        if let Some(body) = raw.strip_prefix(b"\r\n") {
            return Ok((HeaderBag::new(), body));
        }

        let header_end =
            find(raw, b"\r\n\r\n").ok_or_else(|| framing_error(FramingProblem::MissingHeaderTerminator))?;
        let header_block = std::str::from_utf8(&raw[..header_end])
            .map_err(|_| framing_error(FramingProblem::NonTextHeaders))?;

        let mut headers = HeaderBag::new();
        for line in header_block.split("\r\n") {
            let colon = line
                .find(':')
                .ok_or_else(|| framing_error(FramingProblem::MalformedHeaderLine))?;
            let value = &line[colon + 1..];
            headers.append(&line[..colon], value.strip_prefix(' ').unwrap_or(value));
        }

        let mut rebuilt = Vec::with_capacity(header_end + 4);
        write_part_headers(&mut rebuilt, &headers);
        if rebuilt != raw[..header_end + 4] {
            return Err(framing_error(FramingProblem::NonCanonicalHeaderLine));
        }

        Ok((headers, &raw[header_end + 4..]))
    }
}

impl MultipartCodec for MixedMultipartCodec {
    fn encode(&self, boundary: &str, body: &[u8], codec: &RecordCodec) -> Result<Value, Error> {
        if boundary.is_empty() {
            return Err(MultipartError::EmptyBoundary.into());
        }

        let mut parts = Vec::new();
        for (index, raw) in Self::split_parts(boundary, body)?.into_iter().enumerate() {
            let (headers, part_body) = Self::parse_part(index, raw)?;
            let message = MessageBody::new(headers, Some(part_body.to_vec()));

            let mut part = Map::new();
            part.insert(PART_HEADERS.into(), codec.encode_headers(&message.headers));
            part.insert(PART_BODY.into(), codec.encode_body(&message)?);
            parts.push(Value::Object(part));
        }

        Ok(Value::Array(parts))
    }

    fn decode(
        &self,
        boundary: &str,
        parts: &[Value],
        codec: &RecordCodec,
    ) -> Result<Vec<u8>, Error> {
        if parts.is_empty() {
            return Ok(Vec::new());
        }
        if boundary.is_empty() {
            return Err(MultipartError::EmptyBoundary.into());
        }

        let mut body = Vec::new();
        for (index, part) in parts.iter().enumerate() {
            let invalid_part = |reason: &str| MultipartError::InvalidPart {
                part: index,
                reason: reason.into(),
            };

            let part = part
                .as_object()
                .ok_or_else(|| invalid_part("the part is not an object"))?;
            let headers = match part.get(PART_HEADERS) {
                Some(headers) => codec.decode_headers(headers)?,
                None => HeaderBag::new(),
            };
            let body_node = part
                .get(PART_BODY)
                .ok_or_else(|| invalid_part("the part has no body"))?;
            let message = codec.decode_body(headers, body_node)?;

            if index > 0 {
                body.extend_from_slice(b"\r\n");
            }
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            write_part_headers(&mut body, &message.headers);
            if let Some(part_body) = &message.body {
                body.extend_from_slice(part_body);
            }
        }
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Ok(body)
    }
}

fn write_part_headers(output: &mut Vec<u8>, headers: &HeaderBag) {
    for (name, values) in headers {
        for value in values {
            output.extend_from_slice(name.as_bytes());
            output.extend_from_slice(b": ");
            output.extend_from_slice(value.as_bytes());
            output.extend_from_slice(b"\r\n");
        }
    }
    output.extend_from_slice(b"\r\n");
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
