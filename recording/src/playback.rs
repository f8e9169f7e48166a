use crate::{data::InteractionRecord, error::Error, util};
use hyper::{Body, Request, Response, StatusCode};
use std::convert::TryFrom;

pub fn build_response(record: &InteractionRecord) -> Result<Response<Body>, Error> {
    let status = u16::try_from(record.status_code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or(Error::InvalidStatusCode(record.status_code))?;
    let mut response_builder = Response::builder().status(status);

    if let Some(headers_mut) = response_builder.headers_mut() {
        util::put_headers(
            headers_mut,
            record
                .response
                .headers
                .iter()
                // the whole body is written at once, so a chunked encoding
                // header would no longer describe it
                .filter(|(key, values)| {
                    !(key.eq_ignore_ascii_case("transfer-encoding")
                        && values.iter().any(|value| value.eq_ignore_ascii_case("chunked")))
                }),
        )?;
    }

    let body = record.response.body.clone().unwrap_or_default();
    Ok(response_builder.body(body.into())?)
}

pub fn build_request(record: &InteractionRecord) -> Result<Request<Body>, Error> {
    let mut request_builder = Request::builder()
        .uri(record.request_uri.as_str())
        .method(record.request_method.clone());

    if let Some(headers_mut) = request_builder.headers_mut() {
        util::put_headers(
            headers_mut,
            record
                .request
                .headers
                .iter()
                .filter(|(header_name, _)| !header_name.eq_ignore_ascii_case("host")),
        )?;
    }

    let body = record.request.body.clone().unwrap_or_default();
    Ok(request_builder.body(body.into())?)
}
