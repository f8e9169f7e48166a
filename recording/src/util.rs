use crate::{error::Error, header_bag::HeaderBag};
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap,
};

pub fn extract_headers(header_map: &HeaderMap) -> HeaderBag {
    let mut headers = HeaderBag::new();

    // it currently ignores header values with opaque characters
    for (name, value) in header_map {
        if let Ok(value) = value.to_str() {
            headers.append(name.as_str(), value);
        }
    }

    headers
}

pub fn put_headers<'a, I: IntoIterator<Item = (&'a str, &'a [String])>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, values) in headers {
        let header_name = HeaderName::from_lowercase(key.to_lowercase().as_bytes())?;
        for value in values {
            let header_value = HeaderValue::from_str(value)?;
            header_map.append(header_name.clone(), header_value);
        }
    }

    Ok(())
}
