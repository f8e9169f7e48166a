use crate::{data::CONTENT_TYPE, header_bag::HeaderBag};
use lazy_static::lazy_static;
use regex::Regex;
use std::{borrow::Cow, fmt::Debug};

lazy_static! {
    static ref CHARSET_REGEX: Regex =
        Regex::new(r#"(?i);\s*charset\s*=\s*"?(?P<charset>[^";\s]+)"?"#).unwrap();
    static ref TEXT_MEDIA_TYPE_REGEX: Regex = Regex::new(
        r"(?i)^(?:text/.*|.*json|.*xml|.*-urlencoded|application/x-www-form-urlencoded.*)$"
    )
    .unwrap();
    static ref BOUNDARY_REGEX: Regex = Regex::new(
        r#"(?i)^\s*multipart/mixed\s*;(?:.*;)?\s*boundary\s*=\s*(?:"(?P<quoted>[^"]+)"|(?P<bare>[^;\s]+))"#
    )
    .unwrap();
}

const MANIFEST_MEDIA_TYPES: [&str; 4] = [
    "application/vnd.docker.distribution.manifest.v2+json",
    "application/vnd.docker.distribution.manifest.list.v2+json",
    "application/vnd.oci.image.manifest.v1+json",
    "application/vnd.oci.image.index.v1+json",
];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl TextEncoding {
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes),
            TextEncoding::Latin1 => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
                .collect(),
        }
    }

    fn from_charset(charset: &str) -> Option<Self> {
        let charset = charset.to_ascii_lowercase();
        if charset.starts_with("utf-8") || charset == "utf8" {
            Some(TextEncoding::Utf8)
        } else if matches!(charset.as_str(), "iso-8859-1" | "latin1" | "l1") {
            Some(TextEncoding::Latin1)
        } else {
            None
        }
    }
}

pub trait ContentClassifier: Debug {
    fn text_encoding(&self, headers: &HeaderBag) -> Option<TextEncoding>;
    fn multipart_boundary(&self, headers: &HeaderBag) -> Option<String>;
    fn is_manifest_content_type(&self, content_type: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct DefaultContentClassifier;

impl DefaultContentClassifier {
    pub fn new() -> Self {
        Self
    }

    fn media_type(content_type: &str) -> &str {
        content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
    }
}

impl ContentClassifier for DefaultContentClassifier {
    fn text_encoding(&self, headers: &HeaderBag) -> Option<TextEncoding> {
        let content_type = headers.first(CONTENT_TYPE)?;

        // a known charset makes any media type text, multipart/mixed included
        if let Some(encoding) = CHARSET_REGEX
            .captures(content_type)
            .and_then(|captures| TextEncoding::from_charset(&captures["charset"]))
        {
            return Some(encoding);
        }

        if TEXT_MEDIA_TYPE_REGEX.is_match(Self::media_type(content_type)) {
            Some(TextEncoding::Utf8)
        } else {
            None
        }
    }

    fn multipart_boundary(&self, headers: &HeaderBag) -> Option<String> {
        let content_type = headers.first(CONTENT_TYPE)?;
        let captures = BOUNDARY_REGEX.captures(content_type)?;

        captures
            .name("quoted")
            .or_else(|| captures.name("bare"))
            .map(|boundary| boundary.as_str().to_string())
    }

    fn is_manifest_content_type(&self, content_type: &str) -> bool {
        let media_type = Self::media_type(content_type);
        MANIFEST_MEDIA_TYPES
            .iter()
            .any(|manifest| manifest.eq_ignore_ascii_case(media_type))
    }
}
