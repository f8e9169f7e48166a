mod capture;
mod codec_configuration;
mod content_type;
mod data;
mod error;
mod header_bag;
mod hooks;
mod json_body;
pub mod multipart;
mod playback;
mod record_codec;
mod record_session;
pub mod util;

pub use capture::{capture_request, capture_response, CapturedRequest, CapturedResponse};
pub use codec_configuration::CodecConfiguration;
pub use content_type::{ContentClassifier, DefaultContentClassifier, TextEncoding};
pub use data::{parse_method, InteractionRecord, MessageBody, CONTENT_LENGTH, CONTENT_TYPE};
pub use error::Error;
pub use header_bag::HeaderBag;
pub use hooks::{ContentLengthUpdate, NormalizationHook};
pub use json_body::{normalize_if_json, JsonEscaping};
pub use multipart::{MixedMultipartCodec, MultipartCodec};
pub use playback::{build_request, build_response};
pub use record_codec::{split_lines, RecordCodec};
pub use record_session::RecordSession;
