use crate::{
    content_type::{ContentClassifier, DefaultContentClassifier},
    hooks::{ContentLengthUpdate, NormalizationHook},
    json_body::JsonEscaping,
    multipart::{MixedMultipartCodec, MultipartCodec},
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CodecConfiguration {
    json_escaping: JsonEscaping,
    indented: bool,
    normalize_on_encode: bool,
    max_body_len: Option<usize>,
    content_classifier: Arc<dyn ContentClassifier + Send + Sync>,
    multipart_codec: Arc<dyn MultipartCodec + Send + Sync>,
    normalization_hooks: Vec<Arc<dyn NormalizationHook + Send + Sync>>,
}

impl CodecConfiguration {
    pub fn new() -> Self {
        Self {
            json_escaping: JsonEscaping::Relaxed,
            indented: false,
            normalize_on_encode: false,
            max_body_len: None,
            content_classifier: Arc::new(DefaultContentClassifier::new()),
            multipart_codec: Arc::new(MixedMultipartCodec::new()),
            normalization_hooks: vec![Arc::new(ContentLengthUpdate::new())],
        }
    }

    pub fn set_json_escaping(&mut self, escaping: JsonEscaping) {
        self.json_escaping = escaping;
    }

    pub fn json_escaping(&self) -> JsonEscaping {
        self.json_escaping
    }

    pub fn set_indented(&mut self, value: bool) {
        self.indented = value;
    }

    pub fn indented(&self) -> bool {
        self.indented
    }

    pub fn set_normalize_on_encode(&mut self, value: bool) {
        self.normalize_on_encode = value;
    }

    pub fn normalize_on_encode(&self) -> bool {
        self.normalize_on_encode
    }

    pub fn set_max_body_len(&mut self, limit: Option<usize>) {
        self.max_body_len = limit;
    }

    pub fn max_body_len(&self) -> Option<usize> {
        self.max_body_len
    }

    pub fn set_content_classifier(
        &mut self,
        content_classifier: Arc<dyn ContentClassifier + Send + Sync>,
    ) {
        self.content_classifier = content_classifier;
    }

    pub fn content_classifier(&self) -> Arc<dyn ContentClassifier + Send + Sync> {
        self.content_classifier.clone()
    }

    pub fn set_multipart_codec(&mut self, multipart_codec: Arc<dyn MultipartCodec + Send + Sync>) {
        self.multipart_codec = multipart_codec;
    }

    pub fn multipart_codec(&self) -> Arc<dyn MultipartCodec + Send + Sync> {
        self.multipart_codec.clone()
    }

    pub fn set_normalization_hooks(
        &mut self,
        hooks: Vec<Arc<dyn NormalizationHook + Send + Sync>>,
    ) {
        self.normalization_hooks = hooks;
    }

    pub fn add_normalization_hook<H: NormalizationHook + Send + Sync + 'static>(
        &mut self,
        hook: H,
    ) {
        self.normalization_hooks.push(Arc::new(hook));
    }

    pub fn normalization_hooks(&self) -> &[Arc<dyn NormalizationHook + Send + Sync>] {
        &self.normalization_hooks
    }
}

impl Default for CodecConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
