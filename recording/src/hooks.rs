use crate::data::{MessageBody, CONTENT_LENGTH};
use std::fmt::Debug;

pub trait NormalizationHook: Debug {
    fn after_normalization(&self, message: &mut MessageBody);
}

#[derive(Debug, Default)]
pub struct ContentLengthUpdate;

impl ContentLengthUpdate {
    pub fn new() -> Self {
        Self
    }
}

impl NormalizationHook for ContentLengthUpdate {
    fn after_normalization(&self, message: &mut MessageBody) {
        let length = message.body_len().to_string();
        if let Some(values) = message.headers.get_mut(CONTENT_LENGTH) {
            *values = vec![length];
        }
    }
}
