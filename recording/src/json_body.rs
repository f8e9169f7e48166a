use crate::{codec_configuration::CodecConfiguration, data::MessageBody};
use serde::Serialize;
use serde_json::{
    ser::{CompactFormatter, Formatter, PrettyFormatter},
    Serializer, Value,
};
use std::io;
use tracing::trace;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum JsonEscaping {
    Relaxed,
    Strict,
}

impl Default for JsonEscaping {
    fn default() -> Self {
        JsonEscaping::Relaxed
    }
}

struct EscapingFormatter<F> {
    inner: F,
    escaping: JsonEscaping,
}

impl<F: Formatter> Formatter for EscapingFormatter<F> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        match self.escaping {
            JsonEscaping::Relaxed => writer.write_all(fragment.as_bytes()),
            JsonEscaping::Strict => write_strict_fragment(writer, fragment),
        }
    }
}

fn needs_strict_escape(c: char) -> bool {
    !c.is_ascii() || matches!(c, '<' | '>' | '&' | '\'' | '+' | '`')
}

fn write_strict_fragment<W: ?Sized + io::Write>(writer: &mut W, fragment: &str) -> io::Result<()> {
    let mut start = 0;

    for (index, c) in fragment.char_indices() {
        if !needs_strict_escape(c) {
            continue;
        }

        writer.write_all(fragment[start..index].as_bytes())?;
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            write!(writer, "\\u{:04X}", unit)?;
        }
        start = index + c.len_utf8();
    }

    writer.write_all(fragment[start..].as_bytes())
}

pub fn write_value(
    value: &Value,
    escaping: JsonEscaping,
    indented: bool,
) -> Result<Vec<u8>, serde_json::Error> {
    let mut output = Vec::new();

    if indented {
        let formatter = EscapingFormatter {
            inner: PrettyFormatter::with_indent(b"  "),
            escaping,
        };
        value.serialize(&mut Serializer::with_formatter(&mut output, formatter))?;
    } else {
        let formatter = EscapingFormatter {
            inner: CompactFormatter,
            escaping,
        };
        value.serialize(&mut Serializer::with_formatter(&mut output, formatter))?;
    }

    Ok(output)
}

// serde_json rejects input nested 128 levels deep, and a session file wraps
// every body node in three levels of its own
pub const MAX_STORED_DEPTH: usize = 124;

pub fn depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        Value::Object(members) => 1 + members.values().map(depth).max().unwrap_or(0),
        _ => 0,
    }
}

pub fn parse_document(bytes: &[u8]) -> Option<Value> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            trace!("body is not a JSON document: {}", e);
            None
        }
    }
}

/// Whether a parsed body may be stored as the body node itself.
///
/// Arrays and strings are how line-split text is stored, so those roots would
/// be ambiguous; a `null` root would read back as "no body".
pub fn is_structured_root(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::String(_) | Value::Null)
}

pub fn normalize_if_json(mut message: MessageBody, config: &CodecConfiguration) -> MessageBody {
    let is_json = match message.content_type() {
        Some(content_type) => {
            content_type.to_ascii_lowercase().contains("json")
                && !config
                    .content_classifier()
                    .is_manifest_content_type(content_type)
        }
        None => false,
    };

    if !is_json {
        return message;
    }

    let document = match message.body.as_deref().and_then(parse_document) {
        Some(document) => document,
        None => return message,
    };

    match write_value(&document, JsonEscaping::Relaxed, false) {
        Ok(normalized) => {
            message.body = Some(normalized);
            for hook in config.normalization_hooks() {
                hook.after_normalization(&mut message);
            }
        }
        Err(e) => trace!("couldn't re-serialize JSON body: {}", e),
    }

    message
}
