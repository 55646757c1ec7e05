//! Parsing and re-encoding of the embedded legacy payload.
//!
//! The legacy service wrote its values with Python's `json.dumps`, so
//! encoding here follows the same output: `", "` and `": "` separators and
//! every non-ASCII character escaped as `\uXXXX`. Type names in messages
//! are the legacy ones too (`str`, `list`, `dict`, ...).

use super::error::MigrationAbortError;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::io;

/// The parsed legacy data: a JSON object keyed by legacy field name.
pub type Payload = Map<String, Value>;

/// Parses the raw payload stored under `key`.
///
/// Anything but a JSON object aborts the migration.
pub(crate) fn parse(key: &str, raw: &str) -> Result<Payload, MigrationAbortError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| MigrationAbortError::InvalidPayload(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(MigrationAbortError::PayloadNotObject {
            key: key.to_string(),
            type_name: type_name(&other),
        }),
    }
}

/// The legacy type name of a value, as used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Encodes a payload value into the string stored in a parameter.
pub fn encode(value: &Value) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, LegacyFormatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(<serde_json::Error as serde::ser::Error>::custom)
}

/// `json.dumps` layout: spaced separators, ASCII-only output.
struct LegacyFormatter;

impl Formatter for LegacyFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            return Ok(());
        }
        writer.write_all(b", ")
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            return Ok(());
        }
        writer.write_all(b", ")
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
