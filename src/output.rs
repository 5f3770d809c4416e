//! Rendering of inventory output for stdout.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Render `value` in the requested format.
///
/// YAML is a debugging aid; when it cannot be produced the JSON rendering is
/// used instead so stdout always carries a document Ansible can read.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(value),
        OutputFormat::Yaml => to_yaml(value).or_else(|err| {
            debug!(%err, "YAML rendering failed, falling back to JSON");
            to_json(value)
        }),
    }
}

/// Single-line JSON in the layout Ansible inventory scripts traditionally
/// print: `", "` and `": "` separators, non-ASCII escaped as `\uXXXX`.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, InventoryFormatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(|err| Error::Render(err.to_string()))
}

/// Block-style YAML preceded by a `---` document marker.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    let yaml = serde_yaml::to_string(value)?;
    Ok(format!("---\n{}", yaml.trim_end()))
}

struct InventoryFormatter;

impl Formatter for InventoryFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
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
            writer.write_all(&fragment.as_bytes()[start..index])?;
            let mut units = [0_u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}
