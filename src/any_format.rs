//! Format auto-detection: sniffs an arbitrary input string and dispatches
//! to the matching codec.
//!
//! Classification is heuristic and order-sensitive by design: the cheap
//! structural signatures are probed in a fixed priority order and the first
//! hit wins. A text that merely resembles one of the formats is decoded as
//! that format; there is no content-based verification beyond the decode
//! itself.

use crate::content::Content;
use crate::error::{Decoded, Error, Result};
use crate::{csv_format, epc_format, json_format, name_value_format, spc_format, xml_format};

/// The serialized representations the dispatcher knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Spc,
    Epc,
    Json,
    Xml,
    Csv,
    NameValue,
}

impl Format {
    /// Classifies a (normalized) input text, or fails with
    /// [`Error::UnsupportedFormat`].
    pub fn detect(text: &str) -> Result<Format> {
        if text.starts_with('[') {
            Ok(Format::Json)
        } else if text.contains("<root>") {
            Ok(Format::Xml)
        } else if text.starts_with("SPC") {
            Ok(Format::Spc)
        } else if text.starts_with("BCD") {
            Ok(Format::Epc)
        } else if text.matches(':').count() > 5 {
            Ok(Format::NameValue)
        } else if first_line(text).contains(',') {
            Ok(Format::Csv)
        } else {
            Err(Error::UnsupportedFormat(abbreviate(text)))
        }
    }

    /// Decodes `text` as this format.
    pub fn read(&self, text: &str) -> Result<Decoded<Vec<Content>>> {
        match self {
            Format::Spc => spc_format::read(text),
            Format::Epc => epc_format::read(text),
            Format::Json => Ok(Decoded::new(json_format::read(text)?)),
            Format::Xml => Ok(Decoded::new(xml_format::read(text)?)),
            Format::Csv => Ok(Decoded::new(csv_format::read(text)?)),
            Format::NameValue => Ok(Decoded::new(name_value_format::read(text)?)),
        }
    }

    /// Encodes `contents` in this format.
    pub fn write(&self, contents: &[Content]) -> Result<String> {
        match self {
            Format::Spc => Ok(spc_format::write(contents)),
            Format::Epc => Ok(epc_format::write(contents)),
            Format::Json => json_format::write(contents),
            Format::Xml => xml_format::write(contents),
            Format::Csv => csv_format::write(contents),
            Format::NameValue => Ok(name_value_format::write(contents)),
        }
    }
}

impl std::str::FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Format> {
        match s.to_lowercase().as_str() {
            "spc" | "qr" => Ok(Format::Spc),
            "epc" | "bcd" => Ok(Format::Epc),
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "csv" => Ok(Format::Csv),
            "namevalue" | "nv" => Ok(Format::NameValue),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Detects the format of `text` and decodes it. Literal `\n` escapes are
/// expanded first so payloads that were flattened into a single line (query
/// parameters, spreadsheet cells) still decode.
pub fn read(text: &str) -> Result<Decoded<Vec<Content>>> {
    let normalized = text.trim().replace("\\n", "\n");
    Format::detect(&normalized)?.read(&normalized)
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

fn abbreviate(text: &str) -> String {
    let mut result: String = text.chars().take(40).collect();
    if result.len() < text.len() {
        result.push_str("...");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detection_priority() {
        assert_eq!(Format::detect("[{}]").unwrap(), Format::Json);
        assert_eq!(Format::detect("<root></root>").unwrap(), Format::Xml);
        assert_eq!(Format::detect("SPC\n0200\n1").unwrap(), Format::Spc);
        assert_eq!(Format::detect("BCD\nV002").unwrap(), Format::Epc);
        assert_eq!(
            Format::detect("a: 1\nb: 2\nc: 3\nd: 4\ne: 5\nf: 6").unwrap(),
            Format::NameValue
        );
        assert_eq!(Format::detect("IBAN,Currency\nCH44,CHF").unwrap(), Format::Csv);
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            Format::detect("hello world"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_escaped_newlines_are_expanded() {
        let text = "SPC\\n0200\\n1\\nCH4431999123000889012\\nS\\nRobert Schneider AG\\nRue du Lac\\n1268\\n2501\\nBiel\\nCH\\n\\n\\n\\n\\n\\n\\n\\n10.00\\nCHF\\n\\n\\n\\n\\n\\n\\n\\nNON\\n\\n\\nEPD";
        let decoded = read(text).unwrap();
        assert_eq!(decoded.value.len(), 1);
    }

    #[test]
    fn test_csv_needs_a_comma_in_the_first_line() {
        // one colon only, no comma: neither name-value nor CSV
        assert!(Format::detect("a: b").is_err());
    }
}
