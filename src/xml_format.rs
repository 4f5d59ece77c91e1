//! XML codec over the flat-map projection.
//!
//! Records travel under a `<root>` wrapper element (XML has no top-level
//! list), one `<content>` element per record whose children are the flat-map
//! entries:
//!
//! ```xml
//! <root>
//!   <content>
//!     <IBAN>CH4431999123000889012</IBAN>
//!     <contentType>QrBill</contentType>
//!   </content>
//! </root>
//! ```

use crate::content::Content;
use crate::error::Result;
use crate::map_data::Map;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

pub fn write(contents: &[Content]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Start(BytesStart::new("root")))?;
    for content in contents {
        writer.write_event(Event::Start(BytesStart::new("content")))?;
        for (key, value) in content.to_map() {
            writer.write_event(Event::Start(BytesStart::new(key.as_str())))?;
            writer.write_event(Event::Text(BytesText::new(&value)))?;
            writer.write_event(Event::End(BytesEnd::new(key.as_str())))?;
        }
        writer.write_event(Event::End(BytesEnd::new("content")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("root")))?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

pub fn read(text: &str) -> Result<Vec<Content>> {
    let mut reader = Reader::from_str(text);
    let mut result = Vec::new();
    let mut map = Map::new();
    let mut current: Option<String> = None;
    let mut in_content = false;
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                match name.as_str() {
                    "root" => {}
                    "content" => {
                        in_content = true;
                        map.clear();
                    }
                    _ if in_content => current = Some(name),
                    _ => {}
                }
            }
            Event::Text(event) => {
                if let Some(key) = &current {
                    // the writer indents, so surrounding whitespace is noise
                    let value = event.unescape()?.trim().to_string();
                    if !value.is_empty() {
                        map.insert(key.clone(), value);
                    }
                }
            }
            Event::End(end) => {
                if end.name().as_ref() == b"content" {
                    in_content = false;
                    if !map.is_empty() {
                        result.push(Content::from_map(&map)?);
                        map.clear();
                    }
                } else {
                    current = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(result)
}
