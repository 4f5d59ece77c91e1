//! Name-value text codec: one `Key: value` line per flat-map entry.
//!
//! There is no record delimiter. A key that was already seen starts the
//! next record, and the repeated pair belongs to that new record. Values
//! may contain colons; only the first colon of a line separates the key.

use crate::content::Content;
use crate::error::Result;
use crate::map_data::Map;
use crate::validate::is_empty;

pub fn write(contents: &[Content]) -> String {
    let mut lines = Vec::new();
    for content in contents {
        for (key, value) in content.to_map() {
            lines.push(format!("{}: {}", key, value));
        }
    }
    let mut text = lines.join("\r\n");
    if !text.is_empty() {
        text.push_str("\r\n");
    }
    text
}

pub fn read(text: &str) -> Result<Vec<Content>> {
    let mut result = Vec::new();
    let mut map = Map::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        if map.contains_key(key) {
            result.push(Content::from_map(&map)?);
            map.clear();
        }
        let value = value.trim();
        if !is_empty(value) {
            map.insert(key.to_string(), value.to_string());
        }
    }
    if !map.is_empty() {
        result.push(Content::from_map(&map)?);
    }
    Ok(result)
}
