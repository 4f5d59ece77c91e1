//! CSV codec over the flat-map projection.
//!
//! The header row is the sorted union of the keys of all records; every
//! record row carries the value for each column or an empty cell. Reading
//! goes the other way: header plus row become a map, the map becomes a
//! record via its `contentType` column (a missing column means QR bills).

use crate::content::Content;
use crate::error::Result;
use crate::map_data::Map;
use crate::validate::is_empty;
use std::collections::BTreeSet;

pub fn write(contents: &[Content]) -> Result<String> {
    let maps: Vec<Map> = contents.iter().map(Content::to_map).collect();
    let mut columns = BTreeSet::new();
    for map in &maps {
        columns.extend(map.keys().cloned());
    }
    let columns: Vec<String> = columns.into_iter().collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for map in &maps {
        let row: Vec<&str> = columns
            .iter()
            .map(|column| map.get(column).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn read(text: &str) -> Result<Vec<Content>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    let mut result = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut map = Map::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if !is_empty(value) {
                map.insert(header.trim().to_string(), value.to_string());
            }
        }
        if map.is_empty() {
            continue;
        }
        result.push(Content::from_map(&map)?);
    }
    Ok(result)
}
