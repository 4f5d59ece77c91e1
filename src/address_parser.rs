//! Heuristic reconstruction of a structured address from free text.
//!
//! Input addresses arrive as a single string with line breaks, commas or
//! semicolons as separators. The parser peels lines off heuristically:
//! salutation, name, country, "postal-code city", "street number". Anything
//! left over is reported as a warning instead of silently disappearing.

use crate::address::Address;
use crate::error::Warning;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Country-name (lower case) to ISO-2 code table, loaded once from the
/// bundled CSV on first use and read-only afterwards.
static COUNTRIES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for line in include_str!("../resources/countries.csv").lines() {
        let mut parts = line.splitn(2, ',');
        match (parts.next(), parts.next()) {
            (Some(name), Some(code)) if !name.trim().is_empty() && !code.trim().is_empty() => {
                map.insert(name.trim().to_lowercase(), code.trim().to_string());
            }
            _ => log::warn!("country table entry has been ignored: {}", line),
        }
    }
    map
});

/// Looks up the ISO-2 code for a country name (case-insensitive).
pub fn country_code(name: &str) -> Option<String> {
    COUNTRIES.get(&name.trim().to_lowercase()).cloned()
}

/// Strategy for turning a free-text address string into an [`Address`].
///
/// The parser is an explicit dependency: callers that want a different
/// strategy construct their own implementation and pass it where an address
/// string is ingested, instead of swapping process-wide state.
pub trait AddressParser {
    /// Parses `text` into `address`, mutating it in place. Non-fatal
    /// findings (e.g. leftover lines) are returned as warnings.
    fn parse(&self, text: &str, address: &mut Address) -> Vec<Warning>;
}

/// Default line-peeling address parser.
#[derive(Debug, Clone)]
pub struct HeuristicParser {
    salutations: Vec<String>,
}

impl Default for HeuristicParser {
    fn default() -> Self {
        HeuristicParser {
            salutations: [
                "herr", "frau", "firma", "fräulein", "mr", "ms", "madame", "mme", "mmes", "mlle",
                "monsieur", "m.",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl HeuristicParser {
    /// Adds salutations that are dropped when they open an address.
    pub fn add_salutations<I: IntoIterator<Item = String>>(&mut self, salutations: I) {
        for s in salutations {
            self.salutations.push(s.to_lowercase());
        }
    }

    pub fn remove_salutations<'a, I: IntoIterator<Item = &'a str>>(&mut self, salutations: I) {
        for s in salutations {
            let lower = s.to_lowercase();
            self.salutations.retain(|existing| *existing != lower);
        }
    }

    pub fn salutations(&self) -> &[String] {
        &self.salutations
    }
}

impl AddressParser for HeuristicParser {
    fn parse(&self, text: &str, address: &mut Address) -> Vec<Warning> {
        let mut lines: Vec<&str> = text
            .split(['\r', '\n', ';', ','])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Vec::new();
        }

        if self.salutations.contains(&lines[0].to_lowercase()) {
            lines.remove(0);
        }
        if lines.is_empty() {
            return Vec::new();
        }

        let mut result = std::mem::take(address).name(lines.remove(0));

        if let Some(&last) = lines.last() {
            let code = if last.chars().count() == 2 {
                Some(last.to_string())
            } else {
                country_code(last)
            };
            match code {
                Some(code) => {
                    result = result.country_iso(&code);
                    lines.pop();
                }
                None => result = result.country_iso("CH"),
            }
        }

        if let Some(last) = lines.pop() {
            let split = Split::new(last);
            result = result.postal_code(&split.number_part).city(&split.text_part);
        }

        if let Some(last) = lines.pop() {
            let split = Split::new(last);
            result = result.street(&split.text_part).house_number(&split.number_part);
        }

        *address = result;

        if lines.is_empty() {
            Vec::new()
        } else {
            let message = format!("unprocessed address lines: {:?}", lines);
            log::warn!("{}", message);
            vec![Warning::new("address", message)]
        }
    }
}

/// Splits a line into a numeric token and the textual remainder.
///
/// If the token before the first space contains a digit it is the number
/// ("8001 Zürich"); otherwise the token after the last space is taken
/// ("Zürich 8001"). A line without spaces is all text.
struct Split {
    text_part: String,
    number_part: String,
}

impl Split {
    fn new(input: &str) -> Self {
        match input.find(' ') {
            Some(pos) => {
                let (left, right) = (&input[..pos], &input[pos + 1..]);
                if left.chars().any(|c| c.is_ascii_digit()) {
                    Split {
                        number_part: left.trim().to_string(),
                        text_part: right.trim().to_string(),
                    }
                } else {
                    let pos = input.rfind(' ').unwrap();
                    Split {
                        text_part: input[..pos].trim().to_string(),
                        number_part: input[pos + 1..].trim().to_string(),
                    }
                }
            }
            None => Split {
                text_part: input.trim().to_string(),
                number_part: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Address {
        let mut address = Address::new();
        HeuristicParser::default().parse(text, &mut address);
        address
    }

    #[test]
    fn test_full_address() {
        let address = parse("Herr\nPeter Muster\nBahnhofstrasse 12\n8001 Zürich\nSchweiz");
        assert_eq!(address.get_name(), "Peter Muster");
        assert_eq!(address.get_street(), "Bahnhofstrasse");
        assert_eq!(address.get_house_number(), "12");
        assert_eq!(address.get_postal_code(), "8001");
        assert_eq!(address.get_city(), "Zürich");
        assert_eq!(address.get_country_iso(), "CH");
    }

    #[test]
    fn test_country_defaults_to_ch() {
        let address = parse("Peter Muster, Bahnhofstrasse 12, 8001 Zürich");
        assert_eq!(address.get_country_iso(), "CH");
        assert_eq!(address.get_city(), "Zürich");
    }

    #[test]
    fn test_postal_code_after_city() {
        let address = parse("Peter Muster; Zürich 8001");
        assert_eq!(address.get_postal_code(), "8001");
        assert_eq!(address.get_city(), "Zürich");
    }

    #[test]
    fn test_country_by_name() {
        let address = parse("Hans Beispiel\nHauptstrasse 5\n10115 Berlin\nDeutschland");
        assert_eq!(address.get_country_iso(), "DE");
    }

    #[test]
    fn test_leftover_lines_reported() {
        let mut address = Address::new();
        let warnings = HeuristicParser::default().parse(
            "Peter Muster\nc/o Hans\nPostfach 17\nBahnhofstrasse 12\n8001 Zürich\nCH",
            &mut address,
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("c/o Hans"));
        assert_eq!(address.get_street(), "Bahnhofstrasse");
    }

    #[test]
    fn test_name_only() {
        let address = parse("Peter Muster");
        assert_eq!(address.get_name(), "Peter Muster");
        assert_eq!(address.get_country_iso(), "");
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(country_code("Switzerland").as_deref(), Some("CH"));
        assert_eq!(country_code("schweiz").as_deref(), Some("CH"));
        assert_eq!(country_code("Atlantis"), None);
    }
}
