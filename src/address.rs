//! Address model for the creditor, ultimate creditor and debtor roles.
//!
//! The payment standard knows two mutually exclusive address encodings:
//! structured (street / house number / postal code / city) and unstructured
//! (two free-text lines). The same struct backs both; the two free-text lines
//! are stored in the street and house-number slots, exactly as they travel on
//! the wire.

use crate::address_parser::{country_code, AddressParser, HeuristicParser};
use crate::error::ValidationError;
use crate::validate::{check_mandatory_length, is_empty};
use serde::{Deserialize, Serialize};

/// Structured ("S") or unstructured ("U") addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressType {
    /// Discrete street / house number / postal code / city fields.
    #[serde(rename = "S")]
    Structured,
    /// Two free-text address lines.
    #[serde(rename = "U")]
    Unstructured,
}

impl AddressType {
    /// The single-letter marker used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Structured => "S",
            AddressType::Unstructured => "U",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "S" => Some(AddressType::Structured),
            "U" => Some(AddressType::Unstructured),
            _ => None,
        }
    }
}

/// Postal address of one payment party.
///
/// Built empty, from a free-text string (via the heuristic parser) or through
/// the fluent setters. The structured setters tag the address as structured,
/// the `address_line` setters tag it as unstructured; an explicitly set type
/// always wins over that inference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    street: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    house_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    postal_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    city: String,
    #[serde(rename = "country", skip_serializing_if = "String::is_empty")]
    country_iso: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_type: Option<AddressType>,
}

impl Address {
    pub fn new() -> Self {
        Address::default()
    }

    /// Creates an address by parsing a free-text address string with the
    /// default heuristic parser. Non-fatal parser findings are logged by the
    /// parser; callers that need them use [`AddressParser::parse`] directly.
    pub fn from_text(text: &str) -> Self {
        let mut address = Address::new();
        HeuristicParser::default().parse(text, &mut address);
        address
    }

    /// Defines a complete structured address.
    pub fn structured(
        name: &str,
        street: &str,
        house_number: &str,
        postal_code: &str,
        city: &str,
        country: &str,
    ) -> Self {
        Address::new()
            .name(name)
            .street(street)
            .house_number(house_number)
            .postal_code(postal_code)
            .city(city)
            .country(country)
    }

    /// Defines a complete unstructured address.
    pub fn unstructured(name: &str, line1: &str, line2: &str, country: &str) -> Self {
        Address::new()
            .name(name)
            .address_line1(line1)
            .address_line2(line2)
            .country(country)
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn street(mut self, street: &str) -> Self {
        self.address_type = Some(AddressType::Structured);
        self.street = street.to_string();
        self
    }

    pub fn house_number(mut self, house_number: &str) -> Self {
        self.address_type = Some(AddressType::Structured);
        self.house_number = house_number.to_string();
        self
    }

    pub fn postal_code(mut self, postal_code: &str) -> Self {
        self.address_type = Some(AddressType::Structured);
        self.postal_code = postal_code.to_string();
        self
    }

    pub fn city(mut self, city: &str) -> Self {
        self.address_type = Some(AddressType::Structured);
        self.city = city.to_string();
        self
    }

    /// First free-text line (unstructured addresses only).
    pub fn address_line1(mut self, line1: &str) -> Self {
        self.address_type = Some(AddressType::Unstructured);
        self.street = line1.to_string();
        self
    }

    /// Second free-text line (unstructured addresses only).
    pub fn address_line2(mut self, line2: &str) -> Self {
        self.address_type = Some(AddressType::Unstructured);
        self.house_number = line2.to_string();
        self
    }

    /// Defines the country from an ISO-2 code or a country name; names are
    /// looked up in the bundled country table.
    pub fn country(mut self, country: &str) -> Self {
        self.country_iso = if country.chars().count() == 2 {
            country.to_uppercase()
        } else {
            country_code(country).unwrap_or_default()
        };
        self
    }

    /// Defines the country ISO-2 code directly, without a table lookup.
    pub fn country_iso(mut self, country_iso: &str) -> Self {
        self.country_iso = country_iso.to_string();
        self
    }

    /// Pins the addressing mode explicitly. This is usually not necessary
    /// because the setters tag it already.
    pub fn address_type(mut self, address_type: AddressType) -> Self {
        self.address_type = Some(address_type);
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_street(&self) -> &str {
        &self.street
    }

    pub fn get_house_number(&self) -> &str {
        &self.house_number
    }

    pub fn get_postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn get_city(&self) -> &str {
        &self.city
    }

    pub fn get_country_iso(&self) -> &str {
        &self.country_iso
    }

    /// The effective addressing mode. If no setter pinned it, it is inferred
    /// from which fields are populated; a completely empty address has none.
    pub fn get_address_type(&self) -> Option<AddressType> {
        if self.address_type.is_some() {
            return self.address_type;
        }
        if !is_empty(&self.street) {
            if is_empty(&self.city) {
                Some(AddressType::Structured)
            } else {
                Some(AddressType::Unstructured)
            }
        } else {
            None
        }
    }

    /// An address takes part in validation and rendering once it has a name.
    pub fn is_defined(&self) -> bool {
        !is_empty(&self.name)
    }

    /// First printable address line: street + house number for structured
    /// addresses, the first free-text line otherwise.
    pub fn printed_line1(&self) -> String {
        if self.get_address_type() == Some(AddressType::Unstructured) {
            self.street.clone()
        } else if self.house_number.is_empty() {
            self.street.clone()
        } else {
            format!("{} {}", self.street, self.house_number)
        }
    }

    /// Second printable address line: "CC-postal city" for structured
    /// addresses, the second free-text line otherwise.
    pub fn printed_line2(&self) -> String {
        if self.get_address_type() == Some(AddressType::Unstructured) {
            self.house_number.clone()
        } else if self.country_iso.is_empty() {
            format!("{} {}", self.postal_code, self.city)
        } else {
            format!("{}-{} {}", self.country_iso, self.postal_code, self.city)
        }
    }

    /// The full printable address with the given line delimiter.
    pub fn printed(&self, delimiter: &str) -> String {
        [self.name.clone(), self.printed_line1(), self.printed_line2()].join(delimiter)
    }

    /// Checks completeness for the given role ("Creditor", "UltimateCreditor"
    /// or "Debitor"); the role becomes the field-name prefix of the errors.
    pub fn check(&self, role: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_mandatory_length(&format!("{}Name", role), true, 70, &self.name, &mut errors);
        if self.get_address_type() == Some(AddressType::Structured) {
            check_mandatory_length(&format!("{}Street", role), false, 70, &self.street, &mut errors);
            check_mandatory_length(
                &format!("{}HouseNumber", role),
                false,
                16,
                &self.house_number,
                &mut errors,
            );
            check_mandatory_length(
                &format!("{}PostalCode", role),
                true,
                16,
                &self.postal_code,
                &mut errors,
            );
            check_mandatory_length(&format!("{}City", role), true, 35, &self.city, &mut errors);
        } else {
            check_mandatory_length(
                &format!("{}AddressLine1", role),
                true,
                70,
                &self.street,
                &mut errors,
            );
            check_mandatory_length(
                &format!("{}AddressLine2", role),
                true,
                70,
                &self.house_number,
                &mut errors,
            );
        }
        errors
    }

    /// The seven wire lines of a version "0200" address block: type marker,
    /// name, four field slots and the country. An undefined address renders
    /// as seven empty lines.
    pub fn wire_lines(&self) -> Vec<String> {
        let marker = match self.get_address_type() {
            Some(t) if self.is_defined() => t.as_str().to_string(),
            _ => String::new(),
        };
        vec![
            marker,
            self.name.clone(),
            self.street.clone(),
            self.house_number.clone(),
            self.postal_code.clone(),
            self.city.clone(),
            if self.is_defined() {
                self.country_iso.clone()
            } else {
                String::new()
            },
        ]
    }

    /// The six wire lines of the legacy version "0100" address block, which
    /// has no type marker and is always structured.
    pub fn wire_lines_v1(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.street.clone(),
            self.house_number.clone(),
            self.postal_code.clone(),
            self.city.clone(),
            if self.is_defined() {
                self.country_iso.clone()
            } else {
                String::new()
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_structured_inference() {
        let address = Address {
            street: "Bahnhofstrasse".to_string(),
            ..Address::default()
        };
        assert_eq!(address.get_address_type(), Some(AddressType::Structured));
    }

    #[test]
    fn test_unstructured_setters_tag_the_type() {
        let address = Address::new()
            .name("Pia Rutschmann")
            .address_line1("Marktgasse 28")
            .address_line2("9400 Rorschach");
        assert_eq!(address.get_address_type(), Some(AddressType::Unstructured));
        assert_eq!(address.printed_line1(), "Marktgasse 28");
        assert_eq!(address.printed_line2(), "9400 Rorschach");
    }

    #[test]
    fn test_explicit_type_wins_over_inference() {
        let address = Address::new()
            .address_line1("Marktgasse 28")
            .address_type(AddressType::Structured);
        assert_eq!(address.get_address_type(), Some(AddressType::Structured));
    }

    #[test]
    fn test_empty_address_has_no_type() {
        assert_eq!(Address::new().get_address_type(), None);
        assert!(!Address::new().is_defined());
    }

    #[test]
    fn test_check_structured() {
        let address = Address::structured("Robert Schneider AG", "Rue du Lac", "1268", "2501", "Biel", "CH");
        assert!(address.check("Creditor").is_empty());

        let incomplete = Address::new().name("Robert Schneider AG").street("Rue du Lac");
        let errors = incomplete.check("Creditor");
        let fields: Vec<&str> = errors.iter().map(|e| e.field_name.as_str()).collect();
        assert!(fields.contains(&"CreditorPostalCode"));
        assert!(fields.contains(&"CreditorCity"));
    }

    #[test]
    fn test_wire_lines() {
        let address = Address::structured("Robert Schneider AG", "Rue du Lac", "1268", "2501", "Biel", "CH");
        assert_eq!(
            address.wire_lines(),
            vec!["S", "Robert Schneider AG", "Rue du Lac", "1268", "2501", "Biel", "CH"]
        );
        assert_eq!(Address::new().wire_lines(), vec![""; 7]);
    }

    #[test]
    fn test_printed_structured_with_country() {
        let address = Address::structured("Robert Schneider AG", "Rue du Lac", "1268", "2501", "Biel", "CH");
        assert_eq!(address.printed_line1(), "Rue du Lac 1268");
        assert_eq!(address.printed_line2(), "CH-2501 Biel");
    }
}
