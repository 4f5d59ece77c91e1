//! Flat key-value projection of the payload.
//!
//! CSV, the name-value dump, XML and form-style ingestion all funnel through
//! this one projection: a sorted map of string keys (`IBAN`, `Amount`,
//! `CreditorName`, ...) to string values. Keys for the three address roles
//! are prefixed with `Creditor`, `UltimateCreditor` or `Debitor`.

use crate::address::{Address, AddressType};
use crate::bill::QrBill;
use crate::error::{Error, Result};
use crate::payment::{PaymentAmount, PaymentReference, ReferenceType};
use crate::validate::is_empty;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

/// The flat record form used by the CSV, name-value and XML codecs.
pub type Map = BTreeMap<String, String>;

/// Due dates travel as dd.MM.yyyy in the flat map and the legacy wire form.
pub(crate) const DUE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Property keys that are routed into the renderer-hint bag instead of the
/// payment fields.
const PROPERTY_KEYS: &[&str] = &[
    "filename",
    "pictureFormat",
    "dimension",
    "language",
    "pageFormat",
    "printLines",
];

impl QrBill {
    /// Projects the payload onto the flat map. Empty fields are omitted;
    /// `UnstructuredMessage` is written as an alias of `Message` for
    /// form-style consumers.
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        put_address(&mut map, "Creditor", &self.creditor_information.creditor_address);
        put_address(&mut map, "UltimateCreditor", &self.ultimate_creditor);
        put_address(&mut map, "Debitor", &self.debitor);
        put(&mut map, "IBAN", &self.creditor_information.iban);
        put(&mut map, "Amount", &self.payment_amount.amount_str());
        put(&mut map, "Currency", &self.payment_amount.currency);
        if let Some(due_date) = self.payment_amount.due_date {
            put(&mut map, "DueDate", &due_date.format(DUE_DATE_FORMAT).to_string());
        }
        put(&mut map, "Message", &self.payment_reference.unstructured_message);
        put(
            &mut map,
            "UnstructuredMessage",
            &self.payment_reference.unstructured_message,
        );
        put(&mut map, "Reference", &self.payment_reference.reference);
        map.insert(
            "ReferenceType".to_string(),
            self.payment_reference.reference_type.as_str().to_string(),
        );
        put(&mut map, "BillInformation", &self.payment_reference.bill_information);
        for (i, schema) in self.alternative_schemas.iter().enumerate() {
            let suffix = if i == 0 { String::new() } else { i.to_string() };
            put(&mut map, &format!("AlternativeSchema{}", suffix), &schema.title);
            put(
                &mut map,
                &format!("AlternativeSchemaParameters{}", suffix),
                &schema.content,
            );
        }
        for key in PROPERTY_KEYS {
            if let Some(value) = self.properties.get(*key) {
                map.insert(key.to_string(), value.clone());
            }
        }
        map
    }

    /// Rebuilds a payload from the flat map. A malformed `ReferenceType`
    /// falls back to no reference with a log entry; a malformed amount or
    /// due date is a hard error.
    pub fn from_map(map: &Map) -> Result<QrBill> {
        let mut bill = QrBill::new();

        bill.creditor_information.creditor_address = address_from_map(map, "Creditor");
        bill.ultimate_creditor = address_from_map(map, "UltimateCreditor");
        bill.debitor = address_from_map(map, "Debitor");
        bill.creditor_information.iban = get(map, "IBAN");

        let amount = parse_amount(&get(map, "Amount"))?;
        let due_date = parse_due_date(&get(map, "DueDate"))?;
        bill.payment_amount = PaymentAmount::new()
            .amount_opt(amount)
            .currency(&get(map, "Currency"))
            .due_date(due_date);

        let message = match map.get("Message") {
            Some(message) => message.clone(),
            None => get(map, "UnstructuredMessage"),
        };
        bill.payment_reference = PaymentReference::new()
            .reference_type(parse_reference_type(&get(map, "ReferenceType")))
            .reference(&get(map, "Reference"))
            .unstructured_message(&message)
            .bill_information(&get(map, "BillInformation"));

        for suffix in ["", "1"] {
            let title = get(map, &format!("AlternativeSchema{}", suffix));
            if !is_empty(&title) {
                let content = get(map, &format!("AlternativeSchemaParameters{}", suffix));
                bill = bill.alternative_schema(&title, &content);
            }
        }

        for key in PROPERTY_KEYS {
            if let Some(value) = map.get(*key) {
                bill.properties.insert(key.to_string(), value.clone());
            }
        }
        Ok(bill)
    }
}

fn put(map: &mut Map, key: &str, value: &str) {
    if !is_empty(value) {
        map.insert(key.to_string(), value.to_string());
    }
}

fn get(map: &Map, key: &str) -> String {
    map.get(key).cloned().unwrap_or_default()
}

fn put_address(map: &mut Map, role: &str, address: &Address) {
    if !address.is_defined() {
        return;
    }
    if let Some(address_type) = address.get_address_type() {
        map.insert(
            format!("{}AddressType", role),
            address_type.as_str().to_string(),
        );
    }
    put(map, &format!("{}Name", role), address.get_name());
    put(map, &format!("{}Country", role), address.get_country_iso());
    match address.get_address_type() {
        Some(AddressType::Structured) => {
            put(map, &format!("{}Street", role), address.get_street());
            put(map, &format!("{}HouseNumber", role), address.get_house_number());
            put(map, &format!("{}PostalCode", role), address.get_postal_code());
            put(map, &format!("{}City", role), address.get_city());
        }
        _ => {
            put(map, &format!("{}AddressLine1", role), address.get_street());
            put(map, &format!("{}AddressLine2", role), address.get_house_number());
        }
    }
}

fn address_from_map(map: &Map, role: &str) -> Address {
    // a free-text address under the bare role key wins over discrete fields
    let free_text = get(map, role);
    if !is_empty(&free_text) {
        return Address::from_text(&free_text);
    }

    let mut address = Address::new()
        .name(&get(map, &format!("{}Name", role)))
        .country(&get(map, &format!("{}Country", role)));
    match address_type_from_map(map, role) {
        Some(AddressType::Unstructured) => {
            address = address
                .address_line1(&get(map, &format!("{}AddressLine1", role)))
                .address_line2(&get(map, &format!("{}AddressLine2", role)))
                .address_type(AddressType::Unstructured);
        }
        Some(AddressType::Structured) => {
            address = address
                .street(&get(map, &format!("{}Street", role)))
                .house_number(&get(map, &format!("{}HouseNumber", role)))
                .postal_code(&get(map, &format!("{}PostalCode", role)))
                .city(&get(map, &format!("{}City", role)))
                .address_type(AddressType::Structured);
        }
        None => {}
    }
    address
}

/// The addressing mode stated in the map, or inferred from the populated
/// keys when absent: a city means structured, a name without city means the
/// free-text lines.
fn address_type_from_map(map: &Map, role: &str) -> Option<AddressType> {
    let stated = get(map, &format!("{}AddressType", role));
    if !is_empty(&stated) {
        return AddressType::parse(&stated);
    }
    if !is_empty(&get(map, &format!("{}City", role))) {
        Some(AddressType::Structured)
    } else if !is_empty(&get(map, &format!("{}Name", role))) {
        Some(AddressType::Unstructured)
    } else {
        None
    }
}

fn parse_amount(value: &str) -> Result<Option<Decimal>> {
    if is_empty(value) {
        return Ok(None);
    }
    Decimal::from_str(value.trim())
        .map(Some)
        .map_err(|_| Error::InvalidAmount(value.to_string()))
}

fn parse_due_date(value: &str) -> Result<Option<NaiveDate>> {
    if is_empty(value) {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value.trim(), DUE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| Error::InvalidDate(value.to_string()))
}

fn parse_reference_type(value: &str) -> ReferenceType {
    if is_empty(value) {
        return ReferenceType::NON;
    }
    match ReferenceType::from_str(value) {
        Ok(reference_type) => reference_type,
        Err(message) => {
            log::warn!("{}, using NON", message);
            ReferenceType::NON
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::CreditorInformation;
    use pretty_assertions::assert_eq;

    fn sample_bill() -> QrBill {
        QrBill::new()
            .creditor_information(
                CreditorInformation::new()
                    .iban("CH4431999123000889012")
                    .creditor_address(Address::structured(
                        "Robert Schneider AG",
                        "Rue du Lac",
                        "1268",
                        "2501",
                        "Biel",
                        "CH",
                    )),
            )
            .payment_amount(
                PaymentAmount::new()
                    .amount(Decimal::from_str("1949.75").unwrap())
                    .currency("CHF"),
            )
            .payment_reference(
                PaymentReference::new()
                    .reference_type(ReferenceType::QRR)
                    .reference("210000000003139471430009017")
                    .unstructured_message("Order of 15 June 2020"),
            )
    }

    #[test]
    fn test_to_map_keys() {
        let map = sample_bill().to_map();
        assert_eq!(map.get("IBAN").unwrap(), "CH4431999123000889012");
        assert_eq!(map.get("Amount").unwrap(), "1949.75");
        assert_eq!(map.get("CreditorName").unwrap(), "Robert Schneider AG");
        assert_eq!(map.get("CreditorAddressType").unwrap(), "S");
        assert_eq!(map.get("ReferenceType").unwrap(), "QRR");
        assert_eq!(map.get("Message"), map.get("UnstructuredMessage"));
        assert!(!map.contains_key("DebitorName"));
    }

    #[test]
    fn test_map_round_trip() {
        let bill = sample_bill();
        let rebuilt = QrBill::from_map(&bill.to_map()).unwrap();
        assert_eq!(rebuilt, bill);
    }

    #[test]
    fn test_from_map_free_text_address() {
        let mut map = Map::new();
        map.insert("IBAN".to_string(), "CH4431999123000889012".to_string());
        map.insert(
            "Creditor".to_string(),
            "Robert Schneider AG, Rue du Lac 1268, 2501 Biel".to_string(),
        );
        let bill = QrBill::from_map(&map).unwrap();
        let address = &bill.creditor_information.creditor_address;
        assert_eq!(address.get_name(), "Robert Schneider AG");
        assert_eq!(address.get_postal_code(), "2501");
        assert_eq!(address.get_country_iso(), "CH");
    }

    #[test]
    fn test_malformed_reference_type_defaults_to_non() {
        let mut map = sample_bill().to_map();
        map.insert("ReferenceType".to_string(), "BOGUS".to_string());
        let bill = QrBill::from_map(&map).unwrap();
        assert_eq!(bill.payment_reference.reference_type, ReferenceType::NON);
    }

    #[test]
    fn test_due_date_round_trip() {
        let bill = sample_bill().payment_amount(
            PaymentAmount::new()
                .amount(Decimal::from_str("10").unwrap())
                .due_date(NaiveDate::from_ymd_opt(2020, 6, 15)),
        );
        let map = bill.to_map();
        assert_eq!(map.get("DueDate").unwrap(), "15.06.2020");
        let rebuilt = QrBill::from_map(&map).unwrap();
        assert_eq!(rebuilt.payment_amount.due_date, bill.payment_amount.due_date);
    }

    #[test]
    fn test_malformed_amount_is_an_error() {
        let mut map = Map::new();
        map.insert("Amount".to_string(), "abc".to_string());
        assert!(QrBill::from_map(&map).is_err());
    }
}
