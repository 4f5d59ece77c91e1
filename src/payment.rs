//! Payment sections of the SPC payload: creditor information, amount,
//! reference and the alternative-scheme extension slots.

use crate::address::Address;
use crate::error::ValidationError;
use crate::validate::{check_allowed, check_mandatory_length, is_empty};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The trailer literal closing the payment data of a version "0200" payload.
pub const TRAILER: &str = "EPD";

/// Creditor account and address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreditorInformation {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iban: String,
    pub creditor_address: Address,
}

impl CreditorInformation {
    pub fn new() -> Self {
        CreditorInformation::default()
    }

    pub fn iban(mut self, iban: &str) -> Self {
        self.iban = iban.to_string();
        self
    }

    pub fn creditor_address(mut self, address: Address) -> Self {
        self.creditor_address = address;
        self
    }

    /// The IBAN is mandatory and must belong to the native scheme (CH/LI).
    pub fn check(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_mandatory_length("iban", true, 21, &self.iban, &mut errors);
        if let Some(prefix) = self.iban.get(0..2) {
            check_allowed("iban", false, &["CH", "LI"], prefix, &mut errors);
        }
        errors.extend(self.creditor_address.check("Creditor"));
        errors
    }
}

/// Amount section: optional amount, ISO currency and an optional due date.
///
/// The due date is no longer carried by the version "0200" wire format but
/// remains part of the model, the flat map and the legacy "0100" layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentAmount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Default for PaymentAmount {
    fn default() -> Self {
        PaymentAmount {
            amount: None,
            currency: "CHF".to_string(),
            due_date: None,
        }
    }
}

impl PaymentAmount {
    pub fn new() -> Self {
        PaymentAmount::default()
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn amount_opt(mut self, amount: Option<Decimal>) -> Self {
        self.amount = amount;
        self
    }

    /// Defines the currency; an empty value falls back to "CHF".
    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = if is_empty(currency) {
            "CHF".to_string()
        } else {
            currency.to_string()
        };
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Wire form of the amount: two fraction digits, '.' separator, no
    /// grouping. Empty when no amount is set.
    pub fn amount_str(&self) -> String {
        match self.amount {
            Some(amount) => format_amount(amount),
            None => String::new(),
        }
    }

    /// Print form of the amount: like the wire form but with thousands
    /// groups separated by spaces.
    pub fn amount_printed(&self) -> String {
        let wire = self.amount_str();
        if wire.is_empty() {
            return wire;
        }
        let (integer, fraction) = wire.split_once('.').unwrap_or((wire.as_str(), ""));
        let (sign, digits) = match integer.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", integer),
        };
        let mut grouped = String::new();
        let len = digits.len();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(c);
        }
        format!("{}{}.{}", sign, grouped, fraction)
    }

    /// The due date in ISO form, empty when unset.
    pub fn due_date_str(&self) -> String {
        self.due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    pub fn check(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_mandatory_length("amount", false, 12, &self.amount_str(), &mut errors);
        check_mandatory_length("currency", false, 3, &self.currency, &mut errors);
        check_allowed("currency", true, &["CHF", "EUR"], &self.currency, &mut errors);
        check_mandatory_length("dueDate", false, 10, &self.due_date_str(), &mut errors);
        errors
    }
}

/// Formats a decimal with exactly two fraction digits and no grouping.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let mut s = rounded.to_string();
    match s.find('.') {
        None => s.push_str(".00"),
        Some(pos) => {
            for _ in s.len() - pos - 1..2 {
                s.push('0');
            }
        }
    }
    s
}

/// Which reference scheme (and therefore which display grouping) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferenceType {
    /// QR reference (27 digits, grouped in fives from the right).
    QRR,
    /// Creditor reference ISO 11649 (grouped in fours from the left).
    SCOR,
    /// No reference.
    #[default]
    NON,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::QRR => "QRR",
            ReferenceType::SCOR => "SCOR",
            ReferenceType::NON => "NON",
        }
    }

    /// Display grouping block size; zero means no grouping.
    fn grouping_length(&self) -> usize {
        match self {
            ReferenceType::QRR => 5,
            ReferenceType::SCOR => 4,
            ReferenceType::NON => 0,
        }
    }

    /// Whether grouping runs from the left (remainder on the right).
    fn grouping_left(&self) -> bool {
        !matches!(self, ReferenceType::QRR)
    }
}

impl FromStr for ReferenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "QRR" => Ok(ReferenceType::QRR),
            "SCOR" => Ok(ReferenceType::SCOR),
            "NON" => Ok(ReferenceType::NON),
            other => Err(format!("invalid reference type: {}", other)),
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment reference section: reference number, free-text message and the
/// optional bill information.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentReference {
    pub reference_type: ReferenceType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reference: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unstructured_message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bill_information: String,
}

impl PaymentReference {
    pub fn new() -> Self {
        PaymentReference::default()
    }

    /// Convenience constructor for a message-only reference.
    pub fn with_message(message: &str) -> Self {
        PaymentReference::new().unstructured_message(message)
    }

    pub fn reference_type(mut self, reference_type: ReferenceType) -> Self {
        self.reference_type = reference_type;
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = reference.to_string();
        self
    }

    pub fn unstructured_message(mut self, message: &str) -> Self {
        self.unstructured_message = message.to_string();
        self
    }

    pub fn bill_information(mut self, bill_information: &str) -> Self {
        self.bill_information = bill_information.to_string();
        self
    }

    pub fn has_bill_information(&self) -> bool {
        !is_empty(&self.bill_information)
    }

    pub fn check(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_allowed(
            "referenceType",
            true,
            &["QRR", "SCOR", "NON"],
            self.reference_type.as_str(),
            &mut errors,
        );
        check_mandatory_length(
            "unstructuredMessage",
            false,
            140,
            &self.unstructured_message,
            &mut errors,
        );
        let reference_mandatory = self.reference_type != ReferenceType::NON;
        check_mandatory_length("reference", reference_mandatory, 27, &self.reference, &mut errors);
        errors
    }

    /// The reference number grouped for printing: QRR in blocks of five with
    /// the remainder on the left, SCOR in blocks of four with the remainder
    /// on the right, NON ungrouped (empty).
    pub fn reference_formatted(&self) -> String {
        if self.reference_type == ReferenceType::NON {
            return String::new();
        }
        let bare: String = self.reference.chars().filter(|c| *c != ' ').collect();
        let block = self.reference_type.grouping_length();
        if self.reference_type.grouping_left() {
            group_left(&bare, block)
        } else {
            group_right(&bare, block)
        }
    }
}

fn group_left(s: &str, block: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(block)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

fn group_right(s: &str, block: usize) -> String {
    let reversed: String = s.chars().rev().collect();
    group_left(&reversed, block).chars().rev().collect()
}

/// Optional vendor-defined extension slot; the native format carries at most
/// two of them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlternativeSchema {
    pub title: String,
    pub content: String,
}

impl AlternativeSchema {
    pub fn new(title: &str, content: &str) -> Self {
        AlternativeSchema {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    /// Splits a combined wire line into title (the leading alphanumeric run)
    /// and content (everything from the first other character on).
    pub fn from_line(line: &str) -> Self {
        let pos = line
            .char_indices()
            .find(|(_, c)| !c.is_alphanumeric())
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        AlternativeSchema {
            title: line[..pos].to_string(),
            content: line[pos..].to_string(),
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.content.is_empty()
    }

    /// The combined wire line.
    pub fn as_line(&self) -> String {
        format!("{}{}", self.title, self.content)
    }

    pub fn check(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_mandatory_length("alternativeSchema", false, 100, &self.content, &mut errors);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr as _;

    #[test]
    fn test_qrr_reference_grouping() {
        let reference = PaymentReference::new()
            .reference_type(ReferenceType::QRR)
            .reference("210000000003139471430009017");
        assert_eq!(reference.reference_formatted(), "21 00000 00003 13947 14300 09017");
    }

    #[test]
    fn test_scor_reference_grouping() {
        let reference = PaymentReference::new()
            .reference_type(ReferenceType::SCOR)
            .reference("RF18539007547034 12");
        assert_eq!(reference.reference_formatted(), "RF18 5390 0754 7034 12");
    }

    #[test]
    fn test_non_reference_not_grouped() {
        let reference = PaymentReference::new().reference("ABC");
        assert_eq!(reference.reference_formatted(), "");
    }

    #[test]
    fn test_reference_mandatory_unless_non() {
        let reference = PaymentReference::new().reference_type(ReferenceType::QRR);
        let errors = reference.check();
        assert!(errors.iter().any(|e| e.field_name == "reference"));

        let none = PaymentReference::new();
        assert!(none.check().is_empty());
    }

    #[test]
    fn test_amount_wire_format() {
        let amount = PaymentAmount::new().amount(Decimal::from_str("1234.5").unwrap());
        assert_eq!(amount.amount_str(), "1234.50");
        assert_eq!(amount.amount_printed(), "1 234.50");

        let whole = PaymentAmount::new().amount(Decimal::from_str("1000000").unwrap());
        assert_eq!(whole.amount_str(), "1000000.00");
        assert_eq!(whole.amount_printed(), "1 000 000.00");

        assert_eq!(PaymentAmount::new().amount_str(), "");
    }

    #[test]
    fn test_currency_falls_back_to_chf() {
        assert_eq!(PaymentAmount::new().currency("").currency, "CHF");
        assert_eq!(PaymentAmount::new().currency("EUR").currency, "EUR");
    }

    #[test]
    fn test_currency_check() {
        let usd = PaymentAmount::new().currency("USD");
        assert!(usd.check().iter().any(|e| e.field_name == "currency"));
        assert!(PaymentAmount::new().check().is_empty());
    }

    #[test]
    fn test_iban_check() {
        let creditor = CreditorInformation::new()
            .iban("CH4431999123000889012")
            .creditor_address(
                crate::address::Address::structured("Robert Schneider AG", "Rue du Lac", "1268", "2501", "Biel", "CH"),
            );
        assert!(creditor.check().is_empty());

        let missing = CreditorInformation::new();
        assert!(missing.check().iter().any(|e| e.field_name == "iban"));

        let foreign = creditor.iban("DE4431999123000889012");
        assert!(foreign.check().iter().any(|e| e.field_name == "iban"));
    }

    #[test]
    fn test_alternative_schema_from_line() {
        let schema = AlternativeSchema::from_line("eBill/UV;UltraPay005;12345");
        assert_eq!(schema.title, "eBill");
        assert_eq!(schema.content, "/UV;UltraPay005;12345");
        assert_eq!(schema.as_line(), "eBill/UV;UltraPay005;12345");
    }
}
