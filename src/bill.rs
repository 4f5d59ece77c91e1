//! The aggregate QR-bill payload.
//!
//! A [`QrBill`] combines the creditor information, the optional ultimate
//! creditor and debtor addresses, the amount and the payment reference, plus
//! up to two alternative-scheme slots. It is the in-memory form every codec
//! reads from and writes into.

use crate::address::Address;
use crate::error::ValidationError;
use crate::payment::{AlternativeSchema, CreditorInformation, PaymentAmount, PaymentReference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire-format version of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpcVersion {
    /// Legacy "0100": 6-line address blocks, carries a value date.
    #[serde(rename = "0100")]
    V1,
    /// Current "0200": 7-line address blocks with a type marker, EPD trailer.
    #[default]
    #[serde(rename = "0200")]
    V2,
}

impl SpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpcVersion::V1 => "0100",
            SpcVersion::V2 => "0200",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "0100" => Some(SpcVersion::V1),
            "0200" => Some(SpcVersion::V2),
            _ => None,
        }
    }
}

/// The complete payload of one Swiss QR bill.
///
/// # Examples
///
/// ```
/// use qrpay::{Address, CreditorInformation, PaymentAmount, QrBill};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let bill = QrBill::new()
///     .creditor_information(
///         CreditorInformation::new()
///             .iban("CH4431999123000889012")
///             .creditor_address(Address::structured(
///                 "Robert Schneider AG", "Rue du Lac", "1268", "2501", "Biel", "CH",
///             )),
///     )
///     .payment_amount(PaymentAmount::new().amount(Decimal::from_str("199.95").unwrap()));
/// assert!(bill.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrBill {
    pub version: SpcVersion,
    pub creditor_information: CreditorInformation,
    pub ultimate_creditor: Address,
    pub payment_amount: PaymentAmount,
    pub debitor: Address,
    pub payment_reference: PaymentReference,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternative_schemas: Vec<AlternativeSchema>,
    /// Marks test payloads; not part of any wire format.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub test: bool,
    /// Renderer hints (filename, pictureFormat, dimension, language,
    /// pageFormat, printLines). Carried for external consumers, never
    /// validated or serialized to the wire.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl QrBill {
    pub fn new() -> Self {
        QrBill::default()
    }

    pub fn version(mut self, version: SpcVersion) -> Self {
        self.version = version;
        self
    }

    pub fn creditor_information(mut self, creditor_information: CreditorInformation) -> Self {
        self.creditor_information = creditor_information;
        self
    }

    pub fn ultimate_creditor(mut self, ultimate_creditor: Address) -> Self {
        self.ultimate_creditor = ultimate_creditor;
        self
    }

    pub fn payment_amount(mut self, payment_amount: PaymentAmount) -> Self {
        self.payment_amount = payment_amount;
        self
    }

    pub fn debitor(mut self, debitor: Address) -> Self {
        self.debitor = debitor;
        self
    }

    pub fn payment_reference(mut self, payment_reference: PaymentReference) -> Self {
        self.payment_reference = payment_reference;
        self
    }

    /// Appends an alternative-scheme slot; the native format carries at most
    /// two of them.
    pub fn alternative_schema(mut self, title: &str, content: &str) -> Self {
        self.alternative_schemas.push(AlternativeSchema::new(title, content));
        self
    }

    pub fn test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Runs all sub-entity checks. The ultimate creditor and the debtor are
    /// optional parties and validated only once they carry a name.
    pub fn check(&self) -> Vec<ValidationError> {
        let mut errors = self.creditor_information.check();
        if self.ultimate_creditor.is_defined() {
            errors.extend(self.ultimate_creditor.check("UltimateCreditor"));
        }
        errors.extend(self.payment_amount.check());
        if self.debitor.is_defined() {
            errors.extend(self.debitor.check("Debitor"));
        }
        errors.extend(self.payment_reference.check());
        for schema in &self.alternative_schemas {
            errors.extend(schema.check());
        }
        errors
    }

    pub fn is_ok(&self) -> bool {
        self.check().is_empty()
    }
}
