//! The European Payments Council "BCD" line format for SEPA credit
//! transfers, and its payload model [`EuBill`].
//!
//! Like the native format this is positional and line oriented: a four-line
//! header (`BCD`, version, character set, `SCT`) followed by up to eight
//! data lines. Trailing empty lines may be omitted on the wire, so the
//! reader stops at the end of the unit instead of requiring all twelve.

use crate::bill::QrBill;
use crate::content::Content;
use crate::error::{Decoded, Error, Result, ValidationError, Warning};
use crate::validate::{check_mandatory_length, is_empty};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HEADER: &str = "BCD";
const CHARACTER_SET_UTF8: &str = "1";
const IDENTIFICATION: &str = "SCT";

/// Version of the EPC quick-response guideline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EuVersion {
    V001,
    #[default]
    V002,
}

impl EuVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            EuVersion::V001 => "V001",
            EuVersion::V002 => "V002",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "V001" | "001" => Some(EuVersion::V001),
            "V002" | "002" => Some(EuVersion::V002),
            _ => None,
        }
    }
}

/// Payload of a SEPA credit-transfer barcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EuBill {
    pub version: EuVersion,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bic: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iban: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub currency: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub purpose: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remittance_reference: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remittance_text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub information: String,
}

impl Default for EuBill {
    fn default() -> Self {
        EuBill {
            version: EuVersion::default(),
            bic: String::new(),
            name: String::new(),
            iban: String::new(),
            amount: None,
            currency: "EUR".to_string(),
            purpose: String::new(),
            remittance_reference: String::new(),
            remittance_text: String::new(),
            information: String::new(),
        }
    }
}

impl EuBill {
    pub fn new() -> Self {
        EuBill::default()
    }

    /// Derives a SEPA transfer from a native QR bill: amount, account and
    /// creditor name carry over, the debtor becomes the remittance text.
    pub fn from_qr_bill(bill: &QrBill) -> Self {
        let mut eu = EuBill::new();
        eu.amount = bill.payment_amount.amount;
        eu.currency = bill.payment_amount.currency.clone();
        eu.iban = bill.creditor_information.iban.clone();
        eu.name = bill
            .creditor_information
            .creditor_address
            .get_name()
            .to_string();
        eu.remittance_text = format!("Client:{}", bill.debitor.get_name());
        eu.remittance_reference = bill.payment_reference.unstructured_message.clone();
        eu
    }

    pub fn version(mut self, version: EuVersion) -> Self {
        self.version = version;
        self
    }

    pub fn bic(mut self, bic: &str) -> Self {
        self.bic = bic.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn iban(mut self, iban: &str) -> Self {
        self.iban = iban.to_string();
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = if is_empty(currency) {
            "EUR".to_string()
        } else {
            currency.to_string()
        };
        self
    }

    pub fn purpose(mut self, purpose: &str) -> Self {
        self.purpose = purpose.to_string();
        self
    }

    pub fn remittance_reference(mut self, reference: &str) -> Self {
        self.remittance_reference = reference.to_string();
        self
    }

    pub fn remittance_text(mut self, text: &str) -> Self {
        self.remittance_text = text.to_string();
        self
    }

    pub fn information(mut self, information: &str) -> Self {
        self.information = information.to_string();
        self
    }

    /// Currency and amount concatenated, e.g. `EUR12.5`; empty without an
    /// amount. Trailing zero fractions are dropped on this wire.
    pub fn amount_str(&self) -> String {
        match self.amount {
            Some(amount) => format!("{}{}", self.currency, amount.normalize()),
            None => String::new(),
        }
    }

    pub fn check(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let bic_mandatory = self.version == EuVersion::V001;
        check_mandatory_length("bic", bic_mandatory, 11, &self.bic, &mut errors);
        check_mandatory_length("name", true, 70, &self.name, &mut errors);
        check_mandatory_length("iban", true, 34, &self.iban, &mut errors);
        check_mandatory_length("amount", false, 12, &self.amount_str(), &mut errors);
        check_mandatory_length("purpose", false, 4, &self.purpose, &mut errors);
        check_mandatory_length(
            "remittanceReference",
            false,
            35,
            &self.remittance_reference,
            &mut errors,
        );
        check_mandatory_length("remittanceText", false, 140, &self.remittance_text, &mut errors);
        check_mandatory_length("information", false, 70, &self.information, &mut errors);
        errors
    }

    pub fn is_ok(&self) -> bool {
        self.check().is_empty()
    }

    /// Flat-map projection; amount and currency travel as separate entries.
    pub fn to_map(&self) -> crate::map_data::Map {
        let mut map = crate::map_data::Map::new();
        let mut put = |key: &str, value: &str| {
            if !is_empty(value) {
                map.insert(key.to_string(), value.to_string());
            }
        };
        put("bic", &self.bic);
        put("name", &self.name);
        put("iban", &self.iban);
        if let Some(amount) = self.amount {
            put("amount", &amount.normalize().to_string());
        }
        put("currency", &self.currency);
        put("purpose", &self.purpose);
        put("remittanceReference", &self.remittance_reference);
        put("remittanceText", &self.remittance_text);
        put("information", &self.information);
        map
    }

    pub fn from_map(map: &crate::map_data::Map) -> Result<EuBill> {
        let get = |key: &str| map.get(key).cloned().unwrap_or_default();
        let amount = match get("amount") {
            s if is_empty(&s) => None,
            s => Some(
                Decimal::from_str(s.trim()).map_err(|_| Error::InvalidAmount(s.to_string()))?,
            ),
        };
        let mut eu = EuBill::new()
            .bic(&get("bic"))
            .name(&get("name"))
            .iban(&get("iban"))
            .currency(&get("currency"))
            .purpose(&get("purpose"))
            .remittance_reference(&get("remittanceReference"))
            .remittance_text(&get("remittanceText"))
            .information(&get("information"));
        eu.amount = amount;
        Ok(eu)
    }

    /// The twelve wire lines of one unit.
    fn wire_lines(&self) -> Vec<String> {
        vec![
            HEADER.to_string(),
            self.version.as_str().to_string(),
            CHARACTER_SET_UTF8.to_string(),
            IDENTIFICATION.to_string(),
            self.bic.clone(),
            self.name.clone(),
            self.iban.clone(),
            self.amount_str(),
            self.purpose.clone(),
            self.remittance_reference.clone(),
            self.remittance_text.clone(),
            self.information.clone(),
        ]
    }
}

impl fmt::Display for EuBill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_lines().join("\r\n"))
    }
}

/// Serializes the EU payloads in `contents` into one BCD text, units joined
/// with CRLF. Non-EU records are skipped.
pub fn write(contents: &[Content]) -> String {
    contents
        .iter()
        .filter_map(|content| match content {
            Content::EuBill(eu) => Some(eu.to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Parses a BCD text that may contain several concatenated units; carriage
/// returns are stripped first, units are split on the `BCD` header line.
pub fn read(text: &str) -> Result<Decoded<Vec<Content>>> {
    let normalized: String = text.chars().filter(|c| *c != '\r').collect();
    let mut result = Vec::new();
    let mut warnings = Vec::new();
    for (index, unit) in normalized.split("BCD\n").enumerate() {
        if is_empty(unit) {
            continue;
        }
        match parse_unit(unit, &mut warnings) {
            Ok(eu) => result.push(Content::EuBill(eu)),
            Err(err) => {
                let warning = Warning::new(&format!("unit {}", index), err.to_string());
                log::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }
    if result.is_empty() && warnings.is_empty() {
        return Err(Error::Parse("no BCD payload found".to_string()));
    }
    Ok(Decoded::with_warnings(result, warnings))
}

fn parse_unit(unit: &str, warnings: &mut Vec<Warning>) -> Result<EuBill> {
    let lines: Vec<&str> = unit.split('\n').collect();
    let line = |i: usize| lines.get(i).copied().unwrap_or("");

    let mut eu = EuBill::new();
    eu.version = match EuVersion::parse(line(0)) {
        Some(version) => version,
        None => {
            let warning = Warning::new(
                "version",
                format!("unknown BCD version '{}', assuming V002", line(0)),
            );
            log::warn!("{}", warning);
            warnings.push(warning);
            EuVersion::V002
        }
    };
    // line 1 is the character set, line 2 the SCT identification; both fixed
    eu.bic = line(3).to_string();
    eu.name = line(4).to_string();
    eu.iban = line(5).to_string();
    let amount_line = line(6);
    if !is_empty(amount_line) {
        let digits: String = amount_line
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let currency: String = amount_line.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        if currency.chars().count() == 3 {
            eu.currency = currency.to_uppercase();
        }
        eu.amount = Some(
            Decimal::from_str(&digits).map_err(|_| Error::InvalidAmount(amount_line.to_string()))?,
        );
    }
    eu.purpose = line(7).to_string();
    eu.remittance_reference = line(8).to_string();
    eu.remittance_text = line(9).to_string();
    eu.information = line(10).to_string();
    Ok(eu)
}
