//! The closed set of payload kinds a serialized record can decode into.
//!
//! Every record carries a `contentType` discriminator. JSON dispatches on it
//! through serde's tagged-enum support; the flat-map codecs (CSV, name-value,
//! XML) dispatch through [`Content::from_map`]. A record without a
//! discriminator is treated as a QR bill, the dominant kind.

use crate::bill::QrBill;
use crate::epc_format::EuBill;
use crate::error::{Error, Result, ValidationError};
use crate::map_data::Map;
use serde::{Deserialize, Serialize};

/// One decoded payload of any supported kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentType")]
pub enum Content {
    QrBill(QrBill),
    EuBill(EuBill),
    Text(TextContent),
    Phone(PhoneContent),
    Sms(SmsContent),
    Email(EmailContent),
}

impl Content {
    /// The discriminator string of this variant.
    pub fn content_type(&self) -> &'static str {
        match self {
            Content::QrBill(_) => "QrBill",
            Content::EuBill(_) => "EuBill",
            Content::Text(_) => "Text",
            Content::Phone(_) => "Phone",
            Content::Sms(_) => "Sms",
            Content::Email(_) => "Email",
        }
    }

    /// The canonical string form: the native wire format for the bill
    /// variants, the URI form for the lightweight ones.
    pub fn canonical(&self) -> String {
        match self {
            Content::QrBill(bill) => bill.to_string(),
            Content::EuBill(bill) => bill.to_string(),
            Content::Text(text) => text.text.clone(),
            Content::Phone(phone) => phone.canonical(),
            Content::Sms(sms) => sms.canonical(),
            Content::Email(email) => email.canonical(),
        }
    }

    /// Field validation; the lightweight variants have nothing to check.
    pub fn check(&self) -> Vec<ValidationError> {
        match self {
            Content::QrBill(bill) => bill.check(),
            Content::EuBill(bill) => bill.check(),
            _ => Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.check().is_empty()
    }

    /// Flat-map projection including the `contentType` discriminator.
    pub fn to_map(&self) -> Map {
        let mut map = match self {
            Content::QrBill(bill) => bill.to_map(),
            Content::EuBill(bill) => bill.to_map(),
            Content::Text(text) => {
                let mut map = Map::new();
                map.insert("contentValue".to_string(), text.text.clone());
                map
            }
            Content::Phone(phone) => {
                let mut map = Map::new();
                map.insert("telephoneNumber".to_string(), phone.telephone_number.clone());
                map
            }
            Content::Sms(sms) => {
                let mut map = Map::new();
                map.insert("telephoneNumber".to_string(), sms.telephone_number.clone());
                map.insert("message".to_string(), sms.message.clone());
                map
            }
            Content::Email(email) => {
                let mut map = Map::new();
                map.insert("mailAddress".to_string(), email.mail_address.clone());
                map.insert("subject".to_string(), email.subject.clone());
                map.insert("message".to_string(), email.message.clone());
                map
            }
        };
        map.insert("contentType".to_string(), self.content_type().to_string());
        map
    }

    /// Rebuilds a record from its flat map, dispatching on the `contentType`
    /// entry. A missing discriminator means a QR bill; an unknown one is a
    /// decode error.
    pub fn from_map(map: &Map) -> Result<Content> {
        let content_type = map
            .get("contentType")
            .map(String::as_str)
            .unwrap_or("QrBill");
        match content_type {
            "QrBill" => Ok(Content::QrBill(QrBill::from_map(map)?)),
            "EuBill" => Ok(Content::EuBill(EuBill::from_map(map)?)),
            "Text" => Ok(Content::Text(TextContent::new(
                map.get("contentValue").map(String::as_str).unwrap_or(""),
            ))),
            "Phone" => Ok(Content::Phone(PhoneContent::new(
                map.get("telephoneNumber").map(String::as_str).unwrap_or(""),
            ))),
            "Sms" => Ok(Content::Sms(SmsContent::new(
                map.get("telephoneNumber").map(String::as_str).unwrap_or(""),
                map.get("message").map(String::as_str).unwrap_or(""),
            ))),
            "Email" => Ok(Content::Email(EmailContent::new(
                map.get("mailAddress").map(String::as_str).unwrap_or(""),
                map.get("subject").map(String::as_str).unwrap_or(""),
                map.get("message").map(String::as_str).unwrap_or(""),
            ))),
            other => Err(Error::UnknownContentType(other.to_string())),
        }
    }
}

impl From<QrBill> for Content {
    fn from(bill: QrBill) -> Self {
        Content::QrBill(bill)
    }
}

impl From<EuBill> for Content {
    fn from(bill: EuBill) -> Self {
        Content::EuBill(bill)
    }
}

/// An arbitrary text payload, carried as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextContent {
    pub text: String,
}

impl TextContent {
    pub fn new(text: &str) -> Self {
        TextContent {
            text: text.to_string(),
        }
    }
}

/// A `tel:` payload dialling a phone number.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhoneContent {
    pub telephone_number: String,
}

impl PhoneContent {
    pub fn new(telephone_number: &str) -> Self {
        PhoneContent {
            telephone_number: telephone_number.to_string(),
        }
    }

    pub fn canonical(&self) -> String {
        format!("tel:{}", self.telephone_number)
    }

    pub fn parse(text: &str) -> Self {
        PhoneContent::new(text.trim().trim_start_matches("tel:"))
    }
}

/// An `SMSTO:` payload carrying a phone number and a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SmsContent {
    pub telephone_number: String,
    pub message: String,
}

impl SmsContent {
    pub fn new(telephone_number: &str, message: &str) -> Self {
        SmsContent {
            telephone_number: telephone_number.to_string(),
            message: message.to_string(),
        }
    }

    pub fn canonical(&self) -> String {
        format!("SMSTO:{}:{}", self.telephone_number, self.message)
    }

    /// Parses `SMSTO:<number>:<message>`; colons inside the message are kept.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.trim().splitn(3, ':');
        parts.next();
        let number = parts.next().unwrap_or("");
        let message = parts.next().unwrap_or("");
        SmsContent::new(number, message)
    }
}

/// A `mailto:` payload with URL-encoded subject and body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailContent {
    pub mail_address: String,
    pub subject: String,
    pub message: String,
}

impl EmailContent {
    pub fn new(mail_address: &str, subject: &str, message: &str) -> Self {
        EmailContent {
            mail_address: mail_address.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        }
    }

    pub fn canonical(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            urlencoding::encode(&self.mail_address),
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.message)
        )
    }

    pub fn parse(text: &str) -> Self {
        let decoded = urlencoding::decode(text.trim())
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| text.trim().to_string());
        let decoded = decoded.trim_start_matches("mailto:");
        match decoded.split_once("?subject=") {
            Some((address, rest)) => match rest.split_once("&body=") {
                Some((subject, body)) => EmailContent::new(address, subject, body),
                None => EmailContent::new(address, rest, ""),
            },
            None => EmailContent::new(decoded, "", ""),
        }
    }
}
