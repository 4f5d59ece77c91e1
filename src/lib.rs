//! Swiss QR-Bill Payload Library
//!
//! A library for encoding, decoding and converting Swiss QR-bill payment
//! payloads (the "SPC" text carried inside the Swiss QR code) between their
//! serialized representations.
//!
//! # Supported Formats
//!
//! - **SPC**: the native positional line format (versions 0200 and 0100)
//! - **EPC/BCD**: the European Payments Council SEPA credit-transfer format
//! - **JSON**: array of records tagged with `contentType`
//! - **CSV**: one row per record over the flat key-value projection
//! - **Name-value**: `Key: value` lines, records split on a repeated key
//! - **XML**: `<root><content>` wrapper over the flat projection
//!
//! # Features
//!
//! - Build payloads through fluent setters and validate them field by field
//! - Reconstruct structured addresses from free-text address strings
//! - Auto-detect the format of an arbitrary input text
//! - Decode batches of concatenated payloads without aborting on a bad unit
//!
//! # Examples
//!
//! ## Building and encoding a bill
//!
//! ```
//! use qrpay::{Address, CreditorInformation, PaymentAmount, QrBill};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let bill = QrBill::new()
//!     .creditor_information(
//!         CreditorInformation::new()
//!             .iban("CH4431999123000889012")
//!             .creditor_address(Address::structured(
//!                 "Robert Schneider AG", "Rue du Lac", "1268", "2501", "Biel", "CH",
//!             )),
//!     )
//!     .payment_amount(PaymentAmount::new().amount(Decimal::from_str("199.95")?));
//! assert!(bill.is_ok());
//! let text = bill.to_string();
//! assert!(text.starts_with("SPC\r\n0200"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Decoding an arbitrary input
//!
//! ```
//! use qrpay::{any_format, Content};
//!
//! let text = "SPC\n0200\n1\nCH4431999123000889012\nS\nRobert Schneider AG\nRue du Lac\n\
//!             1268\n2501\nBiel\nCH\n\n\n\n\n\n\n\n\nCHF\n\n\n\n\n\n\n\nNON\n\n\nEPD";
//! let decoded = any_format::read(text)?;
//! match &decoded.value[0] {
//!     Content::QrBill(bill) => assert_eq!(bill.creditor_information.iban, "CH4431999123000889012"),
//!     _ => unreachable!(),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod address;
pub mod address_parser;
pub mod any_format;
pub mod bill;
pub mod content;
pub mod csv_format;
pub mod epc_format;
pub mod error;
pub mod json_format;
pub mod map_data;
pub mod name_value_format;
pub mod payment;
pub mod spc_format;
pub mod validate;
pub mod xml_format;

// Re-export commonly used types
pub use address::{Address, AddressType};
pub use address_parser::{AddressParser, HeuristicParser};
pub use any_format::Format;
pub use bill::{QrBill, SpcVersion};
pub use content::{Content, EmailContent, PhoneContent, SmsContent, TextContent};
pub use epc_format::{EuBill, EuVersion};
pub use error::{Decoded, Error, Result, ValidationError, Warning};
pub use payment::{
    AlternativeSchema, CreditorInformation, PaymentAmount, PaymentReference, ReferenceType,
};
