//! The native SPC line format: a positional, versioned, line-delimited text
//! encoding of the QR-bill payload.
//!
//! Windows delimits lines with CRLF, Linux and macOS with LF alone; all
//! carriage returns are stripped on read so the same positional logic works
//! everywhere. The writer always emits CRLF and no trailing separator.
//!
//! Several payloads may be concatenated in one text; the reader splits on
//! the `SPC` header line and decodes each unit independently. A unit that
//! cannot be decoded is reported as a warning, it never aborts the batch.

use crate::address::{Address, AddressType};
use crate::bill::{QrBill, SpcVersion};
use crate::content::Content;
use crate::error::{Decoded, Error, Result, Warning};
use crate::map_data::DUE_DATE_FORMAT;
use crate::payment::{
    AlternativeSchema, CreditorInformation, PaymentAmount, PaymentReference, ReferenceType, TRAILER,
};
use crate::validate::is_empty;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

const HEADER: &str = "SPC";
const CODING_LATIN1: &str = "1";

/// Serializes the QR-bill payloads in `contents` into one SPC text, units
/// joined with CRLF. Non-bill records are skipped.
pub fn write(contents: &[Content]) -> String {
    contents
        .iter()
        .filter_map(|content| match content {
            Content::QrBill(bill) => Some(bill.to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Parses an SPC text that may contain several concatenated payloads.
///
/// Structural failures of a single unit (too few lines, missing trailer,
/// malformed amount) are collected as warnings; the remaining units are
/// still decoded. A malformed reference type inside a unit is recovered
/// with [`ReferenceType::NON`] and a warning.
pub fn read(text: &str) -> Result<Decoded<Vec<Content>>> {
    let normalized: String = text.chars().filter(|c| *c != '\r').collect();
    let mut result = Vec::new();
    let mut warnings = Vec::new();
    for (index, unit) in normalized.split("SPC\n").enumerate() {
        if is_empty(unit) {
            continue;
        }
        match parse_unit(unit, &mut warnings) {
            Ok(bill) => result.push(Content::QrBill(bill)),
            Err(err) => {
                let warning = Warning::new(&format!("unit {}", index), err.to_string());
                log::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }
    if result.is_empty() && warnings.is_empty() {
        return Err(Error::NotSwissQr("no SPC payload found".to_string()));
    }
    Ok(Decoded::with_warnings(result, warnings))
}

/// Decodes one unit. The slice starts after the consumed `SPC` header, so
/// the header is put back to keep the positions of the written layout.
fn parse_unit(unit: &str, warnings: &mut Vec<Warning>) -> Result<QrBill> {
    let mut lines: Vec<&str> = vec![HEADER];
    lines.extend(unit.split('\n'));
    if lines.len() < 10 {
        return Err(Error::NotSwissQr(format!(
            "expected at least 10 lines, got {}",
            lines.len()
        )));
    }
    let line = |i: usize| lines.get(i).copied().unwrap_or("");

    let version = if line(1).trim() == SpcVersion::V1.as_str() {
        SpcVersion::V1
    } else {
        SpcVersion::V2
    };
    // line 2 is the coding type, fixed to "1"
    let iban = line(3).to_string();

    let mut pos = 4;
    let creditor_address = read_address(&line, &mut pos, version)?;
    let ultimate_creditor = read_address(&line, &mut pos, version)?;

    let amount_line = line(pos).replace(' ', "");
    pos += 1;
    let amount = if amount_line.is_empty() {
        None
    } else {
        Some(Decimal::from_str(&amount_line).map_err(|_| Error::InvalidAmount(amount_line.clone()))?)
    };
    let currency = line(pos).to_string();
    pos += 1;

    let due_date = if version == SpcVersion::V1 {
        let date_line = line(pos).trim().to_string();
        pos += 1;
        if date_line.is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(&date_line, DUE_DATE_FORMAT)
                    .map_err(|_| Error::InvalidDate(date_line))?,
            )
        }
    } else {
        None
    };

    let debitor = read_address(&line, &mut pos, version)?;

    let reference_type_line = line(pos).trim();
    pos += 1;
    let reference_type = if reference_type_line.is_empty() {
        ReferenceType::NON
    } else {
        match ReferenceType::from_str(reference_type_line) {
            Ok(reference_type) => reference_type,
            Err(message) => {
                let warning = Warning::new("referenceType", format!("{}, using NON", message));
                log::warn!("{}", warning);
                warnings.push(warning);
                ReferenceType::NON
            }
        }
    };
    let reference = line(pos).to_string();
    pos += 1;
    let message = line(pos).to_string();
    pos += 1;

    let mut bill_information = String::new();
    if version != SpcVersion::V1 {
        let trailer = line(pos).trim();
        pos += 1;
        if !trailer.eq_ignore_ascii_case(TRAILER) {
            return Err(Error::MissingTrailer);
        }
        bill_information = line(pos).to_string();
        pos += 1;
    }
    let schema_line1 = line(pos).to_string();
    pos += 1;
    let schema_line2 = line(pos).to_string();

    let mut bill = QrBill::new()
        .version(version)
        .creditor_information(
            CreditorInformation::new()
                .iban(&iban)
                .creditor_address(creditor_address),
        )
        .ultimate_creditor(ultimate_creditor)
        .payment_amount(
            PaymentAmount::new()
                .amount_opt(amount)
                .currency(&currency)
                .due_date(due_date),
        )
        .debitor(debitor)
        .payment_reference(
            PaymentReference::new()
                .reference_type(reference_type)
                .reference(&reference)
                .unstructured_message(&message)
                .bill_information(&bill_information),
        );
    for schema_line in [schema_line1, schema_line2] {
        if !is_empty(&schema_line) {
            bill.alternative_schemas
                .push(AlternativeSchema::from_line(&schema_line));
        }
    }
    Ok(bill)
}

/// Reads one address block at `*pos` and advances past it: 7 lines for
/// version "0200" (type marker first), 6 for the legacy layout. An empty
/// type marker means an empty block; the cursor still advances the full
/// block width.
fn read_address<'a>(
    line: &impl Fn(usize) -> &'a str,
    pos: &mut usize,
    version: SpcVersion,
) -> Result<Address> {
    if version == SpcVersion::V1 {
        let base = *pos;
        *pos += 6;
        return Ok(Address::new()
            .name(line(base))
            .street(line(base + 1))
            .house_number(line(base + 2))
            .postal_code(line(base + 3))
            .city(line(base + 4))
            .country(line(base + 5)));
    }

    let base = *pos;
    *pos += 7;
    let marker = line(base).trim();
    if marker.is_empty() {
        return Ok(Address::new());
    }
    let address_type = AddressType::parse(marker)
        .ok_or_else(|| Error::Parse(format!("invalid address type marker '{}'", marker)))?;
    let address = Address::new().name(line(base + 1));
    let address = match address_type {
        AddressType::Structured => address
            .street(line(base + 2))
            .house_number(line(base + 3))
            .postal_code(line(base + 4))
            .city(line(base + 5)),
        AddressType::Unstructured => address
            .address_line1(line(base + 2))
            .address_line2(line(base + 3)),
    };
    Ok(address.country(line(base + 6)).address_type(address_type))
}

/// The full line sequence of one payload in its version's layout.
fn wire_lines(bill: &QrBill) -> Vec<String> {
    let v1 = bill.version == SpcVersion::V1;
    let address_lines = |address: &Address| {
        if v1 {
            address.wire_lines_v1()
        } else {
            address.wire_lines()
        }
    };

    let mut lines = vec![
        HEADER.to_string(),
        bill.version.as_str().to_string(),
        CODING_LATIN1.to_string(),
        bill.creditor_information.iban.clone(),
    ];
    lines.extend(address_lines(&bill.creditor_information.creditor_address));
    lines.extend(address_lines(&bill.ultimate_creditor));
    lines.push(bill.payment_amount.amount_str());
    lines.push(bill.payment_amount.currency.clone());
    if v1 {
        lines.push(
            bill.payment_amount
                .due_date
                .map(|d| d.format(DUE_DATE_FORMAT).to_string())
                .unwrap_or_default(),
        );
    }
    lines.extend(address_lines(&bill.debitor));
    lines.push(bill.payment_reference.reference_type.as_str().to_string());
    lines.push(bill.payment_reference.reference.clone());
    lines.push(bill.payment_reference.unstructured_message.clone());
    if !v1 {
        lines.push(TRAILER.to_string());
        if bill.payment_reference.has_bill_information() {
            lines.push(bill.payment_reference.bill_information.clone());
        } else if !bill.alternative_schemas.is_empty() {
            // keep the schema slots at their fixed positions
            lines.push(String::new());
        }
    }
    for schema in bill.alternative_schemas.iter().take(2) {
        lines.push(schema.as_line());
    }
    lines
}

impl fmt::Display for QrBill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&wire_lines(self).join("\r\n"))
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
            .debitor(Address::structured(
                "Pia-Maria Rutschmann-Schnyder",
                "Grosse Marktgasse",
                "28",
                "9400",
                "Rorschach",
                "CH",
            ))
            .payment_reference(
                PaymentReference::new()
                    .reference_type(ReferenceType::QRR)
                    .reference("210000000003139471430009017")
                    .unstructured_message("Order of 15 June 2020"),
            )
    }

    #[test]
    fn test_wire_positions() {
        let lines = wire_lines(&sample_bill());
        assert_eq!(lines[0], "SPC");
        assert_eq!(lines[1], "0200");
        assert_eq!(lines[2], "1");
        assert_eq!(lines[3], "CH4431999123000889012");
        assert_eq!(lines[4], "S");
        assert_eq!(lines[5], "Robert Schneider AG");
        // the undefined ultimate creditor still occupies its 7 lines
        assert_eq!(&lines[11..18], &vec![String::new(); 7][..]);
        assert_eq!(lines[18], "1949.75");
        assert_eq!(lines[19], "CHF");
        assert_eq!(lines[20], "S");
        assert_eq!(lines[27], "QRR");
        assert_eq!(lines[28], "210000000003139471430009017");
        assert_eq!(lines[30], "EPD");
        assert_eq!(lines.len(), 31);
    }

    #[test]
    fn test_round_trip_is_byte_exact() {
        let text = write(&[Content::QrBill(sample_bill())]);
        let decoded = read(&text).unwrap();
        assert!(decoded.warnings.is_empty());
        assert_eq!(write(&decoded.value), text);
    }

    #[test]
    fn test_decode_rebuilds_the_model() {
        let text = sample_bill().to_string();
        let decoded = read(&text).unwrap();
        match &decoded.value[0] {
            Content::QrBill(bill) => {
                assert_eq!(bill.creditor_information.iban, "CH4431999123000889012");
                assert_eq!(bill.payment_amount.amount_str(), "1949.75");
                assert_eq!(bill.debitor.get_city(), "Rorschach");
                assert_eq!(bill.payment_reference.reference_type, ReferenceType::QRR);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_lf_only_input_is_accepted() {
        let crlf = sample_bill().to_string();
        let lf = crlf.replace("\r\n", "\n");
        assert_eq!(read(&lf).unwrap().value, read(&crlf).unwrap().value);
    }

    #[test]
    fn test_batch_decoding() {
        let text = write(&[
            Content::QrBill(sample_bill()),
            Content::QrBill(sample_bill()),
        ]);
        let decoded = read(&text).unwrap();
        assert_eq!(decoded.value.len(), 2);
    }

    #[test]
    fn test_bad_unit_does_not_abort_the_batch() {
        let text = format!("SPC\ntoo\nshort\n{}", sample_bill().to_string());
        let decoded = read(&text).unwrap();
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.warnings.len(), 1);
        assert!(decoded.warnings[0].context.contains("unit"));
    }

    #[test]
    fn test_too_few_lines() {
        let result = read("SPC\n0200\n1\nCH44");
        let decoded = result.unwrap();
        assert!(decoded.value.is_empty());
        assert_eq!(decoded.warnings.len(), 1);
    }

    #[test]
    fn test_missing_trailer() {
        let mut lines = wire_lines(&sample_bill());
        lines[30] = "XXX".to_string();
        let decoded = read(&lines.join("\r\n")).unwrap();
        assert!(decoded.value.is_empty());
        assert!(decoded.warnings[0].message.contains("EPD"));
    }

    #[test]
    fn test_malformed_reference_type_recovers() {
        let mut lines = wire_lines(&sample_bill());
        lines[27] = "QRX".to_string();
        let decoded = read(&lines.join("\r\n")).unwrap();
        match &decoded.value[0] {
            Content::QrBill(bill) => {
                assert_eq!(bill.payment_reference.reference_type, ReferenceType::NON)
            }
            other => panic!("unexpected content: {:?}", other),
        }
        assert_eq!(decoded.warnings.len(), 1);
    }

    #[test]
    fn test_unstructured_address_block() {
        let bill = sample_bill().debitor(Address::unstructured(
            "Pia Rutschmann",
            "Marktgasse 28",
            "9400 Rorschach",
            "CH",
        ));
        let lines = wire_lines(&bill);
        assert_eq!(lines[20], "U");
        assert_eq!(lines[22], "Marktgasse 28");
        assert_eq!(lines[23], "9400 Rorschach");
        assert_eq!(lines[24], "");
        assert_eq!(lines[26], "CH");

        let decoded = read(&lines.join("\r\n")).unwrap();
        match &decoded.value[0] {
            Content::QrBill(decoded_bill) => assert_eq!(decoded_bill.debitor, bill.debitor),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_v1_layout() {
        let bill = sample_bill()
            .version(SpcVersion::V1)
            .payment_amount(
                PaymentAmount::new()
                    .amount(Decimal::from_str("100").unwrap())
                    .due_date(NaiveDate::from_ymd_opt(2020, 6, 15)),
            );
        let lines = wire_lines(&bill);
        assert_eq!(lines[1], "0100");
        // 6-line blocks without a type marker
        assert_eq!(lines[4], "Robert Schneider AG");
        assert_eq!(lines[16], "100.00");
        assert_eq!(lines[18], "15.06.2020");

        let decoded = read(&lines.join("\r\n")).unwrap();
        match &decoded.value[0] {
            Content::QrBill(decoded_bill) => {
                assert_eq!(decoded_bill.version, SpcVersion::V1);
                assert_eq!(
                    decoded_bill.payment_amount.due_date,
                    NaiveDate::from_ymd_opt(2020, 6, 15)
                );
                assert_eq!(decoded_bill.debitor.get_city(), "Rorschach");
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_alternative_schemes_with_empty_bill_information() {
        let bill = sample_bill().alternative_schema("eBill", "/UV;UltraPay005;12345");
        let lines = wire_lines(&bill);
        assert_eq!(lines[30], "EPD");
        assert_eq!(lines[31], "");
        assert_eq!(lines[32], "eBill/UV;UltraPay005;12345");

        let decoded = read(&lines.join("\r\n")).unwrap();
        match &decoded.value[0] {
            Content::QrBill(decoded_bill) => {
                assert_eq!(decoded_bill.alternative_schemas.len(), 1);
                assert_eq!(decoded_bill.alternative_schemas[0].title, "eBill");
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }
}
