//! JSON codec: an array of records, each tagged with its `contentType`.
//!
//! Serde does the dispatch through the tagged [`Content`] enum: unknown
//! properties are ignored on read, empty fields are omitted on write, and
//! an unknown or missing discriminator is a decode error.

use crate::content::Content;
use crate::error::Result;

pub fn write(contents: &[Content]) -> Result<String> {
    Ok(serde_json::to_string_pretty(contents)?)
}

pub fn read(text: &str) -> Result<Vec<Content>> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::bill::QrBill;
    use crate::content::{PhoneContent, SmsContent};
    use crate::payment::CreditorInformation;
    use pretty_assertions::assert_eq;

    fn sample_contents() -> Vec<Content> {
        vec![
            Content::QrBill(
                QrBill::new().creditor_information(
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
                ),
            ),
            Content::Phone(PhoneContent::new("+41791234567")),
            Content::Sms(SmsContent::new("+41791234567", "hello")),
        ]
    }

    #[test]
    fn test_round_trip() {
        let text = write(&sample_contents()).unwrap();
        let decoded = read(&text).unwrap();
        assert_eq!(decoded, sample_contents());
        assert_eq!(write(&decoded).unwrap(), text);
    }

    #[test]
    fn test_discriminator_is_written() {
        let text = write(&sample_contents()).unwrap();
        assert!(text.contains("\"contentType\": \"QrBill\""));
        assert!(text.contains("\"contentType\": \"Phone\""));
    }

    #[test]
    fn test_unknown_discriminator_is_an_error() {
        let result = read(r#"[{"contentType": "Barcode"}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_properties_are_ignored() {
        let decoded =
            read(r#"[{"contentType": "Phone", "telephoneNumber": "+41", "color": "red"}]"#)
                .unwrap();
        assert_eq!(decoded, vec![Content::Phone(PhoneContent::new("+41"))]);
    }
}
