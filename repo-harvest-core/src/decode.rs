use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use thiserror::Error;

/// Text recovered from a raw byte buffer, with the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: &'static str,
}

/// Why a buffer was rejected. Rejection is an expected outcome, not a fault.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no usable encoding could be inferred")]
    NoEncoding,
    #[error("invalid byte sequence for {encoding}")]
    Malformed { encoding: &'static str },
}

/// Infer an encoding for `bytes` and decode strictly: BOM -> binary probe -> chardetng guess.
///
/// There is no fallback encoding and no lossy replacement; a buffer that does not
/// decode cleanly under the inferred encoding is rejected.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedText, DecodeError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(&bytes[bom_len..], encoding);
    }

    // NUL never appears in text under any ASCII-compatible encoding.
    if bytes.contains(&0) {
        return Err(DecodeError::NoEncoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    decode_with(bytes, encoding)
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedText, DecodeError> {
    match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => Ok(DecodedText {
            text: text.into_owned(),
            encoding_label: encoding.name(),
        }),
        None => Err(DecodeError::Malformed {
            encoding: encoding.name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_text_round_trips() {
        let decoded = decode_bytes("héllo wörld\n".as_bytes()).unwrap();
        assert_eq!(decoded.text, "héllo wörld\n");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn bom_selects_encoding_and_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"abc");
        let decoded = decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.text, "abc");
    }

    #[test]
    fn utf16_with_bom_is_accepted_despite_nul_bytes() {
        let bytes = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        let decoded = decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.text, "hi");
        assert_eq!(decoded.encoding_label, "UTF-16LE");
    }

    #[test]
    fn binary_buffer_is_rejected() {
        let bytes = [0x7F, b'E', b'L', b'F', 0x02, 0x01, 0x00, 0x00];
        assert_eq!(decode_bytes(&bytes), Err(DecodeError::NoEncoding));
    }

    #[test]
    fn truncated_utf8_under_bom_is_malformed() {
        let bytes = [0xEF, 0xBB, 0xBF, b'a', 0xE2, 0x82];
        assert_eq!(
            decode_bytes(&bytes),
            Err(DecodeError::Malformed { encoding: "UTF-8" })
        );
    }

    #[test]
    fn empty_buffer_decodes_to_empty_text() {
        assert_eq!(decode_bytes(b"").unwrap().text, "");
    }
}
