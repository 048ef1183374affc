use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::TransferError;

/// Standard alphabet, padding already stripped, trailing bits tolerated.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

fn is_alphabet(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/'
}

/// Decodes standard base64, skipping `=` and any byte outside the alphabet.
///
/// The input is treated as one continuous sextet stream. A final group of a
/// single sextet carries fewer than 8 bits and produces no output.
pub fn decode_base64_lenient(input: &str) -> Result<Vec<u8>, TransferError> {
    let mut sextets: Vec<u8> = input.bytes().filter(|&b| is_alphabet(b)).collect();
    if sextets.len() % 4 == 1 {
        sextets.pop();
    }
    Ok(LENIENT.decode(&sextets)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_padded_input() {
        assert_eq!(decode_base64_lenient("SGVsbG8=").unwrap(), b"Hello");
    }

    #[test]
    fn decodes_unpadded_input() {
        assert_eq!(decode_base64_lenient("SGVsbG8").unwrap(), b"Hello");
        assert_eq!(decode_base64_lenient("YWJj").unwrap(), b"abc");
    }

    #[test]
    fn skips_disallowed_characters() {
        assert_eq!(decode_base64_lenient("SGV*sbG8=").unwrap(), b"Hello");
        assert_eq!(decode_base64_lenient("SG Vs\r\nbG8=").unwrap(), b"Hello");
        assert_eq!(decode_base64_lenient("-_SGVsbG8=!").unwrap(), b"Hello");
    }

    #[test]
    fn empty_and_padding_only_inputs_decode_to_nothing() {
        assert!(decode_base64_lenient("").unwrap().is_empty());
        assert!(decode_base64_lenient("====").unwrap().is_empty());
        assert!(decode_base64_lenient("%%%").unwrap().is_empty());
    }

    #[test]
    fn lone_trailing_sextet_is_dropped() {
        // "YWJj" = "abc"; the extra "Y" holds only 6 bits.
        assert_eq!(decode_base64_lenient("YWJjY").unwrap(), b"abc");
    }

    #[test]
    fn interior_padding_is_ignored() {
        // Padding is a no-op, so the sextets continue as one stream.
        assert_eq!(
            decode_base64_lenient("YW=Jj").unwrap(),
            decode_base64_lenient("YWJj").unwrap()
        );
    }

    #[test]
    fn decodes_binary_data() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([0u8, 255, 128, 7, 64]);
        assert_eq!(
            decode_base64_lenient(&encoded).unwrap(),
            vec![0u8, 255, 128, 7, 64]
        );
    }
}
