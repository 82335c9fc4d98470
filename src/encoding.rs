use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use log::{info, warn};

use crate::error::{CleanseError, Result};

/// Fallback labels tried in order when the detected encoding fails to decode.
pub const DEFAULT_FALLBACK_ENCODINGS: [&str; 3] = ["latin1", "iso-8859-1", "cp1252"];

/// Text decoded from raw upload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// Canonical name of the encoding that produced `text`.
    pub encoding: &'static str,
    /// Whether one of the fallback encodings had to be used.
    pub used_fallback: bool,
}

/// Resolves an encoding label such as `"latin1"` or `"utf-8"`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| CleanseError::UnknownEncoding(label.to_string()))
}

/// Decodes `bytes` strictly with the encoding named by `label`.
///
/// Malformed input is an error rather than being replaced with U+FFFD.
pub fn decode_with_label(bytes: &[u8], label: &str) -> Result<String> {
    let encoding = encoding_for_label(label)?;
    strict_decode(encoding, bytes).ok_or(CleanseError::UnsupportedEncoding)
}

/// Detects the encoding of `bytes` and decodes them.
///
/// A byte order mark takes precedence, then the detector's guess. When the
/// guess produces malformed sequences, each of `fallbacks` is tried in order.
pub fn decode<S: AsRef<str>>(bytes: &[u8], fallbacks: &[S]) -> Result<DecodedText> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        if let Some(text) = strict_decode(encoding, &bytes[bom_len..]) {
            info!("Detected encoding: {} (byte order mark)", encoding.name());
            return Ok(DecodedText {
                text,
                encoding: encoding.name(),
                used_fallback: false,
            });
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let detected = detector.guess(None, true);
    info!("Detected encoding: {}", detected.name());

    decode_with(bytes, detected, fallbacks)
}

/// Decodes `bytes` with an already detected encoding, trying each of
/// `fallbacks` in order when it produces malformed sequences.
///
/// Unknown fallback labels are skipped.
pub fn decode_with<S: AsRef<str>>(
    bytes: &[u8],
    detected: &'static Encoding,
    fallbacks: &[S],
) -> Result<DecodedText> {
    if let Some(text) = strict_decode(detected, bytes) {
        return Ok(DecodedText {
            text,
            encoding: detected.name(),
            used_fallback: false,
        });
    }
    warn!("Decoding failed with detected encoding {}", detected.name());

    for label in fallbacks {
        let label = label.as_ref();
        let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            warn!("Skipping unknown fallback encoding '{}'", label);
            continue;
        };
        match strict_decode(encoding, bytes) {
            Some(text) => {
                info!("Decoded with fallback encoding {} ({})", label, encoding.name());
                return Ok(DecodedText {
                    text,
                    encoding: encoding.name(),
                    used_fallback: true,
                });
            }
            None => warn!("Decoding failed with fallback encoding {}", label),
        }
    }

    Err(CleanseError::UnsupportedEncoding)
}

fn strict_decode(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}
