//! Redemption key extraction from plain certificate text.
//!
//! The canonical layout is line oriented:
//!
//! ```text
//! ADA REDEMPTION CERTIFICATE
//! ...anything...
//! REDEMPTION KEY
//! <base64 redemption key>
//! ...anything...
//! ```
//!
//! The parser only locates the key; it does not decode it. A key section
//! holding something that isn't base64 still parses here and is rejected
//! later as an invalid key.

use crate::config::{CERTIFICATE_HEADER, REDEMPTION_KEY_LABEL};
use crate::error::RedemptionError;

/// Returns `true` if `content` is a plain certificate: valid UTF-8 whose
/// first non-empty line is the certificate header.
pub fn is_plain_certificate(content: &[u8]) -> bool {
    std::str::from_utf8(content)
        .ok()
        .and_then(first_non_empty_line)
        .is_some_and(|line| line == CERTIFICATE_HEADER)
}

/// Extract the redemption key string from certificate text.
///
/// `decrypted` says whether `content` came out of the decryptor. It only
/// picks which parse error is reported, so callers can tell "your
/// certificate opened but is malformed" apart from "your file is malformed".
pub fn extract_key(content: &[u8], decrypted: bool) -> Result<String, RedemptionError> {
    let parse_error = |reason: &str| {
        if decrypted {
            RedemptionError::EncryptedCertificateParse(reason.to_string())
        } else {
            RedemptionError::CertificateParse(reason.to_string())
        }
    };

    let Ok(text) = std::str::from_utf8(content) else {
        return Err(if decrypted {
            parse_error("decrypted content is not text")
        } else {
            RedemptionError::InvalidCertificate("content is not text".into())
        });
    };

    if first_non_empty_line(text) != Some(CERTIFICATE_HEADER) {
        return Err(if decrypted {
            parse_error("decrypted content has no certificate header")
        } else {
            RedemptionError::InvalidCertificate("missing certificate header".into())
        });
    }

    let mut lines = text.lines().map(str::trim);
    if !lines.any(|line| line == REDEMPTION_KEY_LABEL) {
        return Err(parse_error("no redemption key section"));
    }

    match lines.find(|line| !line.is_empty()) {
        Some(key) => Ok(key.to_string()),
        None => Err(parse_error("redemption key section is empty")),
    }
}

/// Render the canonical plain certificate for `key`. Used by issuers and
/// tests; `extract_key` on the result returns `key` unchanged.
pub fn render_certificate(key: &str) -> String {
    format!("{CERTIFICATE_HEADER}\n\n{REDEMPTION_KEY_LABEL}\n{key}\n")
}

/// Skips a leading UTF-8 byte-order mark, which `str::trim` keeps.
fn first_non_empty_line(text: &str) -> Option<&str> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
}
